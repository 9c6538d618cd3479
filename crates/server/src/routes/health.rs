use axum::{Extension, Json};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::error::AppError;

/// GET /health
pub async fn health_check(Extension(pool): Extension<PgPool>) -> Result<Json<JsonValue>, AppError> {
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
