use axum::{extract::Path, Extension, Json};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::auth::middleware::AuthUser;
use crate::db::{favorites, openings};
use crate::error::AppError;

/// GET /api/favorites
pub async fn list_favorites(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
) -> Result<Json<JsonValue>, AppError> {
    let openings = favorites::list_favorites(&pool, user.id).await?;
    Ok(Json(serde_json::json!({
        "count": openings.len(),
        "openings": openings,
    })))
}

/// PUT /api/favorites/{opening_id}
/// Idempotent: favoriting twice is not an error.
pub async fn add_favorite(
    Extension(pool): Extension<PgPool>,
    Path(opening_id): Path<i64>,
    user: AuthUser,
) -> Result<Json<JsonValue>, AppError> {
    if !openings::opening_exists(&pool, opening_id).await? {
        return Err(AppError::NotFound("Opening not found".into()));
    }

    let added = favorites::add_favorite(&pool, user.id, opening_id).await?;
    Ok(Json(serde_json::json!({
        "openingId": opening_id,
        "isFavorite": true,
        "changed": added,
    })))
}

/// DELETE /api/favorites/{opening_id}
pub async fn remove_favorite(
    Extension(pool): Extension<PgPool>,
    Path(opening_id): Path<i64>,
    user: AuthUser,
) -> Result<Json<JsonValue>, AppError> {
    let removed = favorites::remove_favorite(&pool, user.id, opening_id).await?;
    Ok(Json(serde_json::json!({
        "openingId": opening_id,
        "isFavorite": false,
        "changed": removed,
    })))
}
