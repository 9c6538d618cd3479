use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::middleware::AuthUser;
use crate::db::{openings, practice};
use crate::error::AppError;

const DEFAULT_LIST_LIMIT: i64 = 20;
const MAX_LIST_LIMIT: i64 = 100;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSessionResponse {
    pub id: i64,
    pub opening_id: i64,
    pub eco: String,
    pub opening_name: String,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub moves_played: Option<i32>,
    pub mistakes: Option<i32>,
    pub accuracy: Option<f64>,
}

impl From<practice::PracticeSessionRow> for PracticeSessionResponse {
    fn from(row: practice::PracticeSessionRow) -> Self {
        let accuracy = match (row.moves_played, row.mistakes) {
            (Some(played), Some(mistakes)) => session_accuracy(played as i64, mistakes as i64),
            _ => None,
        };
        Self {
            id: row.id,
            opening_id: row.opening_id,
            eco: row.eco,
            opening_name: row.name,
            started_at: row.started_at.to_rfc3339(),
            completed_at: row.completed_at.map(|t| t.to_rfc3339()),
            moves_played: row.moves_played,
            mistakes: row.mistakes,
            accuracy,
        }
    }
}

/// Percentage of moves played without a mistake, one decimal place.
pub fn session_accuracy(moves_played: i64, mistakes: i64) -> Option<f64> {
    if moves_played <= 0 {
        return None;
    }
    let clean = (moves_played - mistakes).max(0) as f64;
    Some(((clean / moves_played as f64) * 1000.0).round() / 10.0)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionBody {
    pub opening_id: i64,
}

/// POST /api/practice/sessions
pub async fn start_session(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Json(body): Json<StartSessionBody>,
) -> Result<Json<PracticeSessionResponse>, AppError> {
    if !openings::opening_exists(&pool, body.opening_id).await? {
        return Err(AppError::NotFound("Opening not found".into()));
    }

    let session = practice::create_session(&pool, user.id, body.opening_id).await?;
    Ok(Json(session.into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSessionBody {
    pub moves_played: i32,
    pub mistakes: i32,
}

pub fn validate_completion(body: &CompleteSessionBody) -> Result<(), AppError> {
    if body.moves_played < 0 || body.mistakes < 0 {
        return Err(AppError::BadRequest("Counts must not be negative".into()));
    }
    if body.mistakes > body.moves_played {
        return Err(AppError::BadRequest(
            "Mistakes cannot exceed moves played".into(),
        ));
    }
    Ok(())
}

/// POST /api/practice/sessions/{id}/complete
pub async fn complete_session(
    Extension(pool): Extension<PgPool>,
    Path(session_id): Path<i64>,
    user: AuthUser,
    Json(body): Json<CompleteSessionBody>,
) -> Result<Json<PracticeSessionResponse>, AppError> {
    validate_completion(&body)?;

    let updated = practice::complete_session(
        &pool,
        user.id,
        session_id,
        body.moves_played,
        body.mistakes,
    )
    .await?;

    if updated.is_none() {
        // Distinguish "not yours / missing" from "already finished"
        return match practice::get_session(&pool, user.id, session_id).await? {
            Some(_) => Err(AppError::Conflict("Session already completed".into())),
            None => Err(AppError::NotFound("Session not found".into())),
        };
    }

    let session = practice::get_session(&pool, user.id, session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".into()))?;
    Ok(Json(session.into()))
}

#[derive(Deserialize)]
pub struct ListSessionsQuery {
    pub limit: Option<i64>,
}

/// GET /api/practice/sessions?limit=20
pub async fn list_sessions(
    Extension(pool): Extension<PgPool>,
    Query(q): Query<ListSessionsQuery>,
    user: AuthUser,
) -> Result<Json<Vec<PracticeSessionResponse>>, AppError> {
    let limit = q.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let rows = practice::list_sessions(&pool, user.id, limit).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
