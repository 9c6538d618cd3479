use sqlx::PgPool;

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PracticeSessionRow {
    pub id: i64,
    pub opening_id: i64,
    pub eco: String,
    pub name: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub moves_played: Option<i32>,
    pub mistakes: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct PracticeTotals {
    pub sessions: i64,
    pub completed: i64,
    pub moves_played: i64,
    pub mistakes: i64,
}

const SESSION_COLUMNS: &str = r#"s.id, s.opening_id, o.eco, o.name, s.started_at, s.completed_at,
       s.moves_played, s.mistakes"#;

pub async fn create_session(
    pool: &PgPool,
    user_id: i64,
    opening_id: i64,
) -> Result<PracticeSessionRow, AppError> {
    let row: (i64,) = sqlx::query_as(
        r#"INSERT INTO practice_sessions (user_id, opening_id)
           VALUES ($1, $2)
           RETURNING id"#,
    )
    .bind(user_id)
    .bind(opening_id)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)?;

    get_session(pool, user_id, row.0)
        .await?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created session".into()))
}

pub async fn get_session(
    pool: &PgPool,
    user_id: i64,
    session_id: i64,
) -> Result<Option<PracticeSessionRow>, AppError> {
    let query = format!(
        r#"SELECT {SESSION_COLUMNS}
           FROM practice_sessions s
           JOIN openings o ON o.id = s.opening_id
           WHERE s.id = $1 AND s.user_id = $2"#
    );
    sqlx::query_as::<_, PracticeSessionRow>(&query)
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Sqlx)
}

/// Mark a session complete. Returns None if the session does not exist,
/// belongs to another user, or was already completed.
pub async fn complete_session(
    pool: &PgPool,
    user_id: i64,
    session_id: i64,
    moves_played: i32,
    mistakes: i32,
) -> Result<Option<i64>, AppError> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"UPDATE practice_sessions
           SET completed_at = NOW(), moves_played = $3, mistakes = $4
           WHERE id = $1 AND user_id = $2 AND completed_at IS NULL
           RETURNING id"#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(moves_played)
    .bind(mistakes)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(row.map(|r| r.0))
}

pub async fn list_sessions(
    pool: &PgPool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<PracticeSessionRow>, AppError> {
    let query = format!(
        r#"SELECT {SESSION_COLUMNS}
           FROM practice_sessions s
           JOIN openings o ON o.id = s.opening_id
           WHERE s.user_id = $1
           ORDER BY s.started_at DESC, s.id DESC
           LIMIT $2"#
    );
    sqlx::query_as::<_, PracticeSessionRow>(&query)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(AppError::Sqlx)
}

pub async fn practice_totals(pool: &PgPool, user_id: i64) -> Result<PracticeTotals, AppError> {
    sqlx::query_as::<_, PracticeTotals>(
        r#"SELECT COUNT(*) AS sessions,
                  COUNT(completed_at) AS completed,
                  COALESCE(SUM(moves_played), 0)::bigint AS moves_played,
                  COALESCE(SUM(mistakes), 0)::bigint AS mistakes
           FROM practice_sessions
           WHERE user_id = $1"#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)
}
