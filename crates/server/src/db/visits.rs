use sqlx::PgPool;

use crate::error::AppError;

#[derive(Debug, sqlx::FromRow)]
pub struct VisitRow {
    pub opening_id: i64,
    pub eco: String,
    pub name: String,
    pub moves: String,
    pub visit_count: i32,
    pub last_visited_at: chrono::DateTime<chrono::Utc>,
}

/// Increment the user's visit counter for an opening and return the new count.
pub async fn record_visit(pool: &PgPool, user_id: i64, opening_id: i64) -> Result<i32, AppError> {
    let row: (i32,) = sqlx::query_as(
        r#"INSERT INTO user_opening_visits (user_id, opening_id, visit_count, last_visited_at)
           VALUES ($1, $2, 1, NOW())
           ON CONFLICT (user_id, opening_id) DO UPDATE SET
               visit_count = user_opening_visits.visit_count + 1,
               last_visited_at = NOW()
           RETURNING visit_count"#,
    )
    .bind(user_id)
    .bind(opening_id)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(row.0)
}

pub async fn get_visit_count(pool: &PgPool, user_id: i64, opening_id: i64) -> Result<i32, AppError> {
    let row: Option<(i32,)> = sqlx::query_as(
        "SELECT visit_count FROM user_opening_visits WHERE user_id = $1 AND opening_id = $2",
    )
    .bind(user_id)
    .bind(opening_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(row.map(|r| r.0).unwrap_or(0))
}

pub async fn most_visited(pool: &PgPool, user_id: i64, limit: i64) -> Result<Vec<VisitRow>, AppError> {
    sqlx::query_as::<_, VisitRow>(
        r#"SELECT v.opening_id, o.eco, o.name, o.moves, v.visit_count, v.last_visited_at
           FROM user_opening_visits v
           JOIN openings o ON o.id = v.opening_id
           WHERE v.user_id = $1
           ORDER BY v.visit_count DESC, v.last_visited_at DESC
           LIMIT $2"#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// (distinct openings visited, total visits)
pub async fn visit_totals(pool: &PgPool, user_id: i64) -> Result<(i64, i64), AppError> {
    let row: (i64, i64) = sqlx::query_as(
        r#"SELECT COUNT(*), COALESCE(SUM(visit_count), 0)::bigint
           FROM user_opening_visits
           WHERE user_id = $1"#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(row)
}
