use sqlx::PgPool;

use crate::catalog::OpeningRecord;
use crate::db::openings::OPENING_COLUMNS;
use crate::error::AppError;

/// Returns false when the opening was already a favorite.
pub async fn add_favorite(pool: &PgPool, user_id: i64, opening_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"INSERT INTO user_favorites (user_id, opening_id)
           VALUES ($1, $2)
           ON CONFLICT DO NOTHING"#,
    )
    .bind(user_id)
    .bind(opening_id)
    .execute(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(result.rows_affected() > 0)
}

/// Returns false when there was nothing to remove.
pub async fn remove_favorite(pool: &PgPool, user_id: i64, opening_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND opening_id = $2")
        .bind(user_id)
        .bind(opening_id)
        .execute(pool)
        .await
        .map_err(AppError::Sqlx)?;

    Ok(result.rows_affected() > 0)
}

/// Favorite openings, most recently added first.
pub async fn list_favorites(pool: &PgPool, user_id: i64) -> Result<Vec<OpeningRecord>, AppError> {
    let query = format!(
        r#"SELECT {OPENING_COLUMNS}
           FROM user_favorites f
           JOIN openings o ON o.id = f.opening_id
           WHERE f.user_id = $1
           ORDER BY f.created_at DESC, o.id ASC"#
    );

    sqlx::query_as::<_, OpeningRecord>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Sqlx)
}

pub async fn count_favorites(pool: &PgPool, user_id: i64) -> Result<i64, AppError> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_favorites WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(AppError::Sqlx)?;

    Ok(row.0)
}

pub async fn is_favorite(pool: &PgPool, user_id: i64, opening_id: i64) -> Result<bool, AppError> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM user_favorites WHERE user_id = $1 AND opening_id = $2)",
    )
    .bind(user_id)
    .bind(opening_id)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(row.0)
}
