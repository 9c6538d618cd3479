use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use chess_core::eco;

use crate::auth::middleware::AuthUser;
use crate::db::openings::{self, OpeningFilter, PgCatalog};
use crate::db::{favorites, visits};
use crate::error::AppError;
use crate::matcher::{self, MatchResult};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Deserialize)]
pub struct MatchQuery {
    pub moves: Option<String>,
}

/// GET /api/openings/match?moves=["e4","e5","Nf3"]
/// Openings and transitions matching the played move sequence.
pub async fn match_openings(
    Extension(pool): Extension<PgPool>,
    Query(q): Query<MatchQuery>,
) -> Result<Json<MatchResult>, AppError> {
    let moves = matcher::parse_moves_param(q.moves.as_deref())?;
    let catalog = PgCatalog::new(pool);
    let result = matcher::find_matches(&catalog, Some(moves)).await?;
    Ok(Json(result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub eco: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub roots_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/openings?eco=C60&q=ruy&rootsOnly=true&limit=50&offset=0
pub async fn list_openings(
    Extension(pool): Extension<PgPool>,
    Query(q): Query<ListQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let filter = build_filter(q)?;
    let (openings, total) = openings::list_openings(&pool, &filter).await?;

    Ok(Json(serde_json::json!({
        "openings": openings,
        "total": total,
        "limit": filter.limit,
        "offset": filter.offset,
    })))
}

fn build_filter(q: ListQuery) -> Result<OpeningFilter, AppError> {
    let eco = match q.eco.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(
            eco::parse_eco(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid ECO code: {raw}")))?,
        ),
        None => None,
    };

    Ok(OpeningFilter {
        eco,
        query: q.q.filter(|s| !s.trim().is_empty()),
        roots_only: q.roots_only,
        limit: q.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        offset: q.offset.unwrap_or(0).max(0),
    })
}

/// GET /api/openings/{id}
/// One opening with its resolved transitions and the caller's state.
pub async fn get_opening(
    Extension(pool): Extension<PgPool>,
    Path(id): Path<i64>,
    user: AuthUser,
) -> Result<Json<JsonValue>, AppError> {
    let opening = openings::get_opening(&pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Opening not found".into()))?;

    let transitions = openings::transitions_for_opening(&pool, id).await?;
    let (outgoing, incoming): (Vec<_>, Vec<_>) = transitions
        .into_iter()
        .partition(|t| t.from_opening.as_ref().is_some_and(|o| o.id == id));

    let is_favorite = favorites::is_favorite(&pool, user.id, id).await?;
    let visit_count = visits::get_visit_count(&pool, user.id, id).await?;

    Ok(Json(serde_json::json!({
        "opening": opening,
        "transitionsFrom": outgoing,
        "transitionsTo": incoming,
        "isFavorite": is_favorite,
        "visitCount": visit_count,
    })))
}

/// POST /api/openings/{id}/visit
pub async fn record_visit(
    Extension(pool): Extension<PgPool>,
    Path(id): Path<i64>,
    user: AuthUser,
) -> Result<Json<JsonValue>, AppError> {
    if !openings::opening_exists(&pool, id).await? {
        return Err(AppError::NotFound("Opening not found".into()));
    }

    let count = visits::record_visit(&pool, user.id, id).await?;
    Ok(Json(serde_json::json!({ "openingId": id, "visitCount": count })))
}
