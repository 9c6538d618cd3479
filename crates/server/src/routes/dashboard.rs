use axum::{Extension, Json};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::auth::middleware::AuthUser;
use crate::db::{favorites, practice, visits};
use crate::error::AppError;
use crate::routes::practice::{session_accuracy, PracticeSessionResponse};

const TOP_VISITED: i64 = 5;
const RECENT_SESSIONS: i64 = 5;

/// GET /api/dashboard
/// Aggregated per-user stats: favorites, visits and practice progress.
pub async fn get_dashboard(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
) -> Result<Json<JsonValue>, AppError> {
    let (favorites_count, (openings_visited, total_visits), totals, top, recent) = tokio::try_join!(
        favorites::count_favorites(&pool, user.id),
        visits::visit_totals(&pool, user.id),
        practice::practice_totals(&pool, user.id),
        visits::most_visited(&pool, user.id, TOP_VISITED),
        practice::list_sessions(&pool, user.id, RECENT_SESSIONS),
    )?;

    let most_visited: Vec<JsonValue> = top
        .iter()
        .map(|v| {
            serde_json::json!({
                "openingId": v.opening_id,
                "eco": v.eco,
                "name": v.name,
                "moves": v.moves,
                "visitCount": v.visit_count,
                "lastVisitedAt": v.last_visited_at.to_rfc3339(),
            })
        })
        .collect();

    let recent_sessions: Vec<PracticeSessionResponse> = recent.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "favoritesCount": favorites_count,
        "openingsVisited": openings_visited,
        "totalVisits": total_visits,
        "mostVisited": most_visited,
        "practice": {
            "sessions": totals.sessions,
            "completed": totals.completed,
            "movesPlayed": totals.moves_played,
            "mistakes": totals.mistakes,
            "accuracy": session_accuracy(totals.moves_played, totals.mistakes),
        },
        "recentSessions": recent_sessions,
    })))
}
