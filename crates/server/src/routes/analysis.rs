use axum::{Extension, Json};
use serde::Deserialize;

use chess_core::position;

use crate::clients::stockfish::{self, EngineAnalysis, StockfishClient};
use crate::error::AppError;

#[derive(Deserialize)]
pub struct AnalysisRequest {
    pub fen: String,
    pub depth: Option<u8>,
}

/// POST /api/analysis
/// Engine evaluation of a position. The FEN is checked locally before
/// anything is sent upstream.
pub async fn analyze_position(
    Extension(engine): Extension<StockfishClient>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<EngineAnalysis>, AppError> {
    let fen = req.fen.trim();
    position::validate_fen(fen).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let depth = stockfish::clamp_depth(req.depth);
    let analysis = engine.analyze(fen, depth).await?;

    tracing::debug!(depth, best_move = %analysis.best_move, "Engine analysis complete");

    Ok(Json(analysis))
}
