//! Client for a hosted Stockfish HTTP API (stockfish.online v2 response shape).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEPTH: u8 = 12;
/// The hosted API rejects depths above this.
pub const MAX_DEPTH: u8 = 15;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Engine request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Engine returned an error: {0}")]
    Upstream(String),

    #[error("Unexpected engine response: {0}")]
    Malformed(String),
}

/// Raw body returned by the API.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    success: bool,
    evaluation: Option<f64>,
    mate: Option<i32>,
    bestmove: Option<String>,
    continuation: Option<String>,
    data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineAnalysis {
    /// Best move in UCI notation
    pub best_move: String,
    pub ponder: Option<String>,
    /// Pawns, from White's point of view
    pub evaluation: Option<f64>,
    /// Mate in N (positive = White mates)
    pub mate: Option<i32>,
    pub continuation: Vec<String>,
}

pub fn clamp_depth(depth: Option<u8>) -> u8 {
    depth.unwrap_or(DEFAULT_DEPTH).clamp(1, MAX_DEPTH)
}

#[derive(Clone)]
pub struct StockfishClient {
    client: Client,
    base_url: String,
}

impl StockfishClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, EngineError> {
        let client = Client::builder()
            .user_agent("OpeningExplorer/1.0")
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Analyse a position. The FEN is passed through unchanged.
    pub async fn analyze(&self, fen: &str, depth: u8) -> Result<EngineAnalysis, EngineError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("fen", fen.to_string()), ("depth", depth.to_string())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(EngineError::Upstream(format!("HTTP {}", resp.status())));
        }

        let text = resp.text().await?;
        parse_analysis(&text)
    }
}

/// Parse an API response body.
pub fn parse_analysis(body: &str) -> Result<EngineAnalysis, EngineError> {
    let raw: RawAnalysis =
        serde_json::from_str(body).map_err(|e| EngineError::Malformed(e.to_string()))?;

    if !raw.success {
        return Err(EngineError::Upstream(
            raw.data.unwrap_or_else(|| "analysis failed".to_string()),
        ));
    }

    // "bestmove e2e4 ponder e7e5"
    let bestmove = raw
        .bestmove
        .ok_or_else(|| EngineError::Malformed("missing bestmove".into()))?;
    let mut tokens = bestmove.split_whitespace();
    let mut best_move = None;
    let mut ponder = None;
    while let Some(token) = tokens.next() {
        match token {
            "bestmove" => best_move = tokens.next().map(str::to_string),
            "ponder" => ponder = tokens.next().map(str::to_string),
            _ => {}
        }
    }
    let best_move =
        best_move.ok_or_else(|| EngineError::Malformed(format!("bad bestmove: {bestmove}")))?;

    let continuation = raw
        .continuation
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    Ok(EngineAnalysis {
        best_move,
        ponder,
        evaluation: raw.evaluation,
        mate: raw.mate,
        continuation,
    })
}
