//! Move-sequence to opening matching.
//!
//! Stateless: every call normalizes the moves and issues two read queries
//! against the catalog. Both queries must succeed; a catalog failure is
//! never turned into an empty result.

use serde::Serialize;
use serde_json::Value as JsonValue;

use chess_core::{canonical, opening_match};

use crate::catalog::{CatalogError, OpeningCatalog, OpeningRecord, TransitionRecord};

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    CatalogUnavailable(#[from] CatalogError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    pub normalized_moves: String,
    pub moves_count: usize,
    pub moves: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub exact_matches: bool,
    pub count: usize,
    pub openings: Vec<OpeningRecord>,
    pub transitions: Vec<TransitionRecord>,
    pub search_info: SearchInfo,
}

/// Decode the `moves` query parameter: a JSON array of SAN strings.
///
/// Surrounding whitespace is stripped from every token, and the stripped
/// tokens are what `searchInfo.moves` echoes back.
pub fn parse_moves_param(raw: Option<&str>) -> Result<Vec<String>, MatchError> {
    let raw = raw.ok_or_else(|| MatchError::InvalidInput("moves parameter is required".into()))?;

    let value: JsonValue = serde_json::from_str(raw)
        .map_err(|_| MatchError::InvalidInput("moves must be a JSON array of strings".into()))?;

    let items = value
        .as_array()
        .ok_or_else(|| MatchError::InvalidInput("moves must be a JSON array of strings".into()))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| MatchError::InvalidInput("moves must only contain strings".into()))
        })
        .collect()
}

/// Openings whose line is a prefix of, or contains, `normalized_line`.
pub async fn match_openings<C: OpeningCatalog>(
    catalog: &C,
    normalized_line: &str,
) -> Result<Vec<OpeningRecord>, MatchError> {
    let found = catalog.find_openings_matching(normalized_line).await?;
    Ok(opening_match::rank_and_dedup(found))
}

/// Transitions touching `normalized_line` whose target opening resolves.
pub async fn match_transitions<C: OpeningCatalog>(
    catalog: &C,
    normalized_line: &str,
) -> Result<Vec<TransitionRecord>, MatchError> {
    let mut found = catalog.find_transitions_matching(normalized_line).await?;
    found.retain(|t| t.to_opening.is_some());
    Ok(found)
}

pub async fn find_matches<C: OpeningCatalog>(
    catalog: &C,
    moves: Option<Vec<String>>,
) -> Result<MatchResult, MatchError> {
    let moves = moves.ok_or_else(|| MatchError::InvalidInput("moves is required".into()))?;

    let normalized_line = canonical::normalize(&moves);

    let (openings, transitions) = tokio::try_join!(
        match_openings(catalog, &normalized_line),
        match_transitions(catalog, &normalized_line),
    )?;

    tracing::debug!(
        line = %normalized_line,
        openings = openings.len(),
        transitions = transitions.len(),
        "Opening match"
    );

    Ok(MatchResult {
        exact_matches: !openings.is_empty(),
        count: openings.len(),
        openings,
        transitions,
        search_info: SearchInfo {
            normalized_moves: normalized_line,
            moves_count: moves.len(),
            moves,
        },
    })
}
