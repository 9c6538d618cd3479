//! The opening catalog: record types and the query contract the matcher
//! relies on.
//!
//! Records are closed structs so the matcher does not depend on how a
//! backend lays out its rows. Backends:
//!   - [`crate::db::openings::PgCatalog`]: Postgres, used by the server
//!   - [`memory::MemoryCatalog`]: in-process, same match and rank semantics

pub mod memory;

use serde::Serialize;
use std::future::Future;

use chess_core::opening_match::{RankKey, Ranked};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// A named opening line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OpeningRecord {
    pub id: i64,
    pub fen: String,
    pub eco: String,
    /// Canonical line, e.g. `"1. e4 e5 2. Nf3 Nc6 3. Bb5"`.
    pub moves: String,
    pub name: String,
    pub src: String,
    pub is_eco_root: bool,
    pub aliases: Vec<String>,
    #[serde(skip)]
    pub ply_count: i32,
}

impl Ranked for OpeningRecord {
    fn rank_key(&self) -> RankKey<'_> {
        RankKey {
            id: self.id,
            is_eco_root: self.is_eco_root,
            eco: &self.eco,
            ply_count: self.ply_count,
            line_len: self.moves.len(),
        }
    }
}

/// The parts of an opening a transition carries along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningSummary {
    pub id: i64,
    pub eco: String,
    pub name: String,
    pub moves: String,
}

impl From<&OpeningRecord> for OpeningSummary {
    fn from(o: &OpeningRecord) -> Self {
        Self {
            id: o.id,
            eco: o.eco.clone(),
            name: o.name.clone(),
            moves: o.moves.clone(),
        }
    }
}

/// A known continuation from one catalogued line into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
    pub id: i64,
    pub from_fen: String,
    pub to_fen: String,
    pub from_line: String,
    pub to_line: String,
    pub from_src: String,
    pub to_src: String,
    pub from_opening: Option<OpeningSummary>,
    pub to_opening: Option<OpeningSummary>,
}

/// Read access to the catalog.
///
/// Both queries take a canonical line and apply the prefix-or-containment
/// rule of [`chess_core::opening_match::matches_line`]. Implementations
/// return openings in rank order and exclude transitions whose target
/// opening is unresolved.
pub trait OpeningCatalog: Send + Sync {
    fn find_openings_matching(
        &self,
        line: &str,
    ) -> impl Future<Output = Result<Vec<OpeningRecord>, CatalogError>> + Send;

    fn find_transitions_matching(
        &self,
        line: &str,
    ) -> impl Future<Output = Result<Vec<TransitionRecord>, CatalogError>> + Send;
}
