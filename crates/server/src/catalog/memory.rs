//! In-process catalog with the same matching and ranking rules as Postgres.

use chess_core::{canonical, opening_match, position};

use super::{CatalogError, OpeningCatalog, OpeningRecord, OpeningSummary, TransitionRecord};

#[derive(Debug, Clone)]
struct StoredTransition {
    id: i64,
    from_fen: String,
    to_fen: String,
    from_line: String,
    to_line: String,
    from_src: String,
    to_src: String,
    from_opening_id: Option<i64>,
    to_opening_id: Option<i64>,
}

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    openings: Vec<OpeningRecord>,
    transitions: Vec<StoredTransition>,
    failure: Option<String>,
}

/// Build an opening record from SAN moves.
///
/// The FEN is left empty when the moves cannot be replayed.
pub fn opening(id: i64, eco: &str, name: &str, moves: &[&str], is_eco_root: bool) -> OpeningRecord {
    OpeningRecord {
        id,
        fen: position::fen_after(moves).unwrap_or_default(),
        eco: eco.to_string(),
        moves: canonical::normalize(moves),
        name: name.to_string(),
        src: "memory".to_string(),
        is_eco_root,
        aliases: Vec::new(),
        ply_count: moves.len() as i32,
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog whose every query fails.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn add_opening(&mut self, record: OpeningRecord) {
        self.openings.push(record);
    }

    pub fn with_opening(mut self, record: OpeningRecord) -> Self {
        self.add_opening(record);
        self
    }

    /// Link two catalogued openings. Returns the new transition id.
    ///
    /// Either id may be unknown; lookups resolve at query time.
    pub fn link(&mut self, from_opening_id: i64, to_opening_id: i64) -> i64 {
        let from = self.openings.iter().find(|o| o.id == from_opening_id);
        let to = self.openings.iter().find(|o| o.id == to_opening_id);
        let id = self.transitions.len() as i64 + 1;

        self.transitions.push(StoredTransition {
            id,
            from_fen: from.map(|o| o.fen.clone()).unwrap_or_default(),
            to_fen: to.map(|o| o.fen.clone()).unwrap_or_default(),
            from_line: from.map(|o| o.moves.clone()).unwrap_or_default(),
            to_line: to.map(|o| o.moves.clone()).unwrap_or_default(),
            from_src: from.map(|o| o.src.clone()).unwrap_or_default(),
            to_src: to.map(|o| o.src.clone()).unwrap_or_default(),
            from_opening_id: Some(from_opening_id),
            to_opening_id: Some(to_opening_id),
        });
        id
    }

    /// Delete an opening. Transitions that pointed at it stay behind but
    /// no longer resolve.
    pub fn remove_opening(&mut self, id: i64) {
        self.openings.retain(|o| o.id != id);
    }

    fn check_available(&self) -> Result<(), CatalogError> {
        match &self.failure {
            Some(reason) => Err(CatalogError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn summary(&self, id: Option<i64>) -> Option<OpeningSummary> {
        let id = id?;
        self.openings
            .iter()
            .find(|o| o.id == id)
            .map(OpeningSummary::from)
    }
}

impl OpeningCatalog for MemoryCatalog {
    async fn find_openings_matching(&self, line: &str) -> Result<Vec<OpeningRecord>, CatalogError> {
        self.check_available()?;

        let matched: Vec<OpeningRecord> = self
            .openings
            .iter()
            .filter(|o| opening_match::matches_line(line, &o.moves))
            .cloned()
            .collect();

        Ok(opening_match::rank_and_dedup(matched))
    }

    async fn find_transitions_matching(
        &self,
        line: &str,
    ) -> Result<Vec<TransitionRecord>, CatalogError> {
        self.check_available()?;

        let mut matched: Vec<TransitionRecord> = self
            .transitions
            .iter()
            .filter(|t| {
                opening_match::matches_line(line, &t.from_line)
                    || opening_match::matches_line(line, &t.to_line)
            })
            .filter_map(|t| {
                let to_opening = self.summary(t.to_opening_id)?;
                Some(TransitionRecord {
                    id: t.id,
                    from_fen: t.from_fen.clone(),
                    to_fen: t.to_fen.clone(),
                    from_line: t.from_line.clone(),
                    to_line: t.to_line.clone(),
                    from_src: t.from_src.clone(),
                    to_src: t.to_src.clone(),
                    from_opening: self.summary(t.from_opening_id),
                    to_opening: Some(to_opening),
                })
            })
            .collect();

        matched.sort_by_key(|t| t.id);
        Ok(matched)
    }
}
