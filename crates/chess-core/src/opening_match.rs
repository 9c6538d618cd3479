//! Matching and ranking of catalogued opening lines against a played line.
//!
//! Both sides are canonical lines (see [`crate::canonical`]). A catalogued
//! line matches when the played line extends it (prefix) or when the played
//! line occurs inside it (containment).

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::canonical;

/// True when `catalog_line` is a prefix of `played` or contains it.
///
/// Containment is plain substring containment, so an empty played line
/// matches every catalogued line.
pub fn matches_line(played: &str, catalog_line: &str) -> bool {
    played.starts_with(catalog_line) || catalog_line.contains(played)
}

/// Fields that decide where a matched opening lands in the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankKey<'a> {
    pub id: i64,
    pub is_eco_root: bool,
    pub eco: &'a str,
    pub ply_count: i32,
    pub line_len: usize,
}

/// Anything the ranking can order.
pub trait Ranked {
    fn rank_key(&self) -> RankKey<'_>;
}

/// ECO roots first, then ECO ascending, then fewer moves, then shorter
/// line text, then catalog order.
pub fn compare_rank(a: &RankKey<'_>, b: &RankKey<'_>) -> Ordering {
    b.is_eco_root
        .cmp(&a.is_eco_root)
        .then_with(|| a.eco.cmp(b.eco))
        .then_with(|| a.ply_count.cmp(&b.ply_count))
        .then_with(|| a.line_len.cmp(&b.line_len))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort records into result order and drop repeated ids (first one wins).
pub fn rank_and_dedup<T: Ranked>(mut records: Vec<T>) -> Vec<T> {
    records.sort_by(|a, b| compare_rank(&a.rank_key(), &b.rank_key()));

    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.rank_key().id));
    records
}

/// A derived link from a catalogued line to a longer catalogued line that
/// continues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedTransition {
    pub from_id: i64,
    pub to_id: i64,
}

/// For every line, link the longest other catalogued line that is a proper
/// prefix of it on a move boundary.
///
/// When several records share the same prefix text the lowest id is used.
/// Records with identical lines are never linked to each other.
pub fn derive_transitions(lines: &[(i64, &str)]) -> Vec<DerivedTransition> {
    let mut by_line: HashMap<&str, i64> = HashMap::new();
    for &(id, line) in lines {
        by_line
            .entry(line)
            .and_modify(|existing| *existing = (*existing).min(id))
            .or_insert(id);
    }

    let mut transitions = Vec::new();
    for &(id, line) in lines {
        let tokens = canonical::parse_line(line);
        for len in (1..tokens.len()).rev() {
            let prefix = canonical::normalize(&tokens[..len]);
            if let Some(&from_id) = by_line.get(prefix.as_str()) {
                transitions.push(DerivedTransition { from_id, to_id: id });
                break;
            }
        }
    }

    transitions.sort_by_key(|t| (t.from_id, t.to_id));
    transitions
}
