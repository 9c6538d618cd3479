//! Import an ECO opening catalog from TSV files.
//!
//! Reads every `*.tsv` file in a directory (columns: `eco`, `name`, `pgn`),
//! replays each line, and upserts openings, aliases and transitions.
//!
//! Usage: cargo run --release --bin import-openings -- <tsv_dir> [--dry-run]
//!
//! Example:
//!   cargo run --release --bin import-openings -- ./data/chess-openings/

use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Instant;

use chess_core::{canonical, eco, opening_match, position};
use server::config::Config;
use server::db::{self, openings::{NewOpening, OpeningRecordRef}};
use tracing_subscriber::EnvFilter;

/// One usable catalog row after replay.
#[derive(Debug, Clone, PartialEq)]
struct ImportedLine {
    eco: String,
    name: String,
    line: String,
    fen: String,
    ply_count: usize,
    src: String,
}

/// Split a TSV row into `(eco, name, pgn)`. Header and blank rows yield `None`.
fn parse_row(row: &str) -> Option<(&str, &str, &str)> {
    let mut cols = row.split('\t');
    let eco = cols.next()?.trim();
    let name = cols.next()?.trim();
    let pgn = cols.next()?.trim();

    if eco.eq_ignore_ascii_case("eco") || name.is_empty() || pgn.is_empty() {
        return None;
    }
    Some((eco, name, pgn))
}

/// Replay a row's moves and build the stored line. Illegal rows are reported
/// as an error string so the caller can log and skip them.
fn import_row(eco_raw: &str, name: &str, pgn: &str, src: &str) -> Result<ImportedLine, String> {
    let eco = eco::parse_eco(eco_raw).ok_or_else(|| format!("invalid ECO code '{eco_raw}'"))?;
    let moves = canonical::parse_line(pgn);
    if moves.is_empty() {
        return Err("no moves".to_string());
    }
    let fen = position::fen_after(&moves).map_err(|e| e.to_string())?;

    let line = canonical::normalize(&moves);
    Ok(ImportedLine {
        eco,
        name: name.to_string(),
        ply_count: canonical::ply_count(&line),
        line,
        fen,
        src: src.to_string(),
    })
}

/// Index of the shortest line for each ECO code. Ties keep the first row seen.
fn pick_eco_roots(lines: &[ImportedLine]) -> Vec<bool> {
    let mut best: HashMap<&str, usize> = HashMap::new();
    for (i, l) in lines.iter().enumerate() {
        best.entry(l.eco.as_str())
            .and_modify(|cur| {
                let c = &lines[*cur];
                if (l.ply_count, l.line.len()) < (c.ply_count, c.line.len()) {
                    *cur = i;
                }
            })
            .or_insert(i);
    }

    let mut roots = vec![false; lines.len()];
    for idx in best.into_values() {
        roots[idx] = true;
    }
    roots
}

/// Variation part of a lichess-style name, e.g. "Najdorf Variation" for
/// "Sicilian Defense: Najdorf Variation".
fn variation_alias(name: &str) -> Option<&str> {
    let (_, variation) = name.split_once(':')?;
    let variation = variation.trim();
    (!variation.is_empty()).then_some(variation)
}

fn read_catalog(dir: &str) -> anyhow::Result<Vec<ImportedLine>> {
    let pattern = format!("{}/*.tsv", dir.trim_end_matches('/'));
    let mut files: Vec<_> = glob::glob(&pattern)?.filter_map(|p| p.ok()).collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No TSV files found in {dir}");
    }

    let mut lines = Vec::new();
    let mut skipped = 0usize;

    for path in &files {
        let src = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = fs::read_to_string(path)?;
        let before = lines.len();

        for (row_no, row) in content.lines().enumerate() {
            let Some((eco_raw, name, pgn)) = parse_row(row) else {
                continue;
            };
            match import_row(eco_raw, name, pgn, &src) {
                Ok(line) => lines.push(line),
                Err(reason) => {
                    skipped += 1;
                    tracing::warn!("Skipping {}:{} ({}): {}", src, row_no + 1, name, reason);
                }
            }
        }

        tracing::info!("Read {} openings from {}", lines.len() - before, src);
    }

    tracing::info!("Catalog: {} usable lines, {} skipped", lines.len(), skipped);
    Ok(lines)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <tsv_dir> [--dry-run]", args[0]);
        std::process::exit(1);
    }
    let dir = &args[1];
    let dry_run = args.iter().skip(2).any(|a| a == "--dry-run");

    let start = Instant::now();
    let lines = read_catalog(dir)?;
    let roots = pick_eco_roots(&lines);

    // Different names and move orders can reach the same position
    let positions: HashSet<String> = lines.iter().map(|l| position::normalize_fen(&l.fen)).collect();
    tracing::info!("{} distinct positions across {} lines", positions.len(), lines.len());

    if dry_run {
        let root_count = roots.iter().filter(|r| **r).count();
        tracing::info!("Dry run: {} openings, {} ECO roots", lines.len(), root_count);
        return Ok(());
    }

    let config = Config::from_env()?;
    let pool = db::pool::create_pool(&config.database_url).await?;
    db::pool::run_migrations(&pool).await?;

    let mut tx = pool.begin().await?;

    let cleared = db::openings::reset_eco_roots(&mut *tx).await?;
    tracing::debug!("Cleared {} previous ECO roots", cleared);

    let mut ids = Vec::with_capacity(lines.len());
    for (line, &is_eco_root) in lines.iter().zip(&roots) {
        let id = db::openings::upsert_opening(
            &mut *tx,
            &NewOpening {
                eco: &line.eco,
                name: &line.name,
                moves: &line.line,
                fen: &line.fen,
                ply_count: line.ply_count as i32,
                src: &line.src,
                is_eco_root,
            },
        )
        .await?;

        if let Some(alias) = variation_alias(&line.name) {
            db::openings::add_alias(&mut *tx, id, alias, &line.src).await?;
        }
        ids.push(id);
    }

    let by_id: HashMap<i64, &ImportedLine> = ids.iter().copied().zip(lines.iter()).collect();
    let keyed: Vec<(i64, &str)> = ids
        .iter()
        .zip(&lines)
        .map(|(&id, l)| (id, l.line.as_str()))
        .collect();
    let transitions = opening_match::derive_transitions(&keyed);

    for t in &transitions {
        let (Some(from), Some(to)) = (by_id.get(&t.from_id), by_id.get(&t.to_id)) else {
            continue;
        };
        db::openings::upsert_transition(
            &mut *tx,
            &OpeningRecordRef { id: t.from_id, fen: &from.fen, moves: &from.line, src: &from.src },
            &OpeningRecordRef { id: t.to_id, fen: &to.fen, moves: &to.line, src: &to.src },
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Imported {} openings and {} transitions in {:.1}s",
        ids.len(),
        transitions.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
