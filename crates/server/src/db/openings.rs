use sqlx::{PgConnection, PgPool};

use crate::catalog::{CatalogError, OpeningCatalog, OpeningRecord, OpeningSummary, TransitionRecord};
use crate::error::AppError;

/// Column list producing an [`OpeningRecord`] from `openings o`.
pub(crate) const OPENING_COLUMNS: &str = r#"o.id, o.fen, o.eco, o.moves, o.name, o.src, o.is_eco_root, o.ply_count,
       ARRAY(SELECT a.alias FROM opening_aliases a WHERE a.opening_id = o.id ORDER BY a.alias) AS aliases"#;

/// Postgres-backed opening catalog.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl OpeningCatalog for PgCatalog {
    async fn find_openings_matching(&self, line: &str) -> Result<Vec<OpeningRecord>, CatalogError> {
        let query = format!(
            r#"SELECT {OPENING_COLUMNS}
               FROM openings o
               WHERE starts_with($1, o.moves) OR strpos(o.moves, $1) > 0
               ORDER BY o.is_eco_root DESC, o.eco COLLATE "C" ASC, o.ply_count ASC,
                        length(o.moves) ASC, o.id ASC"#
        );

        let rows = sqlx::query_as::<_, OpeningRecord>(&query)
            .bind(line)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find_transitions_matching(
        &self,
        line: &str,
    ) -> Result<Vec<TransitionRecord>, CatalogError> {
        let rows: Vec<TransitionRow> = sqlx::query_as(
            r#"SELECT t.id, t.from_fen, t.to_fen, t.from_moves, t.to_moves, t.from_src, t.to_src,
                      fo.id AS from_opening_id, fo.eco AS from_opening_eco,
                      fo.name AS from_opening_name, fo.moves AS from_opening_moves,
                      tgt.id AS to_opening_id, tgt.eco AS to_opening_eco,
                      tgt.name AS to_opening_name, tgt.moves AS to_opening_moves
               FROM opening_transitions t
               JOIN openings tgt ON tgt.id = t.to_opening_id
               LEFT JOIN openings fo ON fo.id = t.from_opening_id
               WHERE starts_with($1, t.from_moves) OR strpos(t.from_moves, $1) > 0
                  OR starts_with($1, t.to_moves) OR strpos(t.to_moves, $1) > 0
               ORDER BY t.id"#,
        )
        .bind(line)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TransitionRecord::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct TransitionRow {
    id: i64,
    from_fen: String,
    to_fen: String,
    from_moves: String,
    to_moves: String,
    from_src: String,
    to_src: String,
    from_opening_id: Option<i64>,
    from_opening_eco: Option<String>,
    from_opening_name: Option<String>,
    from_opening_moves: Option<String>,
    to_opening_id: i64,
    to_opening_eco: String,
    to_opening_name: String,
    to_opening_moves: String,
}

impl From<TransitionRow> for TransitionRecord {
    fn from(row: TransitionRow) -> Self {
        let from_opening = match (
            row.from_opening_id,
            row.from_opening_eco,
            row.from_opening_name,
            row.from_opening_moves,
        ) {
            (Some(id), Some(eco), Some(name), Some(moves)) => Some(OpeningSummary { id, eco, name, moves }),
            _ => None,
        };

        TransitionRecord {
            id: row.id,
            from_fen: row.from_fen,
            to_fen: row.to_fen,
            from_line: row.from_moves,
            to_line: row.to_moves,
            from_src: row.from_src,
            to_src: row.to_src,
            from_opening,
            to_opening: Some(OpeningSummary {
                id: row.to_opening_id,
                eco: row.to_opening_eco,
                name: row.to_opening_name,
                moves: row.to_opening_moves,
            }),
        }
    }
}

/// Filters for browsing the catalog.
#[derive(Debug, Default)]
pub struct OpeningFilter {
    pub eco: Option<String>,
    pub query: Option<String>,
    pub roots_only: bool,
    pub limit: i64,
    pub offset: i64,
}

/// Escape `%`, `_` and `\` for use inside an ILIKE pattern.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub async fn list_openings(
    pool: &PgPool,
    filter: &OpeningFilter,
) -> Result<(Vec<OpeningRecord>, i64), AppError> {
    let pattern = filter
        .query
        .as_deref()
        .map(|q| format!("%{}%", escape_like(q.trim())));

    let where_clause = r#"($1::text IS NULL OR o.eco = $1)
          AND ($2::text IS NULL
               OR o.name ILIKE $2
               OR EXISTS (SELECT 1 FROM opening_aliases a
                          WHERE a.opening_id = o.id AND a.alias ILIKE $2))
          AND (NOT $3 OR o.is_eco_root)"#;

    let query = format!(
        r#"SELECT {OPENING_COLUMNS}
           FROM openings o
           WHERE {where_clause}
           ORDER BY o.eco COLLATE "C" ASC, o.ply_count ASC, o.id ASC
           LIMIT $4 OFFSET $5"#
    );

    let rows = sqlx::query_as::<_, OpeningRecord>(&query)
        .bind(filter.eco.as_deref())
        .bind(pattern.as_deref())
        .bind(filter.roots_only)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await
        .map_err(AppError::Sqlx)?;

    let count_query = format!("SELECT COUNT(*) FROM openings o WHERE {where_clause}");
    let total: (i64,) = sqlx::query_as(&count_query)
        .bind(filter.eco.as_deref())
        .bind(pattern.as_deref())
        .bind(filter.roots_only)
        .fetch_one(pool)
        .await
        .map_err(AppError::Sqlx)?;

    Ok((rows, total.0))
}

pub async fn get_opening(pool: &PgPool, id: i64) -> Result<Option<OpeningRecord>, AppError> {
    let query = format!("SELECT {OPENING_COLUMNS} FROM openings o WHERE o.id = $1");
    sqlx::query_as::<_, OpeningRecord>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Sqlx)
}

pub async fn opening_exists(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM openings WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(AppError::Sqlx)?;

    Ok(row.0)
}

/// Resolved transitions leading out of or into an opening.
pub async fn transitions_for_opening(
    pool: &PgPool,
    opening_id: i64,
) -> Result<Vec<TransitionRecord>, AppError> {
    let rows: Vec<TransitionRow> = sqlx::query_as(
        r#"SELECT t.id, t.from_fen, t.to_fen, t.from_moves, t.to_moves, t.from_src, t.to_src,
                  fo.id AS from_opening_id, fo.eco AS from_opening_eco,
                  fo.name AS from_opening_name, fo.moves AS from_opening_moves,
                  tgt.id AS to_opening_id, tgt.eco AS to_opening_eco,
                  tgt.name AS to_opening_name, tgt.moves AS to_opening_moves
           FROM opening_transitions t
           JOIN openings tgt ON tgt.id = t.to_opening_id
           LEFT JOIN openings fo ON fo.id = t.from_opening_id
           WHERE t.from_opening_id = $1 OR t.to_opening_id = $1
           ORDER BY t.id"#,
    )
    .bind(opening_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(rows.into_iter().map(TransitionRecord::from).collect())
}

/// An opening as produced by the importer.
pub struct NewOpening<'a> {
    pub eco: &'a str,
    pub name: &'a str,
    pub moves: &'a str,
    pub fen: &'a str,
    pub ply_count: i32,
    pub src: &'a str,
    pub is_eco_root: bool,
}

/// Clear every ECO root flag. The importer calls this inside its transaction
/// so rows missing from a re-import do not keep a stale root.
pub async fn reset_eco_roots(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE openings SET is_eco_root = FALSE WHERE is_eco_root")
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn upsert_opening(conn: &mut PgConnection, opening: &NewOpening<'_>) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        r#"INSERT INTO openings (eco, name, moves, fen, ply_count, src, is_eco_root)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           ON CONFLICT (moves, name) DO UPDATE SET
               eco = EXCLUDED.eco,
               fen = EXCLUDED.fen,
               ply_count = EXCLUDED.ply_count,
               src = EXCLUDED.src,
               is_eco_root = EXCLUDED.is_eco_root
           RETURNING id"#,
    )
    .bind(opening.eco)
    .bind(opening.name)
    .bind(opening.moves)
    .bind(opening.fen)
    .bind(opening.ply_count)
    .bind(opening.src)
    .bind(opening.is_eco_root)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.0)
}

pub async fn add_alias(
    conn: &mut PgConnection,
    opening_id: i64,
    alias: &str,
    source: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO opening_aliases (opening_id, alias, source)
           VALUES ($1, $2, $3)
           ON CONFLICT (opening_id, alias) DO NOTHING"#,
    )
    .bind(opening_id)
    .bind(alias)
    .bind(source)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn upsert_transition(
    conn: &mut PgConnection,
    from: &OpeningRecordRef<'_>,
    to: &OpeningRecordRef<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO opening_transitions
               (from_fen, to_fen, from_moves, to_moves, from_src, to_src, from_opening_id, to_opening_id)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
           ON CONFLICT (from_moves, to_moves) DO UPDATE SET
               from_fen = EXCLUDED.from_fen,
               to_fen = EXCLUDED.to_fen,
               from_opening_id = EXCLUDED.from_opening_id,
               to_opening_id = EXCLUDED.to_opening_id"#,
    )
    .bind(from.fen)
    .bind(to.fen)
    .bind(from.moves)
    .bind(to.moves)
    .bind(from.src)
    .bind(to.src)
    .bind(from.id)
    .bind(to.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Borrowed view of a stored opening, used when linking transitions.
pub struct OpeningRecordRef<'a> {
    pub id: i64,
    pub fen: &'a str,
    pub moves: &'a str,
    pub src: &'a str,
}
