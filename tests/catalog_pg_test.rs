//! Opening matching against the Postgres catalog with seeded rows.
//!
//! Each test builds its own schema from `DATABASE_URL` and drops it at the
//! end. Tests return early when `DATABASE_URL` is not set.

mod common;

use chess_core::{canonical, position};
use server::db::{
    self,
    openings::{NewOpening, OpeningRecordRef, PgCatalog},
};
use server::matcher;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};

/// Pool whose connections all resolve tables in a fresh schema.
async fn isolated_pool(tag: &str) -> Option<(PgPool, String)> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };
    let schema = format!("catalog_{tag}_{}", common::unique_suffix());

    let admin = PgPoolOptions::new().max_connections(1).connect(&url).await.unwrap();
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .unwrap();
    admin.close().await;

    let search_path = format!("SET search_path TO {schema}");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .after_connect(move |conn, _meta| {
            let sql = search_path.clone();
            Box::pin(async move {
                sqlx::query(&sql).execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .unwrap();

    db::pool::run_migrations(&pool).await.unwrap();
    Some((pool, schema))
}

async fn drop_schema(pool: PgPool, schema: &str) {
    sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;
}

struct Seeded {
    kings_pawn: i64,
    kings_knight: i64,
    ruy_lopez: i64,
    exchange: i64,
    sicilian: i64,
}

async fn insert(conn: &mut PgConnection, eco: &str, name: &str, moves: &[&str], is_eco_root: bool) -> i64 {
    let line = canonical::normalize(moves);
    let fen = position::fen_after(moves).unwrap();
    db::openings::upsert_opening(
        conn,
        &NewOpening {
            eco,
            name,
            moves: &line,
            fen: &fen,
            ply_count: canonical::ply_count(&line) as i32,
            src: "fixture",
            is_eco_root,
        },
    )
    .await
    .unwrap()
}

/// Five openings, two resolved transitions and one whose target is missing.
async fn seed(pool: &PgPool) -> Seeded {
    let mut conn = pool.acquire().await.unwrap();

    // Inserted out of rank order so the SQL ORDER BY does the work
    let exchange = insert(&mut conn, "C68", "Ruy Lopez: Exchange Variation", &["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Bxc6"], false).await;
    let sicilian = insert(&mut conn, "B20", "Sicilian Defense", &["e4", "c5"], true).await;
    let ruy_lopez = insert(&mut conn, "C60", "Ruy Lopez", &["e4", "e5", "Nf3", "Nc6", "Bb5"], true).await;
    let kings_knight = insert(&mut conn, "C40", "King's Knight Opening", &["e4", "e5", "Nf3"], false).await;
    let kings_pawn = insert(&mut conn, "C20", "King's Pawn Game", &["e4", "e5"], true).await;

    db::openings::add_alias(&mut conn, ruy_lopez, "Spanish Game", "fixture").await.unwrap();

    let rows: Vec<(i64, String, String)> =
        sqlx::query_as("SELECT id, fen, moves FROM openings ORDER BY id")
            .fetch_all(&mut *conn)
            .await
            .unwrap();
    let by_id = |id: i64| rows.iter().find(|r| r.0 == id).unwrap();
    let link_ref = |id: i64| {
        let (id, fen, moves) = by_id(id);
        OpeningRecordRef { id: *id, fen, moves, src: "fixture" }
    };

    db::openings::upsert_transition(&mut conn, &link_ref(kings_pawn), &link_ref(kings_knight))
        .await
        .unwrap();
    db::openings::upsert_transition(&mut conn, &link_ref(kings_knight), &link_ref(ruy_lopez))
        .await
        .unwrap();

    // Target line was never catalogued
    sqlx::query(
        r#"INSERT INTO opening_transitions
               (from_fen, to_fen, from_moves, to_moves, from_src, to_src, from_opening_id, to_opening_id)
           VALUES ($1, $1, '1. e4 e5', '1. e4 e5 2. Bc4', 'fixture', 'fixture', $2, NULL)"#,
    )
    .bind(&by_id(kings_pawn).1)
    .bind(kings_pawn)
    .execute(&mut *conn)
    .await
    .unwrap();

    Seeded { kings_pawn, kings_knight, ruy_lopez, exchange, sicilian }
}

fn moves(list: &[&str]) -> Option<Vec<String>> {
    Some(list.iter().map(|m| m.to_string()).collect())
}

fn ids(result: &matcher::MatchResult) -> Vec<i64> {
    result.openings.iter().map(|o| o.id).collect()
}

#[tokio::test]
async fn pg_catalog_prefix_containment_and_rank() {
    let Some((pool, schema)) = isolated_pool("match").await else {
        return;
    };
    let s = seed(&pool).await;
    let catalog = PgCatalog::new(pool.clone());

    // Played line extends the Ruy Lopez and is contained in the Exchange line
    let result = matcher::find_matches(&catalog, moves(&["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]))
        .await
        .unwrap();
    assert_eq!(ids(&result), vec![s.kings_pawn, s.ruy_lopez, s.kings_knight, s.exchange]);
    assert!(result.exact_matches);
    assert_eq!(result.count, 4);

    // Short played line is contained in every 1. e4 e5 opening
    let result = matcher::find_matches(&catalog, moves(&["e4", "e5"])).await.unwrap();
    assert_eq!(ids(&result), vec![s.kings_pawn, s.ruy_lopez, s.kings_knight, s.exchange]);
    assert!(!ids(&result).contains(&s.sicilian));

    let ruy = result.openings.iter().find(|o| o.id == s.ruy_lopez).unwrap();
    assert_eq!(ruy.aliases, vec!["Spanish Game".to_string()]);
    assert_eq!(ruy.moves, "1. e4 e5 2. Nf3 Nc6 3. Bb5");

    drop_schema(pool, &schema).await;
}

#[tokio::test]
async fn pg_catalog_drops_unresolved_transitions() {
    let Some((pool, schema)) = isolated_pool("transitions").await else {
        return;
    };
    let s = seed(&pool).await;
    let catalog = PgCatalog::new(pool.clone());

    let result = matcher::find_matches(&catalog, moves(&["e4", "e5"])).await.unwrap();
    let targets: Vec<i64> = result
        .transitions
        .iter()
        .map(|t| t.to_opening.as_ref().map(|o| o.id).unwrap())
        .collect();
    assert_eq!(targets, vec![s.kings_knight, s.ruy_lopez]);
    assert!(result.transitions.iter().all(|t| t.to_line != "1. e4 e5 2. Bc4"));

    drop_schema(pool, &schema).await;
}

#[tokio::test]
async fn pg_catalog_no_match_is_empty() {
    let Some((pool, schema)) = isolated_pool("nomatch").await else {
        return;
    };
    seed(&pool).await;
    let catalog = PgCatalog::new(pool.clone());

    let result = matcher::find_matches(&catalog, moves(&["a4", "a5", "h4", "h5"])).await.unwrap();
    assert!(result.openings.is_empty());
    assert!(result.transitions.is_empty());
    assert!(!result.exact_matches);
    assert_eq!(result.search_info.normalized_moves, "1. a4 a5 2. h4 h5");

    drop_schema(pool, &schema).await;
}

#[tokio::test]
async fn reimport_leaves_one_root_per_eco() {
    let Some((pool, schema)) = isolated_pool("roots").await else {
        return;
    };
    let s = seed(&pool).await;

    // A later import where the King's Knight line is the only C-code row
    let mut tx = pool.begin().await.unwrap();
    let cleared = db::openings::reset_eco_roots(&mut tx).await.unwrap();
    assert_eq!(cleared, 3);
    insert(&mut tx, "C40", "King's Knight Opening", &["e4", "e5", "Nf3"], true).await;
    tx.commit().await.unwrap();

    let roots: Vec<(i64,)> = sqlx::query_as("SELECT id FROM openings WHERE is_eco_root ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(roots, vec![(s.kings_knight,)]);

    drop_schema(pool, &schema).await;
}

#[tokio::test]
async fn favorites_list_carries_aliases() {
    let Some((pool, schema)) = isolated_pool("favorites").await else {
        return;
    };
    let s = seed(&pool).await;

    let user = db::accounts::create_account(&pool, "fixture_user", "fixture@openings.test", "x")
        .await
        .unwrap();
    assert!(db::favorites::add_favorite(&pool, user, s.ruy_lopez).await.unwrap());

    let favorites = db::favorites::list_favorites(&pool, user).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, s.ruy_lopez);
    assert_eq!(favorites[0].aliases, vec!["Spanish Game".to_string()]);
    assert_eq!(favorites[0].ply_count, 5);

    drop_schema(pool, &schema).await;
}
