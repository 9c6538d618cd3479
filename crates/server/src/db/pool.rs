use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run the full Postgres schema migration inline.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Accounts table (credentials login)
CREATE TABLE IF NOT EXISTS accounts (
    id            BIGSERIAL PRIMARY KEY,
    username      TEXT UNIQUE NOT NULL,
    email         TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    display_name  TEXT,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_accounts_email_lower
    ON accounts (LOWER(email));
CREATE INDEX IF NOT EXISTS idx_accounts_username_lower
    ON accounts (LOWER(username));

-- Opening catalog. `moves` holds the canonical line ("1. e4 e5 2. Nf3").
CREATE TABLE IF NOT EXISTS openings (
    id          BIGSERIAL PRIMARY KEY,
    eco         TEXT NOT NULL,
    name        TEXT NOT NULL,
    moves       TEXT NOT NULL,
    fen         TEXT NOT NULL,
    ply_count   INTEGER NOT NULL,
    src         TEXT NOT NULL DEFAULT 'lichess',
    is_eco_root BOOLEAN NOT NULL DEFAULT FALSE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE(moves, name)
);

CREATE INDEX IF NOT EXISTS idx_openings_eco   ON openings (eco);
CREATE INDEX IF NOT EXISTS idx_openings_moves ON openings (moves text_pattern_ops);
CREATE INDEX IF NOT EXISTS idx_openings_fen   ON openings (fen);

CREATE TABLE IF NOT EXISTS opening_aliases (
    id         BIGSERIAL PRIMARY KEY,
    opening_id BIGINT NOT NULL REFERENCES openings(id) ON DELETE CASCADE,
    alias      TEXT NOT NULL,
    source     TEXT,
    UNIQUE(opening_id, alias)
);

CREATE INDEX IF NOT EXISTS idx_opening_aliases_opening_id ON opening_aliases (opening_id);

-- Known continuations between catalogued lines. Opening references become
-- NULL when the referenced opening is deleted.
CREATE TABLE IF NOT EXISTS opening_transitions (
    id              BIGSERIAL PRIMARY KEY,
    from_fen        TEXT NOT NULL,
    to_fen          TEXT NOT NULL,
    from_moves      TEXT NOT NULL,
    to_moves        TEXT NOT NULL,
    from_src        TEXT NOT NULL DEFAULT 'lichess',
    to_src          TEXT NOT NULL DEFAULT 'lichess',
    from_opening_id BIGINT REFERENCES openings(id) ON DELETE SET NULL,
    to_opening_id   BIGINT REFERENCES openings(id) ON DELETE SET NULL,
    UNIQUE(from_moves, to_moves)
);

CREATE INDEX IF NOT EXISTS idx_transitions_from_opening ON opening_transitions (from_opening_id);
CREATE INDEX IF NOT EXISTS idx_transitions_to_opening   ON opening_transitions (to_opening_id);

-- Per-user state
CREATE TABLE IF NOT EXISTS user_favorites (
    user_id    BIGINT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    opening_id BIGINT NOT NULL REFERENCES openings(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (user_id, opening_id)
);

CREATE TABLE IF NOT EXISTS user_opening_visits (
    user_id         BIGINT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    opening_id      BIGINT NOT NULL REFERENCES openings(id) ON DELETE CASCADE,
    visit_count     INTEGER NOT NULL DEFAULT 0,
    last_visited_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (user_id, opening_id)
);

CREATE TABLE IF NOT EXISTS practice_sessions (
    id           BIGSERIAL PRIMARY KEY,
    user_id      BIGINT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    opening_id   BIGINT NOT NULL REFERENCES openings(id) ON DELETE CASCADE,
    started_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    completed_at TIMESTAMPTZ,
    moves_played INTEGER,
    mistakes     INTEGER
);

CREATE INDEX IF NOT EXISTS idx_practice_sessions_user
    ON practice_sessions (user_id, started_at DESC);
"#;
