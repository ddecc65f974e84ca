//! Database schema definitions

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track monitor runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL
);

-- Known addresses with health state
CREATE TABLE IF NOT EXISTS seed_list (
    url TEXT PRIMARY KEY,
    last_checked TEXT,
    failure_count INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_seed_list_active ON seed_list(is_active);

-- Append-only keyword hit log
CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    keyword TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_matches_url ON matches(url);

-- Permanent blocklist; rediscovery must not resurrect evicted seeds
CREATE TABLE IF NOT EXISTS evicted_seeds (
    url TEXT PRIMARY KEY,
    evicted_at TEXT NOT NULL,
    failure_count INTEGER NOT NULL
);
"#;

/// Initializes the database schema (idempotent)
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
