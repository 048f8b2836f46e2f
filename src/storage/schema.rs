//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the site-survey database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_visited INTEGER NOT NULL DEFAULT 0
);

-- Per-page metadata, one row per processed page per run
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    title TEXT,
    description TEXT,
    h1 TEXT NOT NULL,
    h2 TEXT NOT NULL,
    canonical_url TEXT,
    canonical_matches INTEGER NOT NULL,
    from_sitemap_only INTEGER NOT NULL,
    recorded_at TEXT NOT NULL,
    UNIQUE(run_id, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_run ON pages(run_id);

-- Inbound link statistics, one row per destination per run
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    destination_url TEXT NOT NULL,
    inbound_count INTEGER NOT NULL,
    source_urls TEXT NOT NULL,
    anchor_texts TEXT NOT NULL,
    UNIQUE(run_id, destination_url)
);

CREATE INDEX IF NOT EXISTS idx_links_run ON links(run_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
