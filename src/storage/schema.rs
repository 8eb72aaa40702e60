//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Rumble-Crawl database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    status TEXT NOT NULL,
    pages_visited INTEGER NOT NULL DEFAULT 0,
    products_found INTEGER NOT NULL DEFAULT 0
);

-- Products, keyed by a hash of their page URL
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    o_title TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Mirrored images, keyed by a hash of their bytes
CREATE TABLE IF NOT EXISTS images (
    id TEXT PRIMARY KEY,
    pid TEXT NOT NULL REFERENCES products(id),
    source_url TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_images_pid ON images(pid);
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
