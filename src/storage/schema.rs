//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Excavator database.
//!
//! The natural-key columns are indexed but deliberately not UNIQUE: duplicate
//! suppression is the job of the pipeline's persistence gate.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Radical index links to character detail pages
CREATE TABLE IF NOT EXISTS radical_characters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    character TEXT NOT NULL,
    radical TEXT NOT NULL,
    url TEXT NOT NULL,
    pinyin TEXT NOT NULL DEFAULT '',
    strokes TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_radical_characters_url ON radical_characters(url);

-- Character detail records
CREATE TABLE IF NOT EXISTS characters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ch TEXT NOT NULL,
    radical TEXT NOT NULL,
    pinyin TEXT NOT NULL,
    radical_strokes INTEGER,
    total_strokes INTEGER,
    kangxi TEXT,
    kangxi_strokes INTEGER,
    wuxing TEXT,
    lucky TEXT,
    traditional TEXT,
    variants TEXT NOT NULL,
    comments TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_characters_ch ON characters(ch);
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
