//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{Character, RadicalCharacter};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn to_json(values: &[String]) -> StorageResult<String> {
    serde_json::to_string(values).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn from_json(column: usize, text: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn radical_character_from_row(row: &Row<'_>) -> rusqlite::Result<RadicalCharacter> {
    Ok(RadicalCharacter {
        character: row.get(0)?,
        radical: row.get(1)?,
        url: row.get(2)?,
        pinyin: row.get(3)?,
        strokes: row.get(4)?,
    })
}

fn character_from_row(row: &Row<'_>) -> rusqlite::Result<Character> {
    Ok(Character {
        ch: row.get(0)?,
        radical: row.get(1)?,
        pinyin: from_json(2, &row.get::<_, String>(2)?)?,
        radical_strokes: row.get(3)?,
        total_strokes: row.get(4)?,
        kangxi: row.get(5)?,
        kangxi_strokes: row.get(6)?,
        wuxing: row.get(7)?,
        lucky: row.get(8)?,
        traditional: row.get(9)?,
        variants: from_json(10, &row.get::<_, String>(10)?)?,
        comments: from_json(11, &row.get::<_, String>(11)?)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Radical → character links =====

    fn count_radical_characters(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM radical_characters", [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }

    fn count_radical_characters_by_url(&self, url: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM radical_characters WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn insert_radical_character(&mut self, record: &RadicalCharacter) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO radical_characters (character, radical, url, pinyin, strokes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.character,
                record.radical,
                record.url,
                record.pinyin,
                record.strokes,
                now
            ],
        )?;
        Ok(())
    }

    fn find_radical_characters(
        &self,
        limit: usize,
        offset: usize,
    ) -> StorageResult<Vec<RadicalCharacter>> {
        let mut stmt = self.conn.prepare(
            "SELECT character, radical, url, pinyin, strokes
             FROM radical_characters ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        )?;

        let records = stmt
            .query_map(
                params![limit as i64, offset as i64],
                radical_character_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    // ===== Characters =====

    fn count_characters(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM characters", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_characters_by_ch(&self, ch: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM characters WHERE ch = ?1",
            params![ch],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn insert_character(&mut self, record: &Character) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO characters (ch, radical, pinyin, radical_strokes, total_strokes, kangxi,
             kangxi_strokes, wuxing, lucky, traditional, variants, comments, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                record.ch,
                record.radical,
                to_json(&record.pinyin)?,
                record.radical_strokes,
                record.total_strokes,
                record.kangxi,
                record.kangxi_strokes,
                record.wuxing,
                record.lucky,
                record.traditional,
                to_json(&record.variants)?,
                to_json(&record.comments)?,
                now
            ],
        )?;
        Ok(())
    }

    fn find_characters(&self, limit: usize, offset: usize) -> StorageResult<Vec<Character>> {
        let mut stmt = self.conn.prepare(
            "SELECT ch, radical, pinyin, radical_strokes, total_strokes, kangxi, kangxi_strokes,
             wuxing, lucky, traditional, variants, comments
             FROM characters ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        )?;

        let records = stmt
            .query_map(params![limit as i64, offset as i64], character_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
