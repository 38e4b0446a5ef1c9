//! Storage module for persisting crawl results
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Radical→character link records found during discovery
//! - Character detail records
//! - An in-memory backend for runs without a database file
//!
//! Stages share one storage handle behind a mutex. Records are identified by
//! their natural keys (detail path, character symbol), never by row ids.

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage handle shared between stages
pub type SharedStorage = Arc<Mutex<dyn Storage>>;

/// Wraps a storage backend into a shared handle
pub fn shared<S: Storage + 'static>(storage: S) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}

/// Locks a shared storage handle
///
/// A poisoned lock means a stage panicked mid-write; it is reported as a
/// storage error instead of propagating the panic.
pub fn lock(storage: &SharedStorage) -> StorageResult<MutexGuard<'_, dyn Storage + 'static>> {
    storage.lock().map_err(|_| StorageError::LockPoisoned)
}

/// A link from a radical index to a character detail page
///
/// Produced by discovery. The detail path is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadicalCharacter {
    /// The character itself
    #[serde(rename = "zi")]
    pub character: String,

    /// Radical the character is indexed under
    #[serde(rename = "bushou", default)]
    pub radical: String,

    /// Detail page path, relative to the site root
    pub url: String,

    /// Pinyin as listed in the index
    #[serde(rename = "py", default)]
    pub pinyin: String,

    /// Stroke count as listed in the index
    #[serde(rename = "num", default)]
    pub strokes: String,
}

impl RadicalCharacter {
    pub fn new(
        character: impl Into<String>,
        radical: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            character: character.into(),
            radical: radical.into(),
            url: url.into(),
            pinyin: String::new(),
            strokes: String::new(),
        }
    }
}

/// A character record extracted from its detail page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// The character itself; its identity
    pub ch: String,

    /// Radical, falling back to the one the character was discovered under
    pub radical: String,

    /// Readings
    pub pinyin: Vec<String>,

    /// Strokes outside the radical
    pub radical_strokes: Option<u32>,

    /// Total stroke count
    pub total_strokes: Option<u32>,

    /// Kangxi dictionary form
    pub kangxi: Option<String>,

    /// Stroke count of the Kangxi form
    pub kangxi_strokes: Option<u32>,

    /// Five-element classification (五行)
    pub wuxing: Option<String>,

    /// Auspiciousness (吉凶)
    pub lucky: Option<String>,

    /// Traditional form
    pub traditional: Option<String>,

    /// Variant forms
    pub variants: Vec<String>,

    /// Free-text dictionary notes
    pub comments: Vec<String>,
}

impl Character {
    /// Starts a fresh record for the character behind a discovery link
    pub fn seeded_from(link: &RadicalCharacter) -> Self {
        Self {
            ch: link.character.clone(),
            radical: link.radical.clone(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radical_character_from_site_json() {
        let json = r#"{"zi":"蒋","url":"34/KOKORNKOCQXVILXVB/","py":"jiǎng,","bushou":"艹","num":"17"}"#;
        let record: RadicalCharacter = serde_json::from_str(json).unwrap();

        assert_eq!(record.character, "蒋");
        assert_eq!(record.radical, "艹");
        assert_eq!(record.url, "34/KOKORNKOCQXVILXVB/");
        assert_eq!(record.pinyin, "jiǎng,");
        assert_eq!(record.strokes, "17");
    }

    #[test]
    fn test_radical_character_optional_fields() {
        let json = r#"{"zi":"乙","url":"1/ABC/"}"#;
        let record: RadicalCharacter = serde_json::from_str(json).unwrap();
        assert_eq!(record.radical, "");
        assert_eq!(record.strokes, "");
    }

    #[test]
    fn test_seeded_character_is_fresh() {
        let link = RadicalCharacter::new("中", "丨", "1/ZHONG/");
        let ch = Character::seeded_from(&link);

        assert_eq!(ch.ch, "中");
        assert_eq!(ch.radical, "丨");
        assert!(ch.pinyin.is_empty());
        assert!(ch.comments.is_empty());
    }

    #[test]
    fn test_lock_shared_storage() {
        let storage = shared(MemoryStorage::new());
        let guard = lock(&storage).unwrap();
        assert_eq!(guard.count_characters().unwrap(), 0);
    }
}
