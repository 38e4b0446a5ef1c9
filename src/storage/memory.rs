//! In-memory storage backend
//!
//! Keeps records in insertion order in plain vectors. Library callers can
//! hand it to `Excavator::with_storage` to run without a database file; the
//! pipeline tests use it the same way.

use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{Character, RadicalCharacter};

/// Vector-backed storage
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    radical_characters: Vec<RadicalCharacter>,
    characters: Vec<Character>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-populated with radical links
    pub fn with_radical_characters(records: Vec<RadicalCharacter>) -> Self {
        Self {
            radical_characters: records,
            characters: Vec::new(),
        }
    }
}

fn page<T: Clone>(records: &[T], limit: usize, offset: usize) -> Vec<T> {
    records.iter().skip(offset).take(limit).cloned().collect()
}

impl Storage for MemoryStorage {
    fn count_radical_characters(&self) -> StorageResult<u64> {
        Ok(self.radical_characters.len() as u64)
    }

    fn count_radical_characters_by_url(&self, url: &str) -> StorageResult<u64> {
        Ok(self
            .radical_characters
            .iter()
            .filter(|r| r.url == url)
            .count() as u64)
    }

    fn insert_radical_character(&mut self, record: &RadicalCharacter) -> StorageResult<()> {
        self.radical_characters.push(record.clone());
        Ok(())
    }

    fn find_radical_characters(
        &self,
        limit: usize,
        offset: usize,
    ) -> StorageResult<Vec<RadicalCharacter>> {
        Ok(page(&self.radical_characters, limit, offset))
    }

    fn count_characters(&self) -> StorageResult<u64> {
        Ok(self.characters.len() as u64)
    }

    fn count_characters_by_ch(&self, ch: &str) -> StorageResult<u64> {
        Ok(self.characters.iter().filter(|c| c.ch == ch).count() as u64)
    }

    fn insert_character(&mut self, record: &Character) -> StorageResult<()> {
        self.characters.push(record.clone());
        Ok(())
    }

    fn find_characters(&self, limit: usize, offset: usize) -> StorageResult<Vec<Character>> {
        Ok(page(&self.characters, limit, offset))
    }
}
