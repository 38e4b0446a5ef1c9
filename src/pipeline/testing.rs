//! Storage double for exercising failure paths in stage tests

use crate::storage::{Character, MemoryStorage, RadicalCharacter, Storage, StorageError, StorageResult};
use std::io;

/// Wraps `MemoryStorage` and fails selected writes and reads
#[derive(Debug, Default)]
pub(crate) struct FlakyStorage {
    inner: MemoryStorage,
    failing_key: Option<String>,
    failing_offset: Option<usize>,
}

impl FlakyStorage {
    pub(crate) fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Inserts of the record with this natural key (url or character) fail
    pub(crate) fn failing_insert_of(mut self, key: &str) -> Self {
        self.failing_key = Some(key.to_string());
        self
    }

    /// Radical link reads starting at this offset fail
    pub(crate) fn failing_read_at(mut self, offset: usize) -> Self {
        self.failing_offset = Some(offset);
        self
    }

    fn check_insert(&self, key: &str) -> StorageResult<()> {
        if self.failing_key.as_deref() == Some(key) {
            return Err(StorageError::Io(io::Error::new(io::ErrorKind::Other, "disk full")));
        }
        Ok(())
    }
}

impl Storage for FlakyStorage {
    fn count_radical_characters(&self) -> StorageResult<u64> {
        self.inner.count_radical_characters()
    }

    fn count_radical_characters_by_url(&self, url: &str) -> StorageResult<u64> {
        self.inner.count_radical_characters_by_url(url)
    }

    fn insert_radical_character(&mut self, record: &RadicalCharacter) -> StorageResult<()> {
        self.check_insert(&record.url)?;
        self.inner.insert_radical_character(record)
    }

    fn find_radical_characters(
        &self,
        limit: usize,
        offset: usize,
    ) -> StorageResult<Vec<RadicalCharacter>> {
        if self.failing_offset == Some(offset) {
            return Err(StorageError::Io(io::Error::new(io::ErrorKind::Other, "bad page")));
        }
        self.inner.find_radical_characters(limit, offset)
    }

    fn count_characters(&self) -> StorageResult<u64> {
        self.inner.count_characters()
    }

    fn count_characters_by_ch(&self, ch: &str) -> StorageResult<u64> {
        self.inner.count_characters_by_ch(ch)
    }

    fn insert_character(&mut self, record: &Character) -> StorageResult<()> {
        self.check_insert(&record.ch)?;
        self.inner.insert_character(record)
    }

    fn find_characters(&self, limit: usize, offset: usize) -> StorageResult<Vec<Character>> {
        self.inner.find_characters(limit, offset)
    }
}
