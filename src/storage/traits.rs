//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{Character, RadicalCharacter};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Each record type exposes the three operations the pipeline needs:
/// counting rows matching its natural key, inserting one record, and paging
/// through stored records in insertion order.
///
/// Implementations are used from several tasks behind a mutex, so they must
/// be `Send`.
pub trait Storage: Send {
    // ===== Radical → character links =====

    /// Counts all stored radical links
    fn count_radical_characters(&self) -> StorageResult<u64>;

    /// Counts stored radical links with the given detail path
    fn count_radical_characters_by_url(&self, url: &str) -> StorageResult<u64>;

    /// Inserts one radical link
    fn insert_radical_character(&mut self, record: &RadicalCharacter) -> StorageResult<()>;

    /// Returns up to `limit` radical links starting at `offset`, in insertion order
    fn find_radical_characters(
        &self,
        limit: usize,
        offset: usize,
    ) -> StorageResult<Vec<RadicalCharacter>>;

    // ===== Characters =====

    /// Counts all stored characters
    fn count_characters(&self) -> StorageResult<u64>;

    /// Counts stored characters with the given symbol
    fn count_characters_by_ch(&self, ch: &str) -> StorageResult<u64>;

    /// Inserts one character
    fn insert_character(&mut self, record: &Character) -> StorageResult<()>;

    /// Returns up to `limit` characters starting at `offset`, in insertion order
    fn find_characters(&self, limit: usize, offset: usize) -> StorageResult<Vec<Character>>;
}
