//! Persistence gate
//!
//! Records are written only if no record with the same natural key exists
//! yet. Both the count and the insert run under one lock on the shared
//! storage handle, so stages sharing a handle cannot race each other. Two
//! handles on the same database file (or two processes) are not covered.

use crate::storage::{lock, Character, RadicalCharacter, SharedStorage, Storage, StorageResult};

/// Result of a gated write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Inserted,
    AlreadyExists,
}

/// A record that can pass through the gate
pub trait Persist {
    /// Record kind, for logs
    const KIND: &'static str;

    /// Natural key the record is deduplicated on
    fn existence_key(&self) -> &str;

    /// Number of stored records carrying `key`
    fn count_existing(storage: &dyn Storage, key: &str) -> StorageResult<u64>;

    fn insert_into(&self, storage: &mut dyn Storage) -> StorageResult<()>;
}

impl Persist for RadicalCharacter {
    const KIND: &'static str = "radical_character";

    fn existence_key(&self) -> &str {
        &self.url
    }

    fn count_existing(storage: &dyn Storage, key: &str) -> StorageResult<u64> {
        storage.count_radical_characters_by_url(key)
    }

    fn insert_into(&self, storage: &mut dyn Storage) -> StorageResult<()> {
        storage.insert_radical_character(self)
    }
}

impl Persist for Character {
    const KIND: &'static str = "character";

    fn existence_key(&self) -> &str {
        &self.ch
    }

    fn count_existing(storage: &dyn Storage, key: &str) -> StorageResult<u64> {
        storage.count_characters_by_ch(key)
    }

    fn insert_into(&self, storage: &mut dyn Storage) -> StorageResult<()> {
        storage.insert_character(self)
    }
}

/// Inserts `record` unless a record with its existence key is already stored
///
/// Calling this twice with the same record leaves exactly one stored copy.
pub fn persist_if_absent<R: Persist>(
    storage: &SharedStorage,
    record: &R,
) -> StorageResult<PersistOutcome> {
    let key = record.existence_key();
    let mut guard = lock(storage)?;

    if R::count_existing(&*guard, key)? > 0 {
        tracing::debug!(kind = R::KIND, key, "already stored");
        return Ok(PersistOutcome::AlreadyExists);
    }

    record.insert_into(&mut *guard)?;
    tracing::debug!(kind = R::KIND, key, "stored");
    Ok(PersistOutcome::Inserted)
}
