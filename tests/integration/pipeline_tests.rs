//! Stage wiring over a real SQLite database

use excavator::pipeline::{
    channel, persist_if_absent, spawn_stage, Message, PersistOutcome, StoredRadicals,
};
use excavator::storage::{lock, shared, SqliteStorage, Storage};
use excavator::RadicalCharacter;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_stored_links_replayed_in_batches_then_sentinel() {
    let dir = TempDir::new().unwrap();
    let mut storage = SqliteStorage::new(&dir.path().join("excavator.db")).unwrap();
    for i in 0..1200 {
        storage
            .insert_radical_character(&RadicalCharacter::new(
                format!("c{}", i),
                "r",
                format!("{}/LINK/", i),
            ))
            .unwrap();
    }
    let storage = shared(storage);

    let (tx, mut rx) = channel(1);
    let stage = StoredRadicals::new(storage, 500, CancellationToken::new());
    let handle = spawn_stage(StoredRadicals::NAME, tx, |out| stage.run(out));

    let mut urls = Vec::new();
    loop {
        match rx.recv().await {
            Some(Message::Item(record)) => urls.push(record.url),
            Some(Message::EndOfStream) => break,
            None => panic!("channel closed without end of stream"),
        }
    }

    let expected: Vec<_> = (0..1200).map(|i| format!("{}/LINK/", i)).collect();
    assert_eq!(urls, expected);

    let report = handle.await.unwrap();
    assert_eq!(report.emitted, 1200);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_gate_on_disk_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let storage = shared(SqliteStorage::new(&dir.path().join("excavator.db")).unwrap());
    let record = RadicalCharacter::new("蒋", "艹", "34/KOKORNKOCQXVILXVB/");

    assert_eq!(persist_if_absent(&storage, &record).unwrap(), PersistOutcome::Inserted);
    assert_eq!(
        persist_if_absent(&storage, &record).unwrap(),
        PersistOutcome::AlreadyExists
    );

    let guard = lock(&storage).unwrap();
    assert_eq!(
        guard
            .count_radical_characters_by_url("34/KOKORNKOCQXVILXVB/")
            .unwrap(),
        1
    );
}
