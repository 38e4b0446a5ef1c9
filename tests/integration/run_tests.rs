//! End-to-end runs of each step against a mock site

use crate::common::{detail_page, mount_details, mount_discovery, test_config};
use excavator::storage::{SqliteStorage, Storage};
use excavator::{Excavator, Step};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn open_db(dir: &TempDir) -> SqliteStorage {
    SqliteStorage::new(&dir.path().join("excavator.db")).expect("Failed to open database")
}

#[tokio::test]
async fn test_full_run_stores_links_and_characters() {
    let server = MockServer::start().await;
    mount_discovery(&server, 1).await;
    mount_details(&server, 1).await;

    let dir = TempDir::new().unwrap();
    let mut excavator = Excavator::new(test_config(&dir, &server.uri()));

    let summary = excavator.run(Step::All).await.expect("Run failed");

    assert_eq!(summary.step, Step::All);
    assert_eq!(summary.drained, 3);
    assert!(summary.is_clean(), "unexpected failures: {:?}", summary);

    let queries = summary.stage("radical_queries").unwrap();
    assert_eq!(queries.inserted, 3);
    assert_eq!(queries.emitted, 3);

    let details = summary.stage("character_details").unwrap();
    assert_eq!(details.received, 3);
    assert_eq!(details.inserted, 3);

    // Release the orchestrator's connection before reading the database
    drop(excavator);

    let storage = open_db(&dir);
    assert_eq!(storage.count_radical_characters().unwrap(), 3);
    assert_eq!(storage.count_characters().unwrap(), 3);

    let characters = storage.find_characters(10, 0).unwrap();
    let zhong = characters.iter().find(|c| c.ch == "中").unwrap();
    assert_eq!(zhong.radical, "丨");
    assert_eq!(zhong.pinyin, vec!["zhōng", "zhòng"]);
    assert_eq!(zhong.radical_strokes, Some(3));
    assert_eq!(zhong.total_strokes, Some(4));
    assert_eq!(zhong.comments, vec!["中心"]);
}

#[tokio::test]
async fn test_rerun_is_served_from_cache_and_not_duplicated() {
    let server = MockServer::start().await;
    // Every resource is fetched exactly once across both runs
    mount_discovery(&server, 1).await;
    mount_details(&server, 1).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server.uri());

    let first = Excavator::new(config.clone()).run(Step::All).await.unwrap();
    let second = Excavator::new(config).run(Step::All).await.unwrap();

    assert_eq!(first.total_inserted(), 6);
    assert_eq!(second.total_inserted(), 0);
    assert_eq!(second.drained, 3);

    let queries = second.stage("radical_queries").unwrap();
    assert_eq!(queries.already_present, 3);
    assert_eq!(queries.emitted, 3);
    let details = second.stage("character_details").unwrap();
    assert_eq!(details.already_present, 3);

    let storage = open_db(&dir);
    assert_eq!(storage.count_radical_characters().unwrap(), 3);
    assert_eq!(storage.count_characters_by_ch("中").unwrap(), 1);
}

#[tokio::test]
async fn test_radical_step_never_fetches_details() {
    let server = MockServer::start().await;
    mount_discovery(&server, 1).await;
    mount_details(&server, 0).await;

    let dir = TempDir::new().unwrap();
    let summary = Excavator::new(test_config(&dir, &server.uri()))
        .run(Step::Radical)
        .await
        .unwrap();

    assert_eq!(summary.stages.len(), 1);
    assert_eq!(summary.drained, 3);

    let storage = open_db(&dir);
    assert_eq!(storage.count_radical_characters().unwrap(), 3);
    assert_eq!(storage.count_characters().unwrap(), 0);
}

#[tokio::test]
async fn test_character_step_picks_up_stored_links() {
    let server = MockServer::start().await;
    mount_discovery(&server, 1).await;
    mount_details(&server, 1).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server.uri());

    Excavator::new(config.clone()).run(Step::Radical).await.unwrap();
    let summary = Excavator::new(config).run(Step::Character).await.unwrap();

    // Batch size 2 over 3 stored links
    let stored = summary.stage("stored_radicals").unwrap();
    assert_eq!(stored.received, 3);
    assert_eq!(stored.emitted, 3);
    assert_eq!(summary.drained, 3);

    let storage = open_db(&dir);
    assert_eq!(storage.count_characters().unwrap(), 3);
}

#[tokio::test]
async fn test_character_step_on_empty_database() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let summary = Excavator::new(test_config(&dir, &server.uri()))
        .run(Step::Character)
        .await
        .unwrap();

    assert_eq!(summary.drained, 0);
    assert!(summary.is_clean());
}

#[tokio::test]
async fn test_broken_detail_page_is_skipped() {
    let server = MockServer::start().await;
    mount_discovery(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/1/YI"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/JIU"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>moved</body></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/4/ZHONG"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("总笔画：4", &[])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = Excavator::new(test_config(&dir, &server.uri()))
        .run(Step::All)
        .await
        .unwrap();

    let details = summary.stage("character_details").unwrap();
    assert_eq!(details.received, 3);
    assert_eq!(details.failed, 2);
    assert_eq!(details.inserted, 1);
    assert_eq!(summary.drained, 1);
    assert_eq!(summary.total_failed(), 2);

    let storage = open_db(&dir);
    let characters = storage.find_characters(10, 0).unwrap();
    assert_eq!(characters.len(), 1);
    assert_eq!(characters[0].ch, "中");
    // Seeded from the discovery link
    assert_eq!(characters[0].radical, "丨");
}

#[tokio::test]
async fn test_missing_index_ends_run_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = Excavator::new(test_config(&dir, &server.uri()))
        .run(Step::All)
        .await
        .unwrap();

    assert_eq!(summary.drained, 0);
    assert!(summary.stage("radical_queries").unwrap().error.is_some());
    assert!(summary.stage("character_details").unwrap().is_clean());
}

#[tokio::test]
async fn test_config_file_drives_run() {
    let server = MockServer::start().await;
    mount_discovery(&server, 1).await;

    let dir = TempDir::new().unwrap();
    let workspace = dir.path().join("work");
    let database = dir.path().join("db").join("excavator.db");
    let config_path = dir.path().join("excavator.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[excavator]
base-url = "{}"
workspace = "{}"
cache-dir = "pages"
radical-type = "bushou"

[output]
database-path = "{}"
"#,
            server.uri(),
            workspace.display(),
            database.display()
        ),
    )
    .unwrap();

    let config = excavator::config::load_config(&config_path).unwrap();
    let summary = Excavator::new(config).run(Step::Radical).await.unwrap();

    assert_eq!(summary.drained, 3);
    assert!(Path::new(&database).exists());
    let cached = std::fs::read_dir(workspace.join("pages")).unwrap().count();
    // Index page plus two radical queries
    assert_eq!(cached, 3);
}
