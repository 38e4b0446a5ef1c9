//! Cache-backed fetching through the public API

use excavator::net::{build_http_client, GetPage};
use excavator::{Config, ContentCache, Fetcher, ResourceKey};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_in(dir: &TempDir) -> Fetcher {
    let config = Config::default_for("http://localhost");
    let client = build_http_client(&config.http).expect("Failed to build client");
    Fetcher::new(client, ContentCache::in_workspace(dir.path(), "cache"))
}

#[tokio::test]
async fn test_same_url_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("B"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let fetcher = fetcher_in(&dir);
    let url = format!("{}/x", server.uri());

    let first = fetcher.fetch_bytes(&GetPage::new(&url)).await.unwrap();
    let second = fetcher.fetch_bytes(&GetPage::new(&url)).await.unwrap();

    assert_eq!(first, b"B");
    assert_eq!(second, b"B");

    // The entry is named by the hex SHA-256 of the URL
    let expected_name = hex::encode(Sha256::digest(url.as_bytes()));
    assert_eq!(ResourceKey::from_identity(&url).as_str(), expected_name);
    let entry = dir.path().join("cache").join(&expected_name);
    assert_eq!(std::fs::read(entry).unwrap(), b"B");
}

#[tokio::test]
async fn test_distinct_urls_get_distinct_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("A"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string("B"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let fetcher = fetcher_in(&dir);

    let a = fetcher
        .fetch_text(&GetPage::new(format!("{}/a", server.uri())))
        .await
        .unwrap();
    let b = fetcher
        .fetch_text(&GetPage::new(format!("{}/b", server.uri())))
        .await
        .unwrap();

    assert_eq!((a.as_str(), b.as_str()), ("A", "B"));
    assert_eq!(std::fs::read_dir(dir.path().join("cache")).unwrap().count(), 2);
}

#[tokio::test]
async fn test_server_error_leaves_no_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let fetcher = fetcher_in(&dir);
    let url = format!("{}/broken", server.uri());

    let err = fetcher.fetch_bytes(&GetPage::new(&url)).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(!fetcher.cache().has(&ResourceKey::from_identity(&url)).await);
}
