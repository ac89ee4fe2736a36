//! Unit tests for the link preview client, against a mock preview API.

use std::time::Duration;

use linkstash::config::PreviewConfig;
use linkstash::services::preview_fetcher::{LinkPreviewClient, PreviewFetcher};
use linkstash::types::errors::PreviewError;
use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> LinkPreviewClient {
    let config = PreviewConfig {
        api_url: server.uri(),
        api_key: "test-key".to_string(),
        timeout: Duration::from_secs(5),
        ..PreviewConfig::default()
    };
    LinkPreviewClient::new(&config).expect("client should build")
}

#[tokio::test]
async fn test_fetch_preview_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "https://example.com/a?b=c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Example Domain",
            "description": "An example",
            "image": "https://example.com/og.png",
            "url": "https://example.com/a?b=c",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let preview = client_for(&server)
        .fetch_preview("https://example.com/a?b=c")
        .await;

    assert_eq!(preview.title.as_deref(), Some("Example Domain"));
    assert_eq!(preview.description.as_deref(), Some("An example"));
    assert_eq!(preview.image.as_deref(), Some("https://example.com/og.png"));
}

#[tokio::test]
async fn test_fetch_preview_non_success_falls_back_to_hostname() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": 401})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let preview = client.fetch_preview("https://www.rust-lang.org/learn").await;

    assert_eq!(preview.title.as_deref(), Some("www.rust-lang.org"));
    assert_eq!(preview.url.as_deref(), Some("https://www.rust-lang.org/learn"));
    assert!(preview.image.is_none());

    let err = client.try_fetch("https://www.rust-lang.org/learn").await.unwrap_err();
    assert!(matches!(err, PreviewError::Status(401)));
}

#[tokio::test]
async fn test_fetch_preview_bad_body_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let preview = client.fetch_preview("https://example.org").await;
    assert_eq!(preview, LinkPreviewClient::fallback("https://example.org"));

    let err = client.try_fetch("https://example.org").await.unwrap_err();
    assert!(matches!(err, PreviewError::Parse(_)));
}

#[tokio::test]
async fn test_fetch_preview_unreachable_api_falls_back() {
    let config = PreviewConfig {
        api_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
        ..PreviewConfig::default()
    };
    let client = LinkPreviewClient::new(&config).unwrap();

    let preview = client.fetch_preview("https://example.net/x").await;
    assert_eq!(preview.title.as_deref(), Some("example.net"));
}

#[tokio::test]
async fn test_fetch_preview_makes_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let _ = client_for(&server).fetch_preview("https://example.com").await;
    // `expect(1)` is verified when the server drops
}
