//! Integration tests for the HTTP fetcher

use crate::common::{html, mount_get};
use encoding_rs::SHIFT_JIS;
use site_corpus::config::FetcherConfig;
use site_corpus::crawler::{FetchResult, HttpFetcher, PageFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_fetcher() -> HttpFetcher {
    let config = FetcherConfig {
        timeout_secs: 5,
        user_agent: "TestBot/1.0".to_string(),
        ..FetcherConfig::default()
    };
    HttpFetcher::new(&config).expect("Failed to build client")
}

#[tokio::test]
async fn test_success_reports_status_and_body() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, "/page.html", html("<title>Page</title>")).await;

    let result = create_fetcher()
        .fetch(&format!("{}/page.html", mock_server.uri()))
        .await;

    match result {
        FetchResult::Success {
            status_code,
            content_type,
            body,
            ..
        } => {
            assert_eq!(status_code, 200);
            assert!(content_type.starts_with("text/html"));
            assert_eq!(body, "<title>Page</title>");
        }
        other => panic!("Expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0"))
        .respond_with(html("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = create_fetcher().fetch(&format!("{}/", mock_server.uri())).await;
    assert!(matches!(result, FetchResult::Success { .. }));
}

#[tokio::test]
async fn test_non_success_status_is_http_failure() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, "/gone", ResponseTemplate::new(410)).await;
    mount_get(&mock_server, "/broken", ResponseTemplate::new(500)).await;

    let fetcher = create_fetcher();
    let base = mock_server.uri();

    assert!(matches!(
        fetcher.fetch(&format!("{}/gone", base)).await,
        FetchResult::HttpFailure { status_code: 410 }
    ));
    assert!(matches!(
        fetcher.fetch(&format!("{}/broken", base)).await,
        FetchResult::HttpFailure { status_code: 500 }
    ));
    assert!(matches!(
        fetcher.fetch(&format!("{}/missing", base)).await,
        FetchResult::HttpFailure { status_code: 404 }
    ));
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    let result = create_fetcher().fetch("http://127.0.0.1:1/").await;
    assert!(matches!(result, FetchResult::TransportFailure { .. }));
}

#[tokio::test]
async fn test_shift_jis_fallback() {
    let mock_server = MockServer::start().await;
    let (bytes, _, _) = SHIFT_JIS.encode("<title>千代田区</title><a href=\"/kurashi/\">暮らし</a>");
    mount_get(
        &mock_server,
        "/",
        ResponseTemplate::new(200).set_body_raw(bytes.into_owned(), "text/html"),
    )
    .await;

    let result = create_fetcher().fetch(&format!("{}/", mock_server.uri())).await;

    match result {
        FetchResult::Success { body, .. } => {
            assert!(body.contains("千代田区"));
            assert!(body.contains("暮らし"));
        }
        other => panic!("Expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_declared_charset_wins() {
    let mock_server = MockServer::start().await;
    let (bytes, _, _) = SHIFT_JIS.encode("<p>お知らせ</p>");
    mount_get(
        &mock_server,
        "/",
        ResponseTemplate::new(200).set_body_raw(bytes.into_owned(), "text/html; charset=Shift_JIS"),
    )
    .await;

    let result = create_fetcher().fetch(&format!("{}/", mock_server.uri())).await;

    match result {
        FetchResult::Success { body, .. } => assert_eq!(body, "<p>お知らせ</p>"),
        other => panic!("Expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_redirect_reports_final_url() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    mount_get(
        &mock_server,
        "/old.html",
        ResponseTemplate::new(301).insert_header("location", format!("{}/new.html", base).as_str()),
    )
    .await;
    mount_get(&mock_server, "/new.html", html("<p>moved</p>")).await;

    let result = create_fetcher().fetch(&format!("{}/old.html", base)).await;

    match result {
        FetchResult::Success { final_url, .. } => {
            assert_eq!(final_url, format!("{}/new.html", base));
        }
        other => panic!("Expected success, got {:?}", other),
    }
}
