//! Integration tests for the URL validator

use site_corpus::config::Config;
use site_corpus::validator::Validator;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_head(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn create_validator(server: &MockServer) -> Validator {
    let mut config = Config::for_site(crate::common::domain_of(server), vec![]);
    config.validator.timeout_secs = 5;
    config.validator.concurrency_limit = 4;
    Validator::from_config(&config).expect("Failed to build validator")
}

#[tokio::test]
async fn test_validate_classifies_urls() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_head(
        &mock_server,
        "/ok.html",
        ResponseTemplate::new(200).insert_header("content-type", "text/html; charset=utf-8"),
    )
    .await;
    mount_head(
        &mock_server,
        "/doc.pdf",
        ResponseTemplate::new(200).insert_header("content-type", "application/pdf"),
    )
    .await;
    mount_head(
        &mock_server,
        "/old.html",
        ResponseTemplate::new(301).insert_header("location", format!("{}/ok.html", base).as_str()),
    )
    .await;
    mount_head(&mock_server, "/missing.html", ResponseTemplate::new(404)).await;

    let urls = ["/ok.html", "/doc.pdf", "/old.html", "/missing.html"]
        .iter()
        .map(|p| format!("{}{}", base, p));
    let report = create_validator(&mock_server).validate("127.0.0.1", urls).await;

    assert_eq!(report.summary.total_checked, 4);
    assert_eq!(report.summary.valid_count, 3);
    assert_eq!(report.summary.invalid_count, 1);
    assert_eq!(report.summary.redirect_count, 1);
    // The redirect lands on an HTML page too
    assert_eq!(report.summary.html_count, 2);

    let missing = &report.invalid_urls[0];
    assert_eq!(missing.url, format!("{}/missing.html", base));
    assert_eq!(missing.status, 404);

    let redirected = report
        .valid_urls
        .iter()
        .find(|c| c.url.ends_with("/old.html"))
        .expect("redirected URL should be valid");
    assert_eq!(redirected.redirected_to, Some(format!("{}/ok.html", base)));
}

#[tokio::test]
async fn test_report_written_as_json() {
    let mock_server = MockServer::start().await;
    mount_head(&mock_server, "/", ResponseTemplate::new(200)).await;

    let report = create_validator(&mock_server)
        .validate("127.0.0.1", vec![format!("{}/", mock_server.uri())])
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let report_path = dir.path().join("url_validation.json");
    report.write_json(&report_path).expect("Failed to write report");

    let raw = std::fs::read_to_string(&report_path).expect("Report should exist");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("Report is valid JSON");
    assert_eq!(value["base_domain"], "127.0.0.1");
    assert_eq!(value["summary"]["valid_count"], 1);
    assert!(value["invalid_urls"].as_array().unwrap().is_empty());
}
