//! Shared helpers for the integration tests

use site_corpus::config::Config;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Host of a mock server, used as the crawl domain
pub fn domain_of(server: &MockServer) -> String {
    url::Url::parse(&server.uri())
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string()
}

/// Creates a test configuration crawling the mock server from its root
pub fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::for_site(domain_of(server), vec![format!("{}/", server.uri())]);
    config.crawler.max_depth = 3;
    config.crawler.concurrency_limit = 4;
    config.crawler.politeness_delay_ms = 0;
    config.fetcher.timeout_secs = 5;
    config.fetcher.user_agent = "TestBot/1.0".to_string();
    config
}

/// An HTML response with the given body
pub fn html(body: impl Into<String>) -> ResponseTemplate {
    let body: String = body.into();
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html")
}

/// Mounts a GET handler for `route`
pub async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}
