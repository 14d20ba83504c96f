//! Integration tests for the discovery pipeline
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! fetch, extract and merge cycle end-to-end.

use crate::common::{create_test_config, html, mount_get};
use site_corpus::crawler::{discover, DiscoveryEngine, FailureReason, HttpFetcher};
use site_corpus::robots::{discover_from_robots, fetch_robots, site_root, RobotsPolicy};
use site_corpus::sitemap::discover_from_sitemaps;
use site_corpus::state::EngineState;
use site_corpus::storage::UrlStore;
use site_corpus::url::UrlFilter;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_engine(config: &site_corpus::Config) -> DiscoveryEngine<HttpFetcher> {
    DiscoveryEngine::from_config(config).expect("Failed to create engine")
}

#[tokio::test]
async fn test_discovers_same_domain_links_only() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(
        &mock_server,
        "/",
        html(
            r#"<html><head><title>Home</title></head><body>
            <a href="/a.html">A</a>
            <a href="/b.html">B</a>
            <a href="https://other.org/x.html">Elsewhere</a>
            </body></html>"#,
        ),
    )
    .await;

    let config = create_test_config(&mock_server);
    let result = discover(&config).await.expect("Discovery failed");

    let expected: BTreeSet<String> = [
        format!("{}/", base_url),
        format!("{}/a.html", base_url),
        format!("{}/b.html", base_url),
    ]
    .into();
    assert_eq!(result.discovered, expected);
    assert!(result.discovered.iter().all(|u| !u.contains("other.org")));
    assert_eq!(
        result.pages[&format!("{}/", base_url)].title.as_deref(),
        Some("Home")
    );

    // Unmounted pages answer 404
    assert_eq!(
        result.failed.get(&format!("{}/a.html", base_url)),
        Some(&FailureReason::HttpStatus(404))
    );
    assert_eq!(result.status, EngineState::Exhausted);
}

#[tokio::test]
async fn test_timeout_is_recorded_and_crawl_continues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(
        &mock_server,
        "/",
        html(r#"<a href="/c.html">slow</a><a href="/d.html">fast</a>"#),
    )
    .await;
    mount_get(
        &mock_server,
        "/c.html",
        html("<p>too late</p>").set_delay(Duration::from_secs(3)),
    )
    .await;
    mount_get(&mock_server, "/d.html", html("<p>done</p>")).await;

    let mut config = create_test_config(&mock_server);
    config.fetcher.timeout_secs = 1;

    let result = create_engine(&config)
        .run(&config.target.seeds)
        .await
        .expect("Discovery failed");

    let slow = format!("{}/c.html", base_url);
    assert!(matches!(
        result.failed.get(&slow),
        Some(FailureReason::Transport(_))
    ));
    assert!(result.discovered.contains(&slow));
    assert!(result.fetched.contains(&format!("{}/d.html", base_url)));
    assert!(result.status.is_terminal());
}

#[tokio::test]
async fn test_three_empty_batches_complete_with_partial_corpus() {
    let mock_server = MockServer::start().await;

    let links: String = (1..=6)
        .map(|i| format!(r#"<a href="/leaf{}.html">{}</a>"#, i, i))
        .collect();
    mount_get(&mock_server, "/", html(links)).await;
    for i in 1..=6 {
        mount_get(&mock_server, &format!("/leaf{}.html", i), html("<p>leaf</p>")).await;
    }

    let mut config = create_test_config(&mock_server);
    config.crawler.batch_size = 1;

    let result = create_engine(&config)
        .run(&config.target.seeds)
        .await
        .expect("Discovery failed");

    assert_eq!(result.status, EngineState::Completed);
    assert_eq!(result.batches, 4);
    assert_eq!(result.fetched.len(), 4);
    assert_eq!(result.queued_remaining, 3);
    assert_eq!(result.discovered.len(), 7);
}

#[tokio::test]
async fn test_undecodable_page_is_fetched_with_no_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(&mock_server, "/", html(r#"<a href="/garbled.html">?</a>"#)).await;
    mount_get(
        &mock_server,
        "/garbled.html",
        ResponseTemplate::new(200).set_body_raw(vec![0xFF, 0xFE, 0xA0, 0xFD, 0xFF], "text/html"),
    )
    .await;

    let config = create_test_config(&mock_server);
    let result = create_engine(&config)
        .run(&config.target.seeds)
        .await
        .expect("Discovery failed");

    let garbled = format!("{}/garbled.html", base_url);
    assert!(result.fetched.contains(&garbled));
    assert!(result.failed.is_empty());
    assert_eq!(result.discovered.len(), 2);
    assert_eq!(result.status, EngineState::Exhausted);
}

#[tokio::test]
async fn test_depth_bound_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(&mock_server, "/", html(r#"<a href="/1.html">1</a>"#)).await;
    mount_get(&mock_server, "/1.html", html(r#"<a href="/2.html">2</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/2.html"))
        .respond_with(html("<p>deep</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server);
    config.crawler.max_depth = 1;

    let result = create_engine(&config)
        .run(&config.target.seeds)
        .await
        .expect("Discovery failed");

    assert!(result.discovered.contains(&format!("{}/2.html", base_url)));
    assert!(!result.fetched.contains(&format!("{}/2.html", base_url)));
    assert_eq!(result.max_depth_reached(), Some(1));
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(
        &mock_server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"),
    )
    .await;
    mount_get(
        &mock_server,
        "/",
        html(r#"<a href="/allowed">Allowed</a><a href="/admin">Admin</a>"#),
    )
    .await;
    mount_get(&mock_server, "/allowed", html("<p>Allowed content</p>")).await;
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(html("<p>secret</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let fetcher = Arc::new(HttpFetcher::new(&config.fetcher).expect("Failed to build client"));
    let root = site_root(&config.target.seeds[0]).expect("Invalid seed");
    let robots = fetch_robots(fetcher.as_ref(), &root)
        .await
        .expect("robots.txt should be served");

    let engine = DiscoveryEngine::new(Arc::clone(&fetcher), &config)
        .with_robots(RobotsPolicy::new(robots, &config.fetcher.user_agent));
    let result = engine
        .run(&config.target.seeds)
        .await
        .expect("Discovery failed");

    assert!(result.fetched.contains(&format!("{}/allowed", base_url)));
    assert!(!result.discovered.contains(&format!("{}/admin", base_url)));
    assert_eq!(result.blocked_by_robots, 1);
}

#[tokio::test]
async fn test_strategies_merge_into_store() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(
        &mock_server,
        "/robots.txt",
        ResponseTemplate::new(200)
            .set_body_string("User-agent: *\nAllow: /kosodate/\nDisallow: /cgi-bin/\n"),
    )
    .await;
    mount_get(
        &mock_server,
        "/",
        html(r#"<a href="/kosodate/">Kids</a><a href="/news.html">News</a>"#),
    )
    .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let store_path = dir.path().join("all_urls.json");
    let mut config = create_test_config(&mock_server);
    config.output.store_path = store_path.to_string_lossy().into_owned();

    let fetcher = Arc::new(HttpFetcher::new(&config.fetcher).expect("Failed to build client"));
    let filter = UrlFilter::from_config(&config);
    let root = site_root(&config.target.seeds[0]).expect("Invalid seed");

    let mut store =
        UrlStore::open_path(&store_path, &config.target.domain).expect("Failed to open store");

    let robots = discover_from_robots(fetcher.as_ref(), &root, &filter).await;
    let mined = store
        .merge("robots", robots.urls.iter().cloned(), robots.elapsed.as_secs_f64())
        .expect("Failed to merge robots");
    assert_eq!(mined.total_found, 2);
    assert_eq!(mined.new_unique(), 2);

    let result = DiscoveryEngine::new(Arc::clone(&fetcher), &config)
        .run(&config.target.seeds)
        .await
        .expect("Discovery failed");
    let crawled = store
        .merge(
            "recursive-crawl",
            result.discovered.iter().cloned(),
            result.elapsed_secs(),
        )
        .expect("Failed to merge crawl");

    // /kosodate/ was already mined from robots.txt
    assert_eq!(crawled.total_found, 3);
    assert_eq!(
        crawled.new_urls,
        [format!("{}/", base_url), format!("{}/news.html", base_url)].into()
    );
    assert_eq!(store.total_unique(), 4);

    let raw = std::fs::read_to_string(&store_path).expect("Store file should exist");
    let document: serde_json::Value = serde_json::from_str(&raw).expect("Store is valid JSON");
    assert_eq!(document["schema_version"], "2.0");
    assert_eq!(document["total_unique_urls"], 4);
    assert_eq!(document["phases"]["robots"]["raw_count"], 2);
    assert_eq!(document["phases"]["recursive-crawl"]["raw_count"], 3);

    let reopened =
        UrlStore::open_path(&store_path, &config.target.domain).expect("Failed to reopen store");
    assert_eq!(reopened.all_unique(), store.all_unique());
}

#[tokio::test]
async fn test_advertised_sitemap_index_merges_into_store() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(
        &mock_server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nDisallow: /cgi-bin/\nSitemap: {}/sitemap_index.xml\n",
            base_url
        )),
    )
    .await;
    mount_get(
        &mock_server,
        "/sitemap_index.xml",
        ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{}/sitemap-pages.xml</loc></sitemap>
</sitemapindex>"#,
                base_url
            ),
            "application/xml",
        ),
    )
    .await;
    mount_get(
        &mock_server,
        "/sitemap-pages.xml",
        ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{0}/kurashi/</loc></url>
  <url><loc>{0}/kosodate/hoiku.html</loc></url>
  <url><loc>{0}/files/guide.pdf</loc></url>
</urlset>"#,
                base_url
            ),
            "application/xml",
        ),
    )
    .await;
    // Only used when robots.txt advertises nothing
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let store_path = dir.path().join("all_urls.json");
    let config = create_test_config(&mock_server);

    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build client");
    let filter = UrlFilter::from_config(&config);
    let root = site_root(&config.target.seeds[0]).expect("Invalid seed");

    let robots = discover_from_robots(&fetcher, &root, &filter).await;
    assert_eq!(robots.sitemaps, vec![format!("{}/sitemap_index.xml", base_url)]);

    let found = discover_from_sitemaps(
        &fetcher,
        &root,
        &robots.sitemaps,
        &filter,
        config.sitemap.max_sitemaps,
    )
    .await;
    assert_eq!(found.fetched.len(), 2);
    assert!(found.failed.is_empty());

    let mut store =
        UrlStore::open_path(&store_path, &config.target.domain).expect("Failed to open store");
    let merged = store
        .merge("sitemap", found.urls.iter().cloned(), found.elapsed.as_secs_f64())
        .expect("Failed to merge sitemap");

    assert_eq!(
        merged.new_urls,
        [
            format!("{}/kosodate/hoiku.html", base_url),
            format!("{}/kurashi/", base_url),
        ]
        .into()
    );

    let raw = std::fs::read_to_string(&store_path).expect("Store file should exist");
    let document: serde_json::Value = serde_json::from_str(&raw).expect("Store is valid JSON");
    assert_eq!(document["phases"]["sitemap"]["raw_count"], 2);
}
