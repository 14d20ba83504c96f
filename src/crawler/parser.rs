//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (anchor `href` and form `action` values)
//! - Page title
//! - Optionally, `.html`/`.htm` paths quoted inside inline scripts
//!
//! Parsing is lenient: malformed markup yields whatever elements the
//! parser recovered, never an error.

use crate::url::{normalize_parsed, UrlFilter};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use url::Url;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href], form[action]").expect("hardcoded selector is valid"));

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("hardcoded selector is valid"));

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("hardcoded selector is valid"));

static SCRIPT_PAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']([^"'\s<>]+?\.html?(?:\?[^"'\s<>]*)?)["']"#)
        .expect("hardcoded regex pattern is valid")
});

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// In-scope, normalized absolute URLs found on the page
    pub links: BTreeSet<String>,
}

/// Parses HTML content and extracts in-scope links and metadata
///
/// # Link Extraction Rules
///
/// **Collected:**
/// - `<a href="...">`
/// - `<form action="...">`
/// - quoted `*.html` / `*.htm` paths in `<script>` bodies, when
///   `script_links` is set
///
/// **Discarded:**
/// - Empty values and fragment-only values (`#top`)
/// - Values that do not resolve against `base_url`
/// - Anything the filter rejects (off-domain, skipped extension or pattern)
///
/// Surviving links are normalized, so `/a.html#x` and `/a.html` collapse to
/// one entry.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL the page was served from, for resolving relative links
/// * `filter` - Scope filter applied to every candidate
/// * `script_links` - Whether to mine inline scripts for page paths
///
/// # Returns
///
/// The page title and the deduplicated link set
///
/// # Example
///
/// ```
/// use site_corpus::config::FilterConfig;
/// use site_corpus::crawler::parse_html;
/// use site_corpus::url::UrlFilter;
/// use url::Url;
///
/// let filter = UrlFilter::new("example.com", &FilterConfig::default());
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url, &filter, false);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert!(parsed.links.contains("https://example.com/page"));
/// ```
pub fn parse_html(html: &str, base_url: &Url, filter: &UrlFilter, script_links: bool) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);

    let mut links = BTreeSet::new();
    for element in document.select(&LINK_SELECTOR) {
        let value = element
            .value()
            .attr("href")
            .or_else(|| element.value().attr("action"));
        if let Some(link) = value.and_then(|v| resolve_link(v, base_url, filter)) {
            links.insert(link);
        }
    }

    if script_links {
        for script in document.select(&SCRIPT_SELECTOR) {
            let body: String = script.text().collect();
            for capture in SCRIPT_PAGE_REGEX.captures_iter(&body) {
                if let Some(link) = resolve_link(&capture[1], base_url, filter) {
                    links.insert(link);
                }
            }
        }
    }

    ParsedPage { title, links }
}

/// Extracts just the link set of a page
pub fn extract_links(html: &str, base_url: &Url, filter: &UrlFilter) -> BTreeSet<String> {
    parse_html(html, base_url, filter, false).links
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolves an attribute value to a normalized in-scope URL
fn resolve_link(raw: &str, base_url: &Url, filter: &UrlFilter) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let absolute = base_url.join(raw).ok()?;
    if !filter.include(&absolute) {
        tracing::trace!("Filtered link: {}", absolute);
        return None;
    }

    normalize_parsed(absolute).ok().map(String::from)
}
