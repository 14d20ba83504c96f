//! Robots.txt handling module
//!
//! robots.txt serves two purposes here:
//! - As a discovery strategy: its Allow/Disallow paths hint at site
//!   sections, which are turned into candidate URLs
//! - Optionally, as a crawl policy that keeps disallowed URLs out of the
//!   corpus

mod parser;

pub use parser::{RobotsFile, RobotsRule, RuleKind};

use crate::crawler::{FetchResult, PageFetcher};
use crate::url::{normalize_parsed, normalize_url, UrlFilter};
use crate::UrlResult;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use url::Url;

/// Disallowed paths containing these markers are never turned into candidates
const SENSITIVE_MARKERS: [&str; 3] = ["admin", "private", "login"];

/// Robots rules bound to the user agent the crawl identifies as
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    robots: RobotsFile,
    user_agent: String,
}

impl RobotsPolicy {
    pub fn new(robots: RobotsFile, user_agent: impl Into<String>) -> Self {
        Self {
            robots,
            user_agent: user_agent.into(),
        }
    }

    /// Checks whether `url` may be crawled
    pub fn allows(&self, url: &str) -> bool {
        self.robots.is_allowed(url, &self.user_agent)
    }
}

/// Output of the robots strategy
#[derive(Debug, Clone)]
pub struct RobotsDiscovery {
    /// Parsed file, or an allow-all stand-in when none was served
    pub robots: RobotsFile,

    /// Whether a robots.txt was actually served
    pub found: bool,

    /// In-scope candidate URLs mined from path rules
    pub urls: BTreeSet<String>,

    /// `Sitemap:` URLs, reported as-is
    pub sitemaps: Vec<String>,

    pub allow_rules: usize,
    pub disallow_rules: usize,
    pub elapsed: Duration,
}

/// Returns the root (`scheme://host/`) of the site a seed belongs to
///
/// # Examples
///
/// ```
/// use site_corpus::robots::site_root;
///
/// let root = site_root("https://example.org/news/index.html?page=2").unwrap();
/// assert_eq!(root.as_str(), "https://example.org/");
/// ```
pub fn site_root(seed: &str) -> UrlResult<Url> {
    let mut root = normalize_url(seed)?;
    root.set_path("/");
    root.set_query(None);
    Ok(root)
}

/// Fetches robots.txt for a site
///
/// # Arguments
///
/// * `fetcher` - Fetcher used for the request
/// * `root` - Site root, as returned by [`site_root`]
///
/// # Returns
///
/// * `Some(RobotsFile)` - The file was served
/// * `None` - The request failed or returned a non-2xx status
pub async fn fetch_robots<F: PageFetcher>(fetcher: &F, root: &Url) -> Option<RobotsFile> {
    let robots_url = root.join("/robots.txt").ok()?;

    match fetcher.fetch(robots_url.as_str()).await {
        FetchResult::Success { body, .. } => {
            tracing::info!("Fetched {} ({} bytes)", robots_url, body.len());
            Some(RobotsFile::parse(&body))
        }
        FetchResult::HttpFailure { status_code } => {
            tracing::warn!("No robots.txt at {}: HTTP {}", robots_url, status_code);
            None
        }
        FetchResult::TransportFailure { reason } => {
            tracing::warn!("Failed to fetch {}: {}", robots_url, reason);
            None
        }
    }
}

/// Turns robots path rules into candidate URLs
///
/// Wildcards (`*`) and end anchors (`$`) are stripped, and the root path is
/// skipped. Paths that look like admin, private or login areas are skipped
/// too, whether the rule allows or disallows them. Every candidate passes
/// through `filter`.
pub fn mine_robots_urls(robots: &RobotsFile, root: &Url, filter: &UrlFilter) -> BTreeSet<String> {
    let mut urls = BTreeSet::new();

    for rule in robots.rules() {
        let path = rule.path.replace(['*', '$'], "");
        if !path.starts_with('/') || path == "/" {
            continue;
        }

        let lowered = path.to_lowercase();
        if SENSITIVE_MARKERS.iter().any(|m| lowered.contains(m)) {
            continue;
        }

        let Ok(candidate) = root.join(&path) else {
            continue;
        };
        if !filter.include(&candidate) {
            tracing::trace!("Filtered robots candidate: {}", candidate);
            continue;
        }
        if let Ok(url) = normalize_parsed(candidate) {
            urls.insert(url.into());
        }
    }

    urls
}

/// Runs the robots strategy against one site
pub async fn discover_from_robots<F: PageFetcher>(
    fetcher: &F,
    root: &Url,
    filter: &UrlFilter,
) -> RobotsDiscovery {
    let started = Instant::now();

    let (robots, found) = match fetch_robots(fetcher, root).await {
        Some(robots) => (robots, true),
        None => (RobotsFile::empty(), false),
    };

    let rules = robots.rules();
    let allow_rules = rules.iter().filter(|r| r.kind == RuleKind::Allow).count();
    let urls = mine_robots_urls(&robots, root, filter);
    let sitemaps = robots.sitemaps();

    tracing::info!(
        "robots.txt: {} allow, {} disallow, {} candidate URLs, {} sitemap(s)",
        allow_rules,
        rules.len() - allow_rules,
        urls.len(),
        sitemaps.len()
    );

    RobotsDiscovery {
        robots,
        found,
        urls,
        sitemaps,
        allow_rules,
        disallow_rules: rules.len() - allow_rules,
        elapsed: started.elapsed(),
    }
}
