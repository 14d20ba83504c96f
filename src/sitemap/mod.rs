//! Sitemap discovery strategy
//!
//! Reads the sitemaps a site advertises in robots.txt, or the conventional
//! `/sitemap.xml` and `/sitemap.html` when it advertises none. Index files
//! are followed breadth-first up to a fixed number of fetches. Page entries
//! from XML sitemaps and links from HTML sitemap pages pass through the
//! same [`UrlFilter`] as crawled links.

mod parser;

pub use parser::{parse_sitemap, SitemapBody};

use crate::crawler::{extract_links, FetchResult, PageFetcher};
use crate::url::{host_in_scope, normalize_parsed, normalize_url, UrlFilter};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::time::{Duration, Instant};
use url::Url;

/// Sitemaps tried when robots.txt advertises none
const CONVENTIONAL_SITEMAPS: [&str; 2] = ["/sitemap.xml", "/sitemap.html"];

/// Outcome of the sitemap strategy for one site
#[derive(Debug, Clone, Default)]
pub struct SitemapDiscovery {
    /// Filtered, normalized page URLs
    pub urls: BTreeSet<String>,
    /// Sitemaps that were served, in fetch order
    pub fetched: Vec<String>,
    /// Sitemaps that failed or were missing
    pub failed: Vec<String>,
    /// Sitemaps left unread once the fetch cap was hit
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Lists the sitemaps to start from
///
/// Advertised sitemaps outside the site's domain are dropped. Duplicates
/// keep their first position.
pub fn sitemap_sources(root: &Url, advertised: &[String], filter: &UrlFilter) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut sources: Vec<String> = advertised
        .iter()
        .filter_map(|candidate| sitemap_location(candidate, filter))
        .filter(|url| seen.insert(url.clone()))
        .collect();

    if sources.is_empty() {
        sources = CONVENTIONAL_SITEMAPS
            .iter()
            .filter_map(|path| root.join(path).ok())
            .map(String::from)
            .collect();
    }

    sources
}

/// Runs the sitemap strategy against one site
///
/// # Arguments
///
/// * `fetcher` - Fetcher used for every sitemap request
/// * `root` - Site root, as returned by [`crate::robots::site_root`]
/// * `advertised` - `Sitemap:` URLs from robots.txt, possibly empty
/// * `filter` - Scope rules applied to every page entry
/// * `max_sitemaps` - Upper bound on sitemap fetches, index children included
pub async fn discover_from_sitemaps<F: PageFetcher>(
    fetcher: &F,
    root: &Url,
    advertised: &[String],
    filter: &UrlFilter,
    max_sitemaps: usize,
) -> SitemapDiscovery {
    let started = Instant::now();
    let mut result = SitemapDiscovery::default();

    let mut queue: VecDeque<String> = sitemap_sources(root, advertised, filter).into();
    let mut seen: HashSet<String> = queue.iter().cloned().collect();

    while let Some(sitemap_url) = queue.pop_front() {
        if result.fetched.len() + result.failed.len() >= max_sitemaps {
            result.skipped = queue.len() + 1;
            tracing::warn!(
                "Sitemap fetch cap of {} reached, {} sitemap(s) left unread",
                max_sitemaps,
                result.skipped
            );
            break;
        }

        let (final_url, body) = match fetcher.fetch(&sitemap_url).await {
            FetchResult::Success {
                final_url, body, ..
            } => (final_url, body),
            FetchResult::HttpFailure { status_code } => {
                tracing::debug!("No sitemap at {}: HTTP {}", sitemap_url, status_code);
                result.failed.push(sitemap_url);
                continue;
            }
            FetchResult::TransportFailure { reason } => {
                tracing::warn!("Failed to fetch sitemap {}: {}", sitemap_url, reason);
                result.failed.push(sitemap_url);
                continue;
            }
        };

        let Ok(base) = Url::parse(&final_url).or_else(|_| Url::parse(&sitemap_url)) else {
            result.failed.push(sitemap_url);
            continue;
        };

        match parse_sitemap(&body) {
            SitemapBody::Index(children) => {
                tracing::debug!("Sitemap index {} lists {} sitemap(s)", sitemap_url, children.len());
                for child in children {
                    let Some(child) = base
                        .join(&child)
                        .ok()
                        .and_then(|url| sitemap_location(url.as_str(), filter))
                    else {
                        continue;
                    };
                    if seen.insert(child.clone()) {
                        queue.push_back(child);
                    }
                }
            }
            SitemapBody::UrlSet(locs) => {
                let before = result.urls.len();
                for loc in locs {
                    let Ok(candidate) = base.join(&loc) else {
                        continue;
                    };
                    if !filter.include(&candidate) {
                        tracing::trace!("Filtered sitemap entry: {}", candidate);
                        continue;
                    }
                    if let Ok(url) = normalize_parsed(candidate) {
                        result.urls.insert(url.into());
                    }
                }
                tracing::debug!(
                    "Sitemap {} added {} URL(s)",
                    sitemap_url,
                    result.urls.len() - before
                );
            }
            SitemapBody::Html => {
                let mut links = extract_links(&body, &base, filter);
                // Drop the self-link
                links.remove(&sitemap_url);
                if let Ok(own) = normalize_parsed(base.clone()) {
                    links.remove(own.as_str());
                }
                tracing::debug!("HTML sitemap {} links {} page(s)", sitemap_url, links.len());
                result.urls.extend(links);
            }
        }

        result.fetched.push(sitemap_url);
    }

    result.elapsed = started.elapsed();
    tracing::info!(
        "Sitemaps: {} read, {} missing or failed, {} candidate URLs",
        result.fetched.len(),
        result.failed.len(),
        result.urls.len()
    );

    result
}

/// Normalizes a sitemap URL, rejecting it when it leaves the site's domain
fn sitemap_location(candidate: &str, filter: &UrlFilter) -> Option<String> {
    let url = normalize_url(candidate).ok()?;
    let host = url.host_str()?;
    host_in_scope(host, filter.domain()).then(|| url.into())
}
