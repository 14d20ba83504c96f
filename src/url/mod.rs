//! URL handling module for Site-Corpus
//!
//! This module provides URL normalization, domain scope matching, and the
//! scope filter every candidate URL passes through before it can enter the
//! corpus.

mod domain;
mod normalize;

use crate::config::{Config, FilterConfig};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, host_in_scope};
pub use normalize::{normalize_parsed, normalize_url};

/// Decides whether a candidate URL is in scope for a crawl
///
/// The filter is an immutable value built once per run from configuration.
/// It holds no interior state, so workers share it behind an `Arc` and call
/// it concurrently without synchronization.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    domain: String,
    skip_extensions: Vec<String>,
    skip_patterns: Vec<String>,
    max_url_length: usize,
}

impl UrlFilter {
    /// Creates a filter for `domain` using the given rules
    pub fn new(domain: &str, rules: &FilterConfig) -> Self {
        Self {
            domain: domain.to_lowercase(),
            skip_extensions: rules
                .skip_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            skip_patterns: rules
                .skip_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            max_url_length: rules.max_url_length,
        }
    }

    /// Creates the filter described by a full configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.target.domain, &config.filter)
    }

    /// The domain this filter keeps the crawl inside
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Checks a raw URL string
    ///
    /// Unparseable input is rejected rather than reported.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_corpus::config::FilterConfig;
    /// use site_corpus::url::UrlFilter;
    ///
    /// let filter = UrlFilter::new("example.org", &FilterConfig::default());
    /// assert!(filter.include_url("https://example.org/a.html"));
    /// assert!(!filter.include_url("https://other.org/a.html"));
    /// assert!(!filter.include_url("https://example.org/style.css"));
    /// ```
    pub fn include_url(&self, candidate: &str) -> bool {
        if candidate.len() > self.max_url_length || self.has_skip_pattern(candidate) {
            return false;
        }

        match Url::parse(candidate) {
            Ok(url) => self.include(&url),
            Err(_) => false,
        }
    }

    /// Checks an already-parsed URL
    ///
    /// Rules, in order:
    /// 1. Scheme must be http or https
    /// 2. Host must be the domain or one of its subdomains
    /// 3. Whole URL must not exceed the maximum length
    /// 4. Path must not end with a skipped extension
    /// 5. URL must not contain a skip pattern
    pub fn include(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        match extract_domain(url) {
            Some(host) if host_in_scope(&host, &self.domain) => {}
            _ => return false,
        }

        let full = url.as_str();
        if full.len() > self.max_url_length {
            return false;
        }

        let path = url.path().to_lowercase();
        if self.skip_extensions.iter().any(|ext| path.ends_with(ext)) {
            return false;
        }

        !self.has_skip_pattern(full)
    }

    fn has_skip_pattern(&self, candidate: &str) -> bool {
        let lowered = candidate.to_lowercase();
        self.skip_patterns.iter().any(|p| lowered.contains(p))
    }
}
