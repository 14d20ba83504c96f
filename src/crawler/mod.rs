//! Crawler module for breadth-first URL discovery
//!
//! This module contains the core discovery logic, including:
//! - HTTP fetching with encoding fallback
//! - HTML parsing and link extraction
//! - The breadth-first frontier
//! - Batched, concurrency-bounded fetching
//! - Overall discovery orchestration

mod engine;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{DiscoveryEngine, DiscoveryResult, EngineLimits};
pub use fetcher::{
    build_http_client, decode_body, FailureReason, FetchResult, HttpFetcher, PageFetcher,
    PageMetadata,
};
pub(crate) use fetcher::build_client;
pub use frontier::{Batch, Frontier, FrontierEntry};
pub use parser::{extract_links, parse_html, ParsedPage};
pub use scheduler::{BatchOutcome, BatchScheduler};

use crate::config::Config;
use crate::DiscoveryError;

/// Runs one recursive discovery over HTTP using the configured seeds
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client
/// 2. Validate and enqueue the seeds
/// 3. Fetch and extract batch by batch until a stopping condition holds
///
/// # Arguments
///
/// * `config` - The discovery configuration
///
/// # Returns
///
/// * `Ok(DiscoveryResult)` - Discovery reached a terminal state
/// * `Err(DiscoveryError)` - Configuration or client setup failed
pub async fn discover(config: &Config) -> Result<DiscoveryResult, DiscoveryError> {
    DiscoveryEngine::from_config(config)?
        .run(&config.target.seeds)
        .await
}
