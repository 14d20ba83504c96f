//! Discovery engine - breadth-first crawl orchestration
//!
//! This module contains the main discovery loop, which:
//! - Validates and enqueues the seeds at depth 0
//! - Drains the frontier one batch at a time
//! - Hands each batch to the scheduler and waits for the barrier
//! - Folds the batch outcome into the crawl state
//! - Decides when to stop
//!
//! All crawl state lives in one `CrawlState` owned by `run`; nothing is
//! shared with worker tasks.

use crate::config::Config;
use crate::crawler::fetcher::{FailureReason, HttpFetcher, PageFetcher, PageMetadata};
use crate::crawler::scheduler::BatchScheduler;
use crate::robots::RobotsPolicy;
use crate::state::{CrawlState, EngineState};
use crate::url::{normalize_url, UrlFilter};
use crate::{ConfigError, ConfigResult, DiscoveryError};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Consecutive zero-yield batches after which the crawl gives up
const MAX_CONSECUTIVE_EMPTY_BATCHES: u32 = 3;

/// Traversal bounds for one run
#[derive(Debug, Clone, Copy)]
pub struct EngineLimits {
    pub max_depth: u32,
    pub max_pages: usize,
    pub batch_size: usize,
}

impl EngineLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.crawler.max_depth,
            max_pages: config.crawler.max_pages,
            batch_size: config.crawler.batch_size.max(1),
        }
    }
}

/// Final output of a discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    /// Terminal state the run ended in
    pub status: EngineState,

    /// Every URL found, fetched or not
    pub discovered: BTreeSet<String>,

    /// URLs fetched with a 2xx response
    pub fetched: BTreeSet<String>,

    /// URLs that failed, with the reason
    pub failed: BTreeMap<String, FailureReason>,

    /// Metadata of every fetched page
    pub pages: BTreeMap<String, PageMetadata>,

    /// Dispatched entries per depth
    pub depth_histogram: BTreeMap<u32, usize>,

    /// URLs not fetched because they lay beyond the depth bound
    pub skipped_by_depth: usize,

    /// Distinct URLs kept out by robots.txt
    pub blocked_by_robots: usize,

    /// Entries still waiting when the run stopped
    pub queued_remaining: usize,

    /// Number of batches dispatched
    pub batches: usize,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl DiscoveryResult {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Deepest depth that was dispatched
    pub fn max_depth_reached(&self) -> Option<u32> {
        self.depth_histogram.keys().next_back().copied()
    }
}

/// Breadth-first discovery engine
///
/// One engine can serve several runs; every call to [`run`](Self::run) gets
/// a fresh crawl state.
pub struct DiscoveryEngine<F: PageFetcher> {
    limits: EngineLimits,
    filter: Arc<UrlFilter>,
    scheduler: BatchScheduler<F>,
    robots: Option<RobotsPolicy>,
}

impl DiscoveryEngine<HttpFetcher> {
    /// Creates an engine that fetches over HTTP
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::HttpClient` if the connection pool cannot be
    /// built.
    pub fn from_config(config: &Config) -> Result<Self, DiscoveryError> {
        let fetcher = HttpFetcher::new(&config.fetcher)?;
        Ok(Self::new(Arc::new(fetcher), config))
    }
}

impl<F: PageFetcher> DiscoveryEngine<F> {
    /// Creates an engine around an arbitrary fetcher
    pub fn new(fetcher: Arc<F>, config: &Config) -> Self {
        let filter = Arc::new(UrlFilter::from_config(config));
        let scheduler = BatchScheduler::from_config(fetcher, Arc::clone(&filter), config);

        Self {
            limits: EngineLimits::from_config(config),
            filter,
            scheduler,
            robots: None,
        }
    }

    /// Drops every URL the given robots policy disallows
    pub fn with_robots(mut self, robots: RobotsPolicy) -> Self {
        self.robots = Some(robots);
        self
    }

    pub fn limits(&self) -> EngineLimits {
        self.limits
    }

    pub fn filter(&self) -> &UrlFilter {
        &self.filter
    }

    /// Runs a discovery from `seeds` until a terminal state
    ///
    /// Per-URL failures never abort the run; they end up in
    /// [`DiscoveryResult::failed`].
    ///
    /// # Arguments
    ///
    /// * `seeds` - Start URLs, enqueued at depth 0
    ///
    /// # Errors
    ///
    /// Returns a configuration error, before anything is fetched, when the
    /// seed list is empty or a seed is malformed or out of scope.
    pub async fn run(&self, seeds: &[String]) -> Result<DiscoveryResult, DiscoveryError> {
        let seeds = self.prepare_seeds(seeds)?;
        let started = Instant::now();
        let limits = self.limits;

        let mut state = CrawlState::new(limits.max_depth);
        for seed in seeds {
            if self.blocked(&seed) {
                tracing::warn!("Seed {} is disallowed by robots.txt", seed);
                state.record_blocked(seed);
                continue;
            }
            state.discover(seed, 0);
        }

        state.transition(EngineState::Running)?;
        tracing::info!(
            "Starting discovery: {} seed(s), max depth {}, max pages {}, batch size {}",
            state.frontier().len(),
            limits.max_depth,
            limits.max_pages,
            limits.batch_size
        );

        while !state.frontier().is_empty() && state.discovered_len() < limits.max_pages {
            let batch = state.frontier_mut().next_batch(limits.batch_size);
            state.add_skipped_by_depth(batch.skipped_by_depth);
            if batch.is_empty() {
                continue;
            }

            let batch_depth = batch.min_depth().unwrap_or(0);
            let batch_len = batch.len();
            for entry in &batch.entries {
                state.record_dispatched(entry.depth);
            }

            let outcome = self.scheduler.run_batch(batch.entries).await;
            let failed_in_batch = outcome.failed.len();
            for (url, metadata) in outcome.fetched {
                state.record_fetched(url, metadata);
            }
            for (url, reason) in outcome.failed {
                state.record_failed(url, reason);
            }

            // Shallower links first, so the frontier stays ordered by depth
            // when a batch spans two levels. The sort is stable, so URL order
            // holds within a depth.
            let mut links: Vec<(String, u32)> = outcome.links.into_iter().collect();
            links.sort_by_key(|(_, parent_depth)| *parent_depth);

            let mut new_urls = 0usize;
            for (url, parent_depth) in links {
                if state.is_discovered(&url) || state.is_blocked(&url) {
                    continue;
                }
                if self.blocked(&url) {
                    tracing::debug!("Disallowed by robots.txt: {}", url);
                    state.record_blocked(url);
                    continue;
                }

                if state.discovered_len() < limits.max_pages {
                    state.discover(url, parent_depth + 1);
                } else {
                    state.discover_only(url);
                }
                new_urls += 1;
            }

            let empty_run = state.register_batch_yield(new_urls);
            tracing::info!(
                "Batch {} (depth {}): {} fetched, {} failed, {} new, {} discovered, {} queued",
                state.batches(),
                batch_depth,
                batch_len - failed_in_batch,
                failed_in_batch,
                new_urls,
                state.discovered_len(),
                state.frontier().len()
            );

            if let Some(terminal) = stop_condition(&state, new_urls, empty_run, limits) {
                state.transition(terminal)?;
                break;
            }
        }

        if state.state() == EngineState::Running {
            let terminal = if state.discovered_len() >= limits.max_pages {
                EngineState::LimitReached
            } else {
                EngineState::Exhausted
            };
            state.transition(terminal)?;
        }

        debug_assert!(state.invariants_hold());

        let parts = state.into_parts();
        let result = DiscoveryResult {
            status: parts.state,
            discovered: parts.discovered,
            fetched: parts.fetched,
            failed: parts.failed,
            pages: parts.pages,
            depth_histogram: parts.depth_histogram,
            skipped_by_depth: parts.skipped_by_depth,
            blocked_by_robots: parts.blocked_by_robots,
            queued_remaining: parts.queued_remaining,
            batches: parts.batches,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Discovery {}: {} discovered, {} fetched, {} failed, {} skipped by depth in {:.1}s",
            result.status,
            result.discovered.len(),
            result.fetched.len(),
            result.failed.len(),
            result.skipped_by_depth,
            result.elapsed_secs()
        );

        Ok(result)
    }

    /// Normalizes the seeds and checks them against the filter
    fn prepare_seeds(&self, seeds: &[String]) -> ConfigResult<Vec<String>> {
        if seeds.is_empty() {
            return Err(ConfigError::Validation(
                "At least one seed URL is required".to_string(),
            ));
        }

        let mut prepared = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let url = normalize_url(seed)
                .map_err(|e| ConfigError::InvalidUrl(format!("Seed '{}': {}", seed, e)))?;
            if !self.filter.include(&url) {
                return Err(ConfigError::InvalidUrl(format!(
                    "Seed '{}' is outside the crawl scope of '{}'",
                    seed,
                    self.filter.domain()
                )));
            }
            let url = String::from(url);
            if !prepared.contains(&url) {
                prepared.push(url);
            }
        }

        Ok(prepared)
    }

    fn blocked(&self, url: &str) -> bool {
        self.robots
            .as_ref()
            .map_or(false, |robots| !robots.allows(url))
    }
}

/// Stopping conditions, in precedence order
fn stop_condition(
    state: &CrawlState,
    new_urls: usize,
    consecutive_empty: u32,
    limits: EngineLimits,
) -> Option<EngineState> {
    if state.frontier().is_empty() {
        return Some(EngineState::Exhausted);
    }
    if state.discovered_len() >= limits.max_pages {
        return Some(EngineState::LimitReached);
    }
    if new_urls == 0 && state.frontier().len() < limits.batch_size {
        tracing::info!("Low discovery rate with a short queue, stopping");
        return Some(EngineState::Completed);
    }
    if consecutive_empty >= MAX_CONSECUTIVE_EMPTY_BATCHES {
        tracing::info!(
            "{} consecutive batches found nothing new, stopping",
            consecutive_empty
        );
        return Some(EngineState::Completed);
    }
    None
}
