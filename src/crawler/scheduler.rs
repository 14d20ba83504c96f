//! Batch scheduler: bounded fan-out of fetch-and-extract work
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore shared by every batch
//! - The optional politeness delay before each request
//! - Turning each fetch into either page metadata plus links, or a failure
//! - The fan-in barrier: a batch returns only after every unit finished
//!
//! Workers never touch crawl state. Each unit returns an owned outcome and
//! the engine folds them in after the barrier.

use crate::config::Config;
use crate::crawler::fetcher::{FailureReason, FetchResult, PageFetcher, PageMetadata};
use crate::crawler::frontier::FrontierEntry;
use crate::crawler::parser::parse_html;
use crate::url::UrlFilter;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Result of one unit of work
#[derive(Debug)]
enum UnitOutcome {
    Fetched {
        metadata: PageMetadata,
        links: BTreeSet<String>,
    },
    Failed(FailureReason),
}

/// Everything one batch produced
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Every link found in the batch, mapped to the shallowest depth of a
    /// page that linked to it
    pub links: BTreeMap<String, u32>,

    /// URLs fetched with a 2xx response
    pub fetched: Vec<(String, PageMetadata)>,

    /// URLs whose fetch failed
    pub failed: Vec<(String, FailureReason)>,
}

impl BatchOutcome {
    fn absorb(&mut self, entry: FrontierEntry, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Fetched { metadata, links } => {
                for link in links {
                    self.links
                        .entry(link)
                        .and_modify(|d| *d = (*d).min(entry.depth))
                        .or_insert(entry.depth);
                }
                self.fetched.push((entry.url, metadata));
            }
            UnitOutcome::Failed(reason) => {
                tracing::debug!("Failed {}: {}", entry.url, reason);
                self.failed.push((entry.url, reason));
            }
        }
    }
}

/// Runs batches of fetch-and-extract units under a concurrency bound
pub struct BatchScheduler<F: PageFetcher> {
    fetcher: Arc<F>,
    filter: Arc<UrlFilter>,
    semaphore: Arc<Semaphore>,
    politeness_delay: Duration,
    script_links: bool,
}

impl<F: PageFetcher> BatchScheduler<F> {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of page bodies
    /// * `filter` - Scope filter applied to every extracted link
    /// * `concurrency_limit` - Maximum number of units in flight
    /// * `politeness_delay` - Pause taken after acquiring a slot, before fetching
    pub fn new(
        fetcher: Arc<F>,
        filter: Arc<UrlFilter>,
        concurrency_limit: usize,
        politeness_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            filter,
            semaphore: Arc::new(Semaphore::new(concurrency_limit.max(1))),
            politeness_delay,
            script_links: false,
        }
    }

    /// Creates a scheduler using the crawler section of `config`
    pub fn from_config(fetcher: Arc<F>, filter: Arc<UrlFilter>, config: &Config) -> Self {
        Self::new(
            fetcher,
            filter,
            config.crawler.concurrency_limit,
            Duration::from_millis(config.crawler.politeness_delay_ms),
        )
        .with_script_links(config.crawler.extract_script_links)
    }

    /// Also mine inline scripts for page paths
    pub fn with_script_links(mut self, enabled: bool) -> Self {
        self.script_links = enabled;
        self
    }

    /// Shared fetcher
    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Runs one batch to completion
    ///
    /// Every entry is dispatched as its own task. A failing or panicking unit
    /// contributes a failure and no links; its siblings are unaffected.
    ///
    /// # Arguments
    ///
    /// * `entries` - Frontier entries to fetch; URLs are expected to be unique
    ///
    /// # Returns
    ///
    /// The merged outcome of every unit, available once all of them finished
    pub async fn run_batch(&self, entries: Vec<FrontierEntry>) -> BatchOutcome {
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<String, u32> = HashMap::with_capacity(entries.len());

        for entry in entries {
            pending.insert(entry.url.clone(), entry.depth);

            let fetcher = Arc::clone(&self.fetcher);
            let filter = Arc::clone(&self.filter);
            let semaphore = Arc::clone(&self.semaphore);
            let delay = self.politeness_delay;
            let script_links = self.script_links;

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let reason = FailureReason::Transport("scheduler closed".to_string());
                        return (entry, UnitOutcome::Failed(reason));
                    }
                };

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }

                let result = fetcher.fetch(&entry.url).await;
                let outcome = process_result(&entry.url, result, &filter, script_links);
                (entry, outcome)
            });
        }

        let mut batch = BatchOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((entry, outcome)) => {
                    pending.remove(&entry.url);
                    batch.absorb(entry, outcome);
                }
                Err(e) => tracing::warn!("Fetch task failed to complete: {}", e),
            }
        }

        // Units lost to a panic still end up in exactly one result set
        for (url, depth) in pending {
            let reason = FailureReason::Transport("worker task panicked".to_string());
            batch.absorb(FrontierEntry { url, depth }, UnitOutcome::Failed(reason));
        }

        batch
    }
}

/// Turns a fetch result into a unit outcome, extracting links on success
fn process_result(
    requested: &str,
    result: FetchResult,
    filter: &UrlFilter,
    script_links: bool,
) -> UnitOutcome {
    match result {
        FetchResult::Success {
            final_url,
            status_code,
            content_type,
            body,
        } => {
            let base = Url::parse(&final_url).or_else(|_| Url::parse(requested));
            let parsed = match base {
                Ok(base) => parse_html(&body, &base, filter, script_links),
                Err(_) => Default::default(),
            };
            UnitOutcome::Fetched {
                metadata: PageMetadata {
                    status_code,
                    content_type,
                    title: parsed.title,
                },
                links: parsed.links,
            }
        }
        FetchResult::HttpFailure { status_code } => {
            UnitOutcome::Failed(FailureReason::HttpStatus(status_code))
        }
        FetchResult::TransportFailure { reason } => {
            UnitOutcome::Failed(FailureReason::Transport(reason))
        }
    }
}
