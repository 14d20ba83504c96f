use crate::crawler::{FailureReason, Frontier, FrontierEntry, PageMetadata};
use crate::state::EngineState;
use crate::DiscoveryError;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Mutable bookkeeping for a single discovery run
///
/// Owned by the engine loop and touched only between batches, never from
/// worker tasks. Every URL enters `discovered` exactly once; a URL is
/// dispatched at most once, so it ends up in at most one of `fetched` and
/// `failed`.
#[derive(Debug)]
pub struct CrawlState {
    state: EngineState,
    frontier: Frontier,
    discovered: HashSet<String>,
    fetched: BTreeSet<String>,
    failed: BTreeMap<String, FailureReason>,
    pages: BTreeMap<String, PageMetadata>,
    depth_histogram: BTreeMap<u32, usize>,
    consecutive_empty_batches: u32,
    skipped_by_depth: usize,
    blocked_by_robots: HashSet<String>,
    batches: usize,
}

impl CrawlState {
    /// Creates an idle state whose frontier holds depths up to `max_depth`
    pub fn new(max_depth: u32) -> Self {
        Self {
            state: EngineState::Idle,
            frontier: Frontier::new(max_depth),
            discovered: HashSet::new(),
            fetched: BTreeSet::new(),
            failed: BTreeMap::new(),
            pages: BTreeMap::new(),
            depth_histogram: BTreeMap::new(),
            consecutive_empty_batches: 0,
            skipped_by_depth: 0,
            blocked_by_robots: HashSet::new(),
            batches: 0,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Moves the run to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: EngineState) -> Result<(), DiscoveryError> {
        if !self.state.can_transition_to(next) {
            return Err(DiscoveryError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Engine state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Marks a URL discovered and enqueues it at `depth`
    ///
    /// Returns false when the URL was already known. A URL that is new but
    /// lies beyond the depth bound is still recorded as discovered and is
    /// counted as skipped by depth.
    pub fn discover(&mut self, url: String, depth: u32) -> bool {
        if !self.discovered.insert(url.clone()) {
            return false;
        }
        if self.frontier.accepts_depth(depth) {
            self.frontier.push(FrontierEntry { url, depth });
        } else {
            self.skipped_by_depth += 1;
        }
        true
    }

    /// Marks a URL discovered without enqueueing it
    pub fn discover_only(&mut self, url: String) -> bool {
        self.discovered.insert(url)
    }

    pub fn is_discovered(&self, url: &str) -> bool {
        self.discovered.contains(url)
    }

    pub fn discovered_len(&self) -> usize {
        self.discovered.len()
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn frontier_mut(&mut self) -> &mut Frontier {
        &mut self.frontier
    }

    /// Counts one entry handed to the scheduler at `depth`
    pub fn record_dispatched(&mut self, depth: u32) {
        *self.depth_histogram.entry(depth).or_insert(0) += 1;
    }

    pub fn record_fetched(&mut self, url: String, metadata: PageMetadata) {
        debug_assert!(!self.failed.contains_key(&url));
        self.pages.insert(url.clone(), metadata);
        self.fetched.insert(url);
    }

    pub fn record_failed(&mut self, url: String, reason: FailureReason) {
        debug_assert!(!self.fetched.contains(&url));
        self.failed.insert(url, reason);
    }

    pub fn add_skipped_by_depth(&mut self, count: usize) {
        self.skipped_by_depth += count;
    }

    /// Remembers a URL that robots.txt keeps out of the corpus
    ///
    /// Returns false when it was already recorded.
    pub fn record_blocked(&mut self, url: String) -> bool {
        self.blocked_by_robots.insert(url)
    }

    pub fn is_blocked(&self, url: &str) -> bool {
        self.blocked_by_robots.contains(url)
    }

    /// Records the yield of a finished batch and returns the current run of
    /// consecutive batches that found nothing new
    pub fn register_batch_yield(&mut self, new_urls: usize) -> u32 {
        self.batches += 1;
        if new_urls == 0 {
            self.consecutive_empty_batches += 1;
        } else {
            self.consecutive_empty_batches = 0;
        }
        self.consecutive_empty_batches
    }

    pub fn consecutive_empty_batches(&self) -> u32 {
        self.consecutive_empty_batches
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn fetched(&self) -> &BTreeSet<String> {
        &self.fetched
    }

    pub fn failed(&self) -> &BTreeMap<String, FailureReason> {
        &self.failed
    }

    pub fn depth_histogram(&self) -> &BTreeMap<u32, usize> {
        &self.depth_histogram
    }

    pub fn skipped_by_depth(&self) -> usize {
        self.skipped_by_depth
    }

    pub fn blocked_by_robots(&self) -> usize {
        self.blocked_by_robots.len()
    }

    /// Checks `discovered ⊇ fetched ∪ failed ∪ queued` and `fetched ∩ failed = ∅`
    pub fn invariants_hold(&self) -> bool {
        let covered = self.fetched.iter().all(|u| self.discovered.contains(u))
            && self.failed.keys().all(|u| self.discovered.contains(u))
            && self
                .frontier
                .iter()
                .all(|e| self.discovered.contains(&e.url));
        let disjoint = self.fetched.iter().all(|u| !self.failed.contains_key(u));
        covered && disjoint
    }

    /// Splits the state into its reportable parts
    pub(crate) fn into_parts(self) -> CrawlStateParts {
        CrawlStateParts {
            state: self.state,
            queued_remaining: self.frontier.len(),
            discovered: self.discovered.into_iter().collect(),
            fetched: self.fetched,
            failed: self.failed,
            pages: self.pages,
            depth_histogram: self.depth_histogram,
            skipped_by_depth: self.skipped_by_depth,
            blocked_by_robots: self.blocked_by_robots.len(),
            batches: self.batches,
        }
    }
}

/// Owned pieces of a finished [`CrawlState`]
pub(crate) struct CrawlStateParts {
    pub state: EngineState,
    pub queued_remaining: usize,
    pub discovered: BTreeSet<String>,
    pub fetched: BTreeSet<String>,
    pub failed: BTreeMap<String, FailureReason>,
    pub pages: BTreeMap<String, PageMetadata>,
    pub depth_histogram: BTreeMap<u32, usize>,
    pub skipped_by_depth: usize,
    pub blocked_by_robots: usize,
    pub batches: usize,
}
