//! Breadth-first frontier of URLs waiting to be fetched
//!
//! Entries are always appended and drained from the front, so all entries of
//! one depth stay contiguous and are dispatched before any entry of the next
//! depth.

use std::collections::VecDeque;

/// A URL waiting in the frontier together with its link depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized absolute URL
    pub url: String,

    /// Number of link hops from the nearest seed
    pub depth: u32,
}

/// Entries drained for one scheduling round
#[derive(Debug, Default)]
pub struct Batch {
    /// Entries within the depth bound, in FIFO order
    pub entries: Vec<FrontierEntry>,

    /// Entries dropped because their depth exceeded the bound
    pub skipped_by_depth: usize,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Shallowest depth in the batch
    pub fn min_depth(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.depth).min()
    }
}

/// FIFO queue of [`FrontierEntry`] with a maximum depth
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    max_depth: u32,
}

impl Frontier {
    pub fn new(max_depth: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            max_depth,
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Whether an entry at `depth` may still be fetched
    pub fn accepts_depth(&self, depth: u32) -> bool {
        depth <= self.max_depth
    }

    /// Appends an entry
    pub fn push(&mut self, entry: FrontierEntry) {
        self.queue.push_back(entry);
    }

    /// Removes up to `batch_size` entries from the front
    ///
    /// Entries beyond the depth bound are dropped and counted instead of
    /// returned; they still consume a slot of the batch.
    pub fn next_batch(&mut self, batch_size: usize) -> Batch {
        let take = batch_size.min(self.queue.len());
        let mut batch = Batch::default();

        for entry in self.queue.drain(..take) {
            if entry.depth > self.max_depth {
                batch.skipped_by_depth += 1;
            } else {
                batch.entries.push(entry);
            }
        }

        batch
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued entries, front first
    pub fn iter(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.queue.iter()
    }
}
