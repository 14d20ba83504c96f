//! Statistics over the persisted corpus
//!
//! This module extracts and displays per-strategy counts from the URL store.

use crate::storage::{CorpusStorage, UrlStore};
use url::Url;

/// Per-strategy line of the statistics table
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseStatistics {
    pub name: String,
    pub raw_count: usize,
    pub execution_time: f64,
    pub timestamp: String,
}

/// Corpus statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusStatistics {
    pub base_domain: String,

    /// Size of the union of all strategies
    pub total_unique: usize,

    /// URLs that look like HTML pages (`.html`, `.htm` or no extension)
    pub html_pages: usize,

    pub phases: Vec<PhaseStatistics>,

    pub updated_at: String,
}

/// Loads statistics from a store
pub fn load_statistics<S: CorpusStorage>(store: &UrlStore<S>) -> CorpusStatistics {
    let phases = store
        .phases()
        .iter()
        .map(|(name, record)| PhaseStatistics {
            name: name.clone(),
            raw_count: record.raw_count,
            execution_time: record.execution_time,
            timestamp: record.timestamp.clone(),
        })
        .collect();

    CorpusStatistics {
        base_domain: store.base_domain().to_string(),
        total_unique: store.total_unique(),
        html_pages: store.all_unique().iter().filter(|u| looks_like_page(u)).count(),
        phases,
        updated_at: store.updated_at().to_string(),
    }
}

/// Whether the last path segment is `.html`, `.htm` or has no extension
fn looks_like_page(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let last = parsed.path().rsplit('/').next().unwrap_or("");
    match last.rsplit_once('.') {
        Some((_, ext)) => matches!(ext.to_lowercase().as_str(), "html" | "htm"),
        None => true,
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CorpusStatistics) {
    println!("=== Corpus Statistics: {} ===\n", stats.base_domain);

    println!("Overview:");
    println!("  Total unique URLs: {}", stats.total_unique);
    println!("  HTML-like pages: {}", stats.html_pages);
    if !stats.updated_at.is_empty() {
        println!("  Last updated: {}", stats.updated_at);
    }
    println!();

    if stats.phases.is_empty() {
        println!("No strategies have been merged yet.");
        return;
    }

    println!("Strategies:");
    for phase in &stats.phases {
        println!(
            "  {:<20} {:>8} URLs  {:>8.1}s  {}",
            phase.name, phase.raw_count, phase.execution_time, phase.timestamp
        );
    }
}
