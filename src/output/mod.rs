//! Output module for run reports and corpus exports
//!
//! This module handles:
//! - Printing the summary of a discovery run
//! - Printing corpus statistics
//! - Exporting the corpus as a plain URL list

pub mod stats;

pub use stats::{load_statistics, print_statistics, CorpusStatistics, PhaseStatistics};

use crate::crawler::DiscoveryResult;
use crate::storage::MergeOutcome;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Number of failures listed individually in the run report
const FAILURES_SHOWN: usize = 10;

/// Prints the summary of one discovery run
///
/// # Arguments
///
/// * `result` - The finished run
/// * `merge` - What merging the run into the corpus contributed, if it was merged
pub fn print_discovery_report(result: &DiscoveryResult, merge: Option<&MergeOutcome>) {
    println!("=== Recursive Discovery ===\n");

    println!("  Status: {}", result.status);
    println!("  Duration: {:.1}s", result.elapsed_secs());
    println!("  Batches: {}", result.batches);
    println!("  Discovered: {}", result.discovered.len());
    println!("  Fetched: {}", result.fetched.len());
    println!("  Failed: {}", result.failed.len());
    println!("  Skipped by depth: {}", result.skipped_by_depth);
    if result.blocked_by_robots > 0 {
        println!("  Blocked by robots.txt: {}", result.blocked_by_robots);
    }
    if result.queued_remaining > 0 {
        println!("  Still queued: {}", result.queued_remaining);
    }
    if let Some(merge) = merge {
        println!("  New to corpus: {}", merge.new_unique());
    }
    println!();

    if !result.depth_histogram.is_empty() {
        println!("Pages by depth:");
        for (depth, count) in &result.depth_histogram {
            println!("  {:>2}: {}", depth, count);
        }
        println!();
    }

    if !result.failed.is_empty() {
        println!("Failures (first {}):", FAILURES_SHOWN.min(result.failed.len()));
        for (url, reason) in result.failed.iter().take(FAILURES_SHOWN) {
            println!("  {} - {}", url, reason);
        }
        println!();
    }
}

/// Writes URLs to a text file, one per line
///
/// # Returns
///
/// The number of lines written
pub fn export_url_list<'a, I>(urls: I, path: &Path) -> std::io::Result<usize>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    let mut count = 0;
    for url in urls {
        writeln!(writer, "{}", url)?;
        count += 1;
    }
    writer.flush()?;

    tracing::info!("Exported {} URLs to {}", count, path.display());
    Ok(count)
}
