//! On-disk layout of the corpus file

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag written into every corpus file
pub const SCHEMA_VERSION: &str = "2.0";

/// The whole persisted corpus
///
/// Unknown fields are ignored on load so files written by other tools that
/// share the layout can be merged into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub schema_version: String,

    pub base_domain: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub created_at_utc: String,

    #[serde(default)]
    pub phases: BTreeMap<String, PhaseRecord>,

    #[serde(default)]
    pub total_unique_urls: usize,

    #[serde(default)]
    pub updated_at_utc: String,

    /// Union of every URL ever merged, kept even when a strategy is re-run
    /// with a smaller result
    #[serde(default)]
    pub all_unique_urls: Vec<String>,
}

/// One strategy's most recent result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    /// Wall-clock seconds the strategy took
    pub execution_time: f64,

    /// Number of URLs the strategy reported
    pub raw_count: usize,

    /// When the strategy was merged (RFC 3339)
    pub timestamp: String,

    /// The strategy's full result, sorted
    pub urls: Vec<String>,
}
