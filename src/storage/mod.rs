//! Storage module for the persisted URL corpus
//!
//! This module handles cross-run persistence, including:
//! - The JSON document layout of the corpus file
//! - A storage trait so the merge logic does not care where bytes live
//! - The atomic JSON file backend
//! - Set-based merging of strategy results into the corpus

mod document;
mod json;
mod store;
mod traits;

pub use document::{CorpusDocument, PhaseRecord, SCHEMA_VERSION};
pub use json::JsonFileStorage;
pub use store::{MergeOutcome, UrlStore};
pub use traits::CorpusStorage;

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt corpus file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corpus belongs to '{found}', not '{expected}'")]
    DomainMismatch { expected: String, found: String },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
