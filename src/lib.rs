//! Site-Corpus: incremental URL discovery for a single website
//!
//! This crate discovers every reachable page on one target site by running
//! independent discovery strategies (sitemap reading, robots.txt pattern
//! mining, recursive breadth-first crawling) and merging their outputs into one deduplicated,
//! persisted URL corpus.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod sitemap;
pub mod state;
pub mod storage;
pub mod url;
pub mod validator;

use thiserror::Error;

/// Main error type for Site-Corpus operations
///
/// Individual URL failures never surface here; they are recorded in the
/// crawl result. Only configuration and client-construction problems abort
/// a run. Store failures are reported by the store itself as `StoreError`.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid engine state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::EngineState,
        to: state::EngineState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Site-Corpus operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{DiscoveryEngine, DiscoveryResult};
pub use state::{CrawlState, EngineState};
pub use storage::{MergeOutcome, UrlStore};
pub use url::{normalize_url, UrlFilter};
