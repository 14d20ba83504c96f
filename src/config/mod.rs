//! Configuration module for Site-Corpus
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site_corpus::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site.toml")).unwrap();
//! println!("Crawl will stop at depth {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetcherConfig, FilterConfig, OutputConfig, RobotsConfig, SitemapConfig,
    TargetConfig, ValidatorConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
