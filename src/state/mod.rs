//! State module for tracking discovery progress
//!
//! # Components
//!
//! - `EngineState`: lifecycle of one discovery run (idle, running, terminal)
//! - `CrawlState`: frontier, discovered/fetched/failed sets and counters owned
//!   by the engine loop

mod crawl_state;
mod engine_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use engine_state::EngineState;
