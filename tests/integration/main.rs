//! End-to-end tests against mock HTTP servers

mod common;
mod crawl_tests;
mod fetcher_tests;
mod validator_tests;
