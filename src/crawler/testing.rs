//! In-memory site used by crawler unit tests

use crate::crawler::fetcher::{FetchResult, PageFetcher};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const ORIGIN: &str = "https://example.org";

/// A fake `example.org` that answers from a fixed table
///
/// Paths not in the table answer 404.
#[derive(Default)]
pub(crate) struct FakeSite {
    responses: HashMap<String, FetchResult>,
    latency: Duration,
    log: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, path: &str, html: &str) -> Self {
        let url = format!("{}{}", ORIGIN, path);
        self.responses.insert(
            url.clone(),
            FetchResult::Success {
                final_url: url,
                status_code: 200,
                content_type: "text/html".to_string(),
                body: html.to_string(),
            },
        );
        self
    }

    pub fn status(mut self, path: &str, status_code: u16) -> Self {
        self.responses.insert(
            format!("{}{}", ORIGIN, path),
            FetchResult::HttpFailure { status_code },
        );
        self
    }

    pub fn transport(mut self, path: &str, reason: &str) -> Self {
        self.responses.insert(
            format!("{}{}", ORIGIN, path),
            FetchResult::TransportFailure {
                reason: reason.to_string(),
            },
        );
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// URLs in the order their fetches started
    pub fn fetch_log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl PageFetcher for FakeSite {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchResult> + Send {
        let url = url.to_string();
        async move {
            self.log.lock().unwrap().push(url.clone());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if self.latency.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.latency).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.responses
                .get(&url)
                .cloned()
                .unwrap_or(FetchResult::HttpFailure { status_code: 404 })
        }
    }
}
