//! URL validator - liveness checks over a discovered corpus
//!
//! Each URL gets one HEAD request (redirects followed). A final status in
//! 200..400 counts as valid; a transport error is invalid with status 0.
//! Checks run concurrently under the same semaphore pattern as the crawler.

use crate::config::Config;
use crate::crawler::build_client;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Outcome of checking one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlCheck {
    pub url: String,
    pub valid: bool,
    /// Final HTTP status, 0 when no response arrived
    pub status: u16,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    /// Where redirects ended, when that differs from `url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UrlCheck {
    pub fn is_html(&self) -> bool {
        self.content_type.to_lowercase().contains("text/html")
    }

    pub fn is_redirect(&self) -> bool {
        self.redirected_to.is_some()
    }
}

/// Summary counts of a validation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSummary {
    pub total_checked: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub html_count: usize,
    pub redirect_count: usize,
    pub execution_time: f64,
}

/// Full validation report, serializable to JSON
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub base_domain: String,
    pub validation_timestamp: String,
    pub summary: ValidationSummary,
    pub valid_urls: Vec<UrlCheck>,
    pub invalid_urls: Vec<UrlCheck>,
    pub html_urls: Vec<String>,
}

impl ValidationReport {
    fn from_checks(base_domain: &str, mut checks: Vec<UrlCheck>, elapsed: Duration) -> Self {
        checks.sort_by(|a, b| a.url.cmp(&b.url));

        let total_checked = checks.len();
        let html_urls: Vec<String> = checks
            .iter()
            .filter(|c| c.valid && c.is_html())
            .map(|c| c.url.clone())
            .collect();
        let redirect_count = checks.iter().filter(|c| c.valid && c.is_redirect()).count();
        let (valid_urls, invalid_urls): (Vec<_>, Vec<_>) = checks.into_iter().partition(|c| c.valid);

        Self {
            base_domain: base_domain.to_string(),
            validation_timestamp: Utc::now().to_rfc3339(),
            summary: ValidationSummary {
                total_checked,
                valid_count: valid_urls.len(),
                invalid_count: invalid_urls.len(),
                html_count: html_urls.len(),
                redirect_count,
                execution_time: elapsed.as_secs_f64(),
            },
            valid_urls,
            invalid_urls,
            html_urls,
        }
    }

    /// Writes the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

/// Concurrent HEAD checker
#[derive(Debug, Clone)]
pub struct Validator {
    client: Client,
    concurrency_limit: usize,
}

impl Validator {
    /// Creates a validator from configuration
    ///
    /// Uses the fetcher's user agent and the validator's own timeout and
    /// concurrency limit.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_client(
            &config.fetcher.user_agent,
            Duration::from_secs(config.validator.timeout_secs),
        )?;
        Ok(Self::with_client(client, config.validator.concurrency_limit))
    }

    pub fn with_client(client: Client, concurrency_limit: usize) -> Self {
        Self {
            client,
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    /// Checks a single URL
    pub async fn check(&self, url: &str) -> UrlCheck {
        check_url(&self.client, url).await
    }

    /// Checks every URL and builds a report
    ///
    /// # Arguments
    ///
    /// * `base_domain` - Recorded in the report
    /// * `urls` - URLs to check
    ///
    /// # Returns
    ///
    /// A report whose URL lists are sorted
    pub async fn validate<I>(&self, base_domain: &str, urls: I) -> ValidationReport
    where
        I: IntoIterator<Item = String>,
    {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut tasks = JoinSet::new();

        for url in urls {
            let client = self.client.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                check_url(&client, &url).await
            });
        }

        let mut checks = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(check) => checks.push(check),
                Err(e) => tracing::warn!("Validation task failed to complete: {}", e),
            }
        }

        let report = ValidationReport::from_checks(base_domain, checks, started.elapsed());
        tracing::info!(
            "Validated {} URLs: {} valid, {} invalid, {} HTML, {} redirected in {:.1}s",
            report.summary.total_checked,
            report.summary.valid_count,
            report.summary.invalid_count,
            report.summary.html_count,
            report.summary.redirect_count,
            report.summary.execution_time
        );
        report
    }
}

async fn check_url(client: &Client, url: &str) -> UrlCheck {
    match client.head(url).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            let final_url = response.url().as_str();
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            UrlCheck {
                url: url.to_string(),
                valid: (200..400).contains(&status),
                status,
                content_type,
                redirected_to: (final_url != url).then(|| final_url.to_string()),
                error: None,
            }
        }
        Err(e) => {
            tracing::debug!("Error checking {}: {}", url, e);
            UrlCheck {
                url: url.to_string(),
                valid: false,
                status: 0,
                content_type: String::new(),
                redirected_to: None,
                error: Some(e.to_string()),
            }
        }
    }
}
