//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client (connection pool, timeout, user agent)
//! - GET requests that follow redirects
//! - Decoding bodies through a chain of candidate character encodings
//! - Classifying failures as HTTP status or transport errors
//!
//! Failures are values, not errors: a fetch never aborts the crawl.

use crate::config::FetcherConfig;
use encoding_rs::Encoding;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// The server answered 2xx and the body was read
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Decoded page body
        body: String,
    },

    /// The server answered with a non-2xx status
    HttpFailure {
        /// The HTTP status code
        status_code: u16,
    },

    /// Timeout, DNS failure, refused connection or broken body stream
    TransportFailure {
        /// Error description
        reason: String,
    },
}

impl FetchResult {
    /// The failure classification, if this fetch failed
    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::HttpFailure { status_code } => Some(FailureReason::HttpStatus(*status_code)),
            Self::TransportFailure { reason } => Some(FailureReason::Transport(reason.clone())),
        }
    }
}

/// What the crawl remembers about a successfully fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PageMetadata {
    pub status_code: u16,
    pub content_type: String,
    pub title: Option<String>,
}

/// Why a URL ended up in the failed set
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    HttpStatus(u16),
    Transport(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Transport(reason) => write!(f, "transport: {}", reason),
        }
    }
}

/// Source of page bodies for the crawler
///
/// The production implementation is [`HttpFetcher`]; tests substitute an
/// in-memory site. Implementations must be stateless with respect to the
/// crawl: callers bound concurrency externally.
pub trait PageFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchResult> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (up to 10 hops) and the whole request, body
/// included, is bounded by the configured timeout.
///
/// # Example
///
/// ```no_run
/// use site_corpus::config::FetcherConfig;
/// use site_corpus::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    build_client(&config.user_agent, Duration::from_secs(config.timeout_secs))
}

/// Builds a client with an explicit user agent and timeout
pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .pool_max_idle_per_host(50)
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a pooled `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    encodings: Vec<&'static Encoding>,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration
    ///
    /// Unknown encoding labels are skipped; configuration validation rejects
    /// them before this point.
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, &config.encodings))
    }

    /// Wraps an existing client
    pub fn with_client(client: Client, encoding_labels: &[String]) -> Self {
        let encodings = encoding_labels
            .iter()
            .filter_map(|label| Encoding::for_label(label.as_bytes()))
            .collect();
        Self { client, encodings }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn get(&self, url: &str) -> FetchResult {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return transport_failure(&e),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::HttpFailure {
                status_code: status.as_u16(),
            };
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        match response.bytes().await {
            Ok(bytes) => FetchResult::Success {
                final_url,
                status_code: status.as_u16(),
                body: decode_body(&bytes, charset_from_content_type(&content_type), &self.encodings),
                content_type,
            },
            Err(e) => transport_failure(&e),
        }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchResult> + Send {
        self.get(url)
    }
}

/// Classifies a transport-level error
fn transport_failure(e: &reqwest::Error) -> FetchResult {
    let reason = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection failed".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    };
    FetchResult::TransportFailure { reason }
}

/// Extracts the `charset=` parameter from a Content-Type value
fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Encoding::for_label(value.trim().trim_matches('"').as_bytes()))
}

/// Decodes a body, trying the declared charset first and then each fallback
///
/// The first encoding that decodes without errors wins. When none does, the
/// bytes are decoded as UTF-8 with replacement characters so a badly encoded
/// page still yields whatever markup survives.
pub fn decode_body(
    bytes: &[u8],
    declared: Option<&'static Encoding>,
    fallbacks: &[&'static Encoding],
) -> String {
    for encoding in declared.into_iter().chain(fallbacks.iter().copied()) {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return text.into_owned();
        }
    }

    tracing::debug!("No candidate encoding decoded cleanly; using lossy UTF-8");
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{SHIFT_JIS, UTF_8};

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&FetcherConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; charset=Shift_JIS"),
            Some(SHIFT_JIS)
        );
        assert_eq!(
            charset_from_content_type("text/html;charset=\"utf-8\""),
            Some(UTF_8)
        );
        assert_eq!(charset_from_content_type("text/html"), None);
        assert_eq!(charset_from_content_type("text/html; charset=bogus"), None);
    }

    #[test]
    fn test_decode_utf8() {
        let body = decode_body("<a href=\"/é\">".as_bytes(), None, &[UTF_8, SHIFT_JIS]);
        assert_eq!(body, "<a href=\"/é\">");
    }

    #[test]
    fn test_decode_falls_back_to_shift_jis() {
        let (bytes, _, had_errors) = SHIFT_JIS.encode("<title>千代田区</title>");
        assert!(!had_errors);

        let body = decode_body(&bytes, None, &[UTF_8, SHIFT_JIS]);
        assert_eq!(body, "<title>千代田区</title>");
    }

    #[test]
    fn test_declared_charset_wins() {
        let (bytes, _, _) = SHIFT_JIS.encode("千代田");
        let body = decode_body(&bytes, Some(SHIFT_JIS), &[UTF_8]);
        assert_eq!(body, "千代田");
    }

    #[test]
    fn test_undecodable_body_is_lossy_not_fatal() {
        let bytes = [0xff, 0xfe, 0xfd, 0x80, 0x81];
        let body = decode_body(&bytes, None, &[UTF_8]);
        assert!(body.contains('\u{FFFD}'));
    }

    #[test]
    fn test_failure_classification() {
        let ok = FetchResult::Success {
            final_url: "https://example.org/".to_string(),
            status_code: 200,
            content_type: "text/html".to_string(),
            body: String::new(),
        };
        assert_eq!(ok.failure(), None);
        assert_eq!(
            FetchResult::HttpFailure { status_code: 404 }.failure(),
            Some(FailureReason::HttpStatus(404))
        );
        assert_eq!(
            FetchResult::TransportFailure {
                reason: "Request timeout".to_string()
            }
            .failure(),
            Some(FailureReason::Transport("Request timeout".to_string()))
        );
    }

    #[test]
    fn test_failure_reason_display() {
        assert_eq!(FailureReason::HttpStatus(503).to_string(), "HTTP 503");
        assert_eq!(
            FailureReason::Transport("Request timeout".to_string()).to_string(),
            "transport: Request timeout"
        );
    }
}
