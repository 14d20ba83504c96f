use serde::Deserialize;

/// Browser-like user agent sent with every request unless overridden
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Site-Corpus
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub robots: RobotsConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration with default settings for one site
    pub fn for_site(domain: impl Into<String>, seeds: Vec<String>) -> Self {
        Self {
            target: TargetConfig {
                domain: domain.into(),
                seeds,
            },
            crawler: CrawlerConfig::default(),
            fetcher: FetcherConfig::default(),
            filter: FilterConfig::default(),
            robots: RobotsConfig::default(),
            sitemap: SitemapConfig::default(),
            validator: ValidatorConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// The site being mapped
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Domain that bounds the crawl (subdomains are in scope)
    pub domain: String,

    /// URLs the recursive crawl starts from at depth 0
    pub seeds: Vec<String>,
}

/// Recursive crawl limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth from a seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Corpus size at which the crawl stops
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Frontier entries drained per scheduling round
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Maximum in-flight fetches within a batch
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: usize,

    /// Pause before each fetch (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Also mine quoted .html paths from inline scripts
    #[serde(rename = "extract-script-links")]
    pub extract_script_links: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 9,
            max_pages: 50_000,
            batch_size: 500,
            concurrency_limit: 100,
            politeness_delay_ms: 10,
            extract_script_links: false,
        }
    }
}

/// HTTP fetch behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Encoding labels tried, in order, after the header charset
    pub encodings: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            encodings: vec!["utf-8".to_string(), "shift_jis".to_string()],
        }
    }
}

/// Scope rules applied to every candidate URL
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Path suffixes that are never followed
    #[serde(rename = "skip-extensions")]
    pub skip_extensions: Vec<String>,

    /// Substrings that exclude a URL wherever they appear
    #[serde(rename = "skip-patterns")]
    pub skip_patterns: Vec<String>,

    #[serde(rename = "max-url-length")]
    pub max_url_length: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let skip_extensions = [
            // Styles and scripts
            ".css", ".js", // Fonts
            ".woff", ".woff2", ".ttf", ".eot", ".otf", // Images
            ".ico", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".bmp",
            // Documents
            ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".xml", ".txt",
            // Archives
            ".zip", ".rar", ".7z", ".tar", ".gz", ".exe", // Data
            ".json", ".csv", ".rss", ".atom", // Media
            ".mp3", ".mp4", ".avi", ".mov", ".wmv", ".wav",
        ];
        let skip_patterns = [
            "javascript:",
            "mailto:",
            "tel:",
            "/tmp/",
            "#tmp_header",
            "/wp-admin/",
            "/login",
        ];

        Self {
            skip_extensions: skip_extensions.iter().map(|s| s.to_string()).collect(),
            skip_patterns: skip_patterns.iter().map(|s| s.to_string()).collect(),
            max_url_length: 1000,
        }
    }
}

/// robots.txt strategy settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RobotsConfig {
    /// Run the robots.txt pattern-mining strategy before the crawl
    #[serde(rename = "mine-patterns")]
    pub mine_patterns: bool,

    /// Drop links disallowed by robots.txt during the crawl
    pub respect: bool,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            mine_patterns: true,
            respect: false,
        }
    }
}

/// Sitemap strategy settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Run the sitemap strategy before the crawl
    pub enabled: bool,

    /// Upper bound on sitemap fetches, index children included
    #[serde(rename = "max-sitemaps")]
    pub max_sitemaps: usize,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_sitemaps: 50,
        }
    }
}

/// Liveness checking of the finished corpus
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: usize,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 30,
            timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the persisted JSON corpus
    #[serde(rename = "store-path")]
    pub store_path: String,

    /// Optional plain-text export of the corpus
    #[serde(rename = "url-list-path")]
    pub url_list_path: Option<String>,

    /// Optional JSON report written by --validate
    #[serde(rename = "validation-path")]
    pub validation_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            store_path: "all_urls.json".to_string(),
            url_list_path: None,
            validation_path: None,
        }
    }
}
