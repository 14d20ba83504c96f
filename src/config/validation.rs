use crate::config::types::{
    Config, CrawlerConfig, FetcherConfig, FilterConfig, OutputConfig, SitemapConfig, TargetConfig,
    ValidatorConfig,
};
use crate::url::host_in_scope;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_target_config(&config.target)?;
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_filter_config(&config.filter)?;
    validate_sitemap_config(&config.sitemap)?;
    validate_validator_config(&config.validator)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target domain and seed list
fn validate_target_config(config: &TargetConfig) -> ConfigResult<()> {
    validate_domain_string(&config.domain)?;

    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Target '{}' must have at least one seed URL",
            config.domain
        )));
    }

    for seed in &config.seeds {
        validate_seed(seed, &config.domain)?;
    }

    Ok(())
}

/// Checks that a seed is an http(s) URL inside the target domain
pub(crate) fn validate_seed(seed: &str, domain: &str) -> ConfigResult<()> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    let in_scope = url
        .host_str()
        .map(|host| host_in_scope(host, domain))
        .unwrap_or(false);
    if !in_scope {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' is outside target domain '{}'",
            seed, domain
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1".to_string(),
        ));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    validate_concurrency("crawler.concurrency_limit", config.concurrency_limit)
}

fn validate_concurrency(name: &str, limit: usize) -> ConfigResult<()> {
    if !(1..=1000).contains(&limit) {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and 1000, got {}",
            name, limit
        )));
    }
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> ConfigResult<()> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "fetcher.timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for label in &config.encodings {
        if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
            return Err(ConfigError::Validation(format!(
                "Unknown character encoding '{}'",
                label
            )));
        }
    }

    Ok(())
}

/// Validates filter configuration
fn validate_filter_config(config: &FilterConfig) -> ConfigResult<()> {
    if config.max_url_length < 1 {
        return Err(ConfigError::Validation(
            "max_url_length must be >= 1".to_string(),
        ));
    }

    for ext in &config.skip_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::InvalidPattern(format!(
                "Skip extension '{}' must look like '.ext'",
                ext
            )));
        }
    }

    if config.skip_patterns.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::InvalidPattern(
            "Skip patterns cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_sitemap_config(config: &SitemapConfig) -> ConfigResult<()> {
    if config.enabled && config.max_sitemaps < 1 {
        return Err(ConfigError::Validation(
            "sitemap.max_sitemaps must be >= 1 while the strategy is enabled".to_string(),
        ));
    }
    Ok(())
}

fn validate_validator_config(config: &ValidatorConfig) -> ConfigResult<()> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "validator.timeout_secs must be >= 1".to_string(),
        ));
    }
    validate_concurrency("validator.concurrency_limit", config.concurrency_limit)
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.store_path.is_empty() {
        return Err(ConfigError::Validation(
            "store_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a domain string
fn validate_domain_string(domain: &str) -> ConfigResult<()> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') && domain != "localhost" {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.org')",
            domain
        )));
    }

    Ok(())
}
