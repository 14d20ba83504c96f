//! Site-Corpus main entry point
//!
//! This is the command-line interface that runs the discovery strategies for
//! one site and merges their results into the persisted corpus.

use anyhow::{Context, Result};
use clap::Parser;
use site_corpus::config::{load_config_with_hash, Config};
use site_corpus::crawler::{DiscoveryEngine, HttpFetcher};
use site_corpus::output::{
    export_url_list, load_statistics, print_discovery_report, print_statistics,
};
use site_corpus::robots::{discover_from_robots, site_root, RobotsPolicy};
use site_corpus::sitemap::discover_from_sitemaps;
use site_corpus::storage::UrlStore;
use site_corpus::url::UrlFilter;
use site_corpus::validator::Validator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL_LIST: &str = "discovered_urls.txt";
const DEFAULT_VALIDATION_REPORT: &str = "url_validation.json";

/// Site-Corpus: incremental URL discovery for a single website
///
/// Runs sitemap reading, robots.txt pattern mining and a breadth-first
/// recursive crawl against one site, merging every strategy's result into a persisted,
/// deduplicated URL corpus.
#[derive(Parser, Debug)]
#[command(name = "site-corpus")]
#[command(version = "1.0.0")]
#[command(about = "Incremental URL discovery for a single website", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be discovered without fetching
    #[arg(long, conflicts_with_all = ["stats", "validate", "export_list"])]
    dry_run: bool,

    /// Show statistics of the stored corpus and exit
    #[arg(long, conflicts_with_all = ["dry_run", "validate", "export_list"])]
    stats: bool,

    /// HEAD-check every stored URL and write a validation report
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_list"])]
    validate: bool,

    /// Export the stored corpus as a plain URL list and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "validate"])]
    export_list: bool,

    /// Do not run the robots.txt strategy
    #[arg(long)]
    skip_robots: bool,

    /// Do not run the sitemap strategy
    #[arg(long)]
    skip_sitemap: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.validate {
        handle_validate(&config).await
    } else if cli.export_list {
        handle_export_list(&config)
    } else {
        handle_discovery(&config, cli.skip_robots, cli.skip_sitemap).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_corpus=info,warn"),
            1 => EnvFilter::new("site_corpus=debug,info"),
            2 => EnvFilter::new("site_corpus=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_store(config: &Config) -> Result<UrlStore> {
    UrlStore::open_path(&config.output.store_path, &config.target.domain)
        .with_context(|| format!("Failed to open corpus {}", config.output.store_path))
}

/// Handles the default mode: sitemap and robots strategies, then the
/// recursive crawl
async fn handle_discovery(config: &Config, skip_robots: bool, skip_sitemap: bool) -> Result<()> {
    let mut store = open_store(config)?;
    let fetcher = Arc::new(HttpFetcher::new(&config.fetcher).context("Failed to build HTTP client")?);
    let filter = UrlFilter::from_config(config);
    let first_seed = config
        .target
        .seeds
        .first()
        .context("Configuration has no seed URLs")?;
    let root = site_root(first_seed).context("Invalid seed URL")?;

    let mine = config.robots.mine_patterns && !skip_robots;
    let read_sitemaps = config.sitemap.enabled && !skip_sitemap;
    let mut robots_policy = None;

    // robots.txt is also where the site advertises its sitemaps
    let robots = if mine || read_sitemaps || config.robots.respect {
        Some(discover_from_robots(fetcher.as_ref(), &root, &filter).await)
    } else {
        None
    };

    if read_sitemaps {
        let advertised = robots.as_ref().map(|found| found.sitemaps.as_slice()).unwrap_or(&[]);
        let found = discover_from_sitemaps(
            fetcher.as_ref(),
            &root,
            advertised,
            &filter,
            config.sitemap.max_sitemaps,
        )
        .await;
        let merge = store
            .merge("sitemap", found.urls.iter().cloned(), found.elapsed.as_secs_f64())
            .context("Failed to save sitemap results")?;
        println!("=== Sitemaps ===\n");
        println!("  Sitemaps read: {}", found.fetched.len());
        println!("  Missing or failed: {}", found.failed.len());
        if found.skipped > 0 {
            println!("  Left unread (fetch cap): {}", found.skipped);
        }
        println!("  Candidate URLs: {}", merge.total_found);
        println!("  New to corpus: {}", merge.new_unique());
        println!();
    }

    if let Some(found) = robots {
        if mine {
            let merge = store
                .merge("robots", found.urls.iter().cloned(), found.elapsed.as_secs_f64())
                .context("Failed to save robots results")?;
            println!("=== robots.txt ===\n");
            if found.found {
                println!("  Allow rules: {}", found.allow_rules);
                println!("  Disallow rules: {}", found.disallow_rules);
            } else {
                println!("  No robots.txt served");
            }
            println!("  Candidate URLs: {}", merge.total_found);
            println!("  New to corpus: {}", merge.new_unique());
            for sitemap in &found.sitemaps {
                println!("  Sitemap: {}", sitemap);
            }
            println!();
        }

        if config.robots.respect {
            robots_policy = Some(RobotsPolicy::new(found.robots, &config.fetcher.user_agent));
        }
    }

    let mut engine = DiscoveryEngine::new(Arc::clone(&fetcher), config);
    if let Some(policy) = robots_policy {
        engine = engine.with_robots(policy);
    }

    let result = engine
        .run(&config.target.seeds)
        .await
        .context("Recursive discovery failed")?;
    let merge = store
        .merge(
            "recursive-crawl",
            result.discovered.iter().cloned(),
            result.elapsed_secs(),
        )
        .context("Failed to save crawl results")?;

    print_discovery_report(&result, Some(&merge));
    println!(
        "Corpus: {} unique URLs in {}",
        store.total_unique(),
        config.output.store_path
    );

    if let Some(path) = &config.output.url_list_path {
        export_url_list(store.all_unique(), Path::new(path))
            .with_context(|| format!("Failed to export URL list to {}", path))?;
    }

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be done
fn handle_dry_run(config: &Config) -> Result<()> {
    println!("=== Site-Corpus Dry Run ===\n");

    println!("Target:");
    println!("  Domain: {}", config.target.domain);
    println!("  Seeds ({}):", config.target.seeds.len());
    for seed in &config.target.seeds {
        println!("    * {}", seed);
    }

    println!("\nCrawler:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Batch size: {}", config.crawler.batch_size);
    println!("  Concurrency limit: {}", config.crawler.concurrency_limit);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Script links: {}", config.crawler.extract_script_links);

    println!("\nFetcher:");
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Encodings: {}", config.fetcher.encodings.join(", "));

    println!("\nFilter:");
    println!("  Skipped extensions: {}", config.filter.skip_extensions.len());
    println!("  Skip patterns: {}", config.filter.skip_patterns.join(" "));
    println!("  Max URL length: {}", config.filter.max_url_length);

    println!("\nrobots.txt:");
    println!("  Mine patterns: {}", config.robots.mine_patterns);
    println!("  Respect rules: {}", config.robots.respect);

    println!("\nSitemaps:");
    println!("  Enabled: {}", config.sitemap.enabled);
    println!("  Max sitemap fetches: {}", config.sitemap.max_sitemaps);

    println!("\nOutput:");
    println!("  Corpus: {}", config.output.store_path);
    if let Some(path) = &config.output.url_list_path {
        println!("  URL list: {}", path);
    }

    let store = open_store(config)?;
    println!("\nCurrent corpus: {} unique URLs", store.total_unique());

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: prints statistics of the stored corpus
fn handle_stats(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    print_statistics(&load_statistics(&store));
    Ok(())
}

/// Handles the --validate mode: HEAD-checks the stored corpus
async fn handle_validate(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    if store.total_unique() == 0 {
        println!("Corpus is empty, nothing to validate.");
        return Ok(());
    }

    let validator = Validator::from_config(config).context("Failed to build HTTP client")?;
    let report = validator
        .validate(&config.target.domain, store.all_unique().iter().cloned())
        .await;

    let summary = &report.summary;
    println!("=== URL Validation ===\n");
    println!("  Checked: {}", summary.total_checked);
    println!("  Valid: {}", summary.valid_count);
    println!("  Invalid: {}", summary.invalid_count);
    println!("  HTML pages: {}", summary.html_count);
    println!("  Redirected: {}", summary.redirect_count);
    println!("  Duration: {:.1}s", summary.execution_time);

    let path = config
        .output
        .validation_path
        .as_deref()
        .unwrap_or(DEFAULT_VALIDATION_REPORT);
    report
        .write_json(Path::new(path))
        .with_context(|| format!("Failed to write validation report to {}", path))?;
    println!("\nReport written to {}", path);

    Ok(())
}

/// Handles the --export-list mode
fn handle_export_list(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let path = config
        .output
        .url_list_path
        .as_deref()
        .unwrap_or(DEFAULT_URL_LIST);

    let written = export_url_list(store.all_unique(), Path::new(path))
        .with_context(|| format!("Failed to export URL list to {}", path))?;
    println!("Exported {} URLs to {}", written, path);
    Ok(())
}
