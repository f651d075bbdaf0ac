//! Tutor-Harvest main entry point
//!
//! This is the command-line interface for the Tutor-Harvest crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tutor_harvest::config::{load_config_with_hash, Config};
use tutor_harvest::crawler::harvest;
use tutor_harvest::model::filter_pairs;
use tutor_harvest::output::print_statistics;

/// Tutor-Harvest: a cached, throttled tutor directory crawler
///
/// Crawls the directory listings for every location × subject pair, extracts
/// each tutor profile and writes the results to a CSV file. Responses are
/// cached on disk, so reruns only fetch pages not seen before.
#[derive(Parser, Debug)]
#[command(name = "tutor-harvest")]
#[command(version)]
#[command(about = "A cached, throttled tutor directory crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the CSV here instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Use this response cache directory instead of the configured one
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }
    if let Some(cache_dir) = &cli.cache_dir {
        config.output.cache_dir = cache_dir.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tutor_harvest=info,warn"),
            1 => EnvFilter::new("tutor_harvest=debug,info"),
            2 => EnvFilter::new("tutor_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    tutor_harvest::config::validate(config).context("Invalid configuration")?;

    println!("=== Tutor-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  User agent: {}", config.site.user_agent);
    println!("  Request timeout: {}s", config.site.request_timeout_secs);

    println!("\nCrawler:");
    println!(
        "  Max concurrent profiles: {}",
        config.crawler.max_concurrent_profiles
    );
    println!("  Fetch attempts: {}", config.crawler.fetch_attempts);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Backoff base: {}ms", config.crawler.backoff_base_ms);
    if config.crawler.breaker_threshold == 0 {
        println!("  Circuit breaker: disabled");
    } else {
        println!(
            "  Circuit breaker: {} failures, {}ms cooldown",
            config.crawler.breaker_threshold, config.crawler.breaker_cooldown_ms
        );
    }
    match config.crawler.max_pages {
        Some(cap) => println!("  Page cap per pair: {}", cap),
        None => println!("  Page cap per pair: none"),
    }

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Cache: {}", config.output.cache_dir);

    let pairs = filter_pairs(&config.filters);
    println!("\nFilter pairs ({}):", pairs.len());
    for pair in &pairs {
        println!("  - {}", pair);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Locations: {}, Subjects: {}",
        config.filters.locations.len(),
        config.filters.subjects.len()
    );

    let stats = harvest(config).await.context("Harvest failed")?;

    if stats.output_written {
        tracing::info!("Harvest completed successfully");
    } else {
        tracing::warn!("Harvest completed but the output could not be written");
    }
    print_statistics(&stats);

    Ok(())
}
