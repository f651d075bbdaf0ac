//! Harvest coordinator - main crawl orchestration logic
//!
//! This module drives the whole run:
//! - Opening the response cache and building the fetcher
//! - Crawling the listings of every filter pair, one pair at a time
//! - Fanning profile extraction out through the concurrency limiter
//! - Stamping each record with its filter pair
//! - Handing the final batch to the output writer

use crate::cache::ResponseCache;
use crate::config::{validate, Config};
use crate::crawler::breaker::CircuitBreaker;
use crate::crawler::fetcher::{build_http_client, Fetcher, RetryPolicy};
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::crawler::listing::crawl_listings;
use crate::crawler::profile::scrape_profile;
use crate::model::{filter_pairs, FilterPair, TutorRecord};
use crate::output::{CsvOutput, HarvestStatistics, OutputWriter};
use crate::HarvestError;
use futures::future::join_all;
use url::Url;

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Config,
    base_url: Url,
    fetcher: Fetcher,
    limiter: ConcurrencyLimiter,
    stats: HarvestStatistics,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Invalid configuration, unusable cache directory
    ///   or HTTP client setup failure
    pub async fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;

        let base_url = Url::parse(&config.site.base_url)?;
        let cache = ResponseCache::open(&config.output.cache_dir).await?;
        let client = build_http_client(&config.site)?;

        let mut fetcher = Fetcher::new(client, cache, RetryPolicy::from_config(&config.crawler));
        if let Some(breaker) = CircuitBreaker::from_config(&config.crawler) {
            fetcher = fetcher.with_breaker(breaker);
        }

        let limiter = ConcurrencyLimiter::new(config.crawler.max_concurrent_profiles);

        Ok(Self {
            config,
            base_url,
            fetcher,
            limiter,
            stats: HarvestStatistics::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn stats(&self) -> &HarvestStatistics {
        &self.stats
    }

    /// Crawls one filter pair and extracts every profile it lists
    ///
    /// Records come back in link order, already stamped with the pair's
    /// location and subject. Profiles that fail are dropped.
    pub async fn harvest_pair(&mut self, pair: &FilterPair) -> Vec<TutorRecord> {
        tracing::info!(
            "Starting scraping for Location: {}, Subject: {}",
            pair.location,
            pair.subject
        );

        let listing = crawl_listings(
            &self.fetcher,
            &self.base_url,
            pair,
            self.config.crawler.max_pages,
        )
        .await;

        tracing::info!(
            "Found {} tutor links for {}, {}",
            listing.links.len(),
            pair.location,
            pair.subject
        );

        let fetcher = &self.fetcher;
        let base_url = &self.base_url;
        let limiter = &self.limiter;

        let tasks = listing
            .links
            .iter()
            .map(|link| limiter.schedule(scrape_profile(fetcher, base_url, link)));
        let results = join_all(tasks).await;

        let mut records = Vec::with_capacity(results.len());
        let mut dropped = 0;
        for result in results {
            match result {
                Ok(Some(record)) => records.push(record.with_filter(pair)),
                Ok(None) => dropped += 1,
                Err(e) => {
                    tracing::error!("Profile task for {} did not run: {}", pair, e);
                    dropped += 1;
                }
            }
        }

        self.stats.listing_pages += u64::from(listing.pages);
        self.stats.links_found += listing.links.len() as u64;
        self.stats.records_extracted += records.len() as u64;
        self.stats.extraction_failures += dropped;
        if listing.failed {
            self.stats.listing_failures += 1;
        }
        self.stats.pairs_processed += 1;

        tracing::info!(
            "Finished {}: {} records, {} dropped",
            pair,
            records.len(),
            dropped
        );

        records
    }

    /// Runs every filter pair in order and returns all records
    ///
    /// Pairs are processed strictly one after another (location-major), so
    /// the returned records are grouped by pair in crawl order.
    pub async fn collect(&mut self) -> Vec<TutorRecord> {
        let pairs = filter_pairs(&self.config.filters);
        tracing::info!("Harvesting {} filter pairs", pairs.len());

        let mut all_records = Vec::new();
        for pair in &pairs {
            let records = self.harvest_pair(pair).await;
            all_records.extend(records);
        }

        all_records
    }

    /// Collects every record and writes them as one batch
    ///
    /// A write failure is logged and not retried; the returned statistics
    /// report whether the output was written.
    pub async fn run<W: OutputWriter>(&mut self, writer: &mut W) -> HarvestStatistics {
        let records = self.collect().await;

        tracing::info!("Writing {} records...", records.len());
        match writer.write_records(&records) {
            Ok(()) => {
                self.stats.output_written = true;
                tracing::info!("Output written successfully");
            }
            Err(e) => {
                tracing::error!("Error writing output: {}", e);
            }
        }

        self.stats.finish(self.fetcher.stats());
        self.stats.clone()
    }
}

/// Runs a complete harvest and writes the CSV named in the configuration
///
/// # Example
///
/// ```no_run
/// use tutor_harvest::config::Config;
/// use tutor_harvest::crawler::run_harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stats = run_harvest(Config::default()).await?;
/// println!("{} records", stats.records_extracted);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config) -> Result<HarvestStatistics, HarvestError> {
    let mut writer = CsvOutput::new(&config.output.csv_path);
    let mut coordinator = Coordinator::new(config).await?;
    Ok(coordinator.run(&mut writer).await)
}
