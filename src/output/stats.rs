//! Run statistics
//!
//! Counters gathered while a harvest runs, printed once it finishes.

use crate::crawler::FetchStats;
use chrono::{DateTime, Utc};

/// Harvest run summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Filter pairs whose crawl-and-extract phase completed
    pub pairs_processed: u64,

    /// Filter pairs whose pagination ended on a failed listing page
    pub listing_failures: u64,

    /// Listing pages fetched and parsed
    pub listing_pages: u64,

    /// Profile links collected across all pairs (duplicates included)
    pub links_found: u64,

    /// Profiles turned into records
    pub records_extracted: u64,

    /// Profiles dropped because fetching or extraction failed
    pub extraction_failures: u64,

    /// Fetcher counters at the end of the run
    pub fetch: FetchStats,

    /// Whether the final batch reached the output writer
    pub output_written: bool,
}

impl HarvestStatistics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pairs_processed: 0,
            listing_failures: 0,
            listing_pages: 0,
            links_found: 0,
            records_extracted: 0,
            extraction_failures: 0,
            fetch: FetchStats::default(),
            output_written: false,
        }
    }

    pub fn finish(&mut self, fetch: FetchStats) {
        self.fetch = fetch;
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Percentage of collected links that produced a record
    pub fn extraction_rate(&self) -> f64 {
        if self.links_found == 0 {
            return 0.0;
        }
        (self.records_extracted as f64 / self.links_found as f64) * 100.0
    }
}

impl Default for HarvestStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(secs) = stats.duration_seconds() {
        println!("  Duration: {}s", secs);
    }
    println!();

    println!("Crawl:");
    println!("  Filter pairs processed: {}", stats.pairs_processed);
    println!("  Listing pages parsed: {}", stats.listing_pages);
    println!("  Pairs cut short by errors: {}", stats.listing_failures);
    println!("  Profile links found: {}", stats.links_found);
    println!(
        "  Records extracted: {} ({:.1}%)",
        stats.records_extracted,
        stats.extraction_rate()
    );
    println!("  Profiles dropped: {}", stats.extraction_failures);
    println!();

    println!("Fetcher:");
    println!("  Cache hits: {}", stats.fetch.cache_hits);
    println!("  Network requests: {}", stats.fetch.network_requests);
    println!("  Retries: {}", stats.fetch.retries);
    println!("  Failed fetches: {}", stats.fetch.failures);
    println!();

    if stats.output_written {
        println!("Output written.");
    } else {
        println!("Output NOT written (see log).");
    }
}
