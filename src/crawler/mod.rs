//! Crawler module for listing traversal and profile extraction
//!
//! This module contains the core harvesting logic, including:
//! - Cache-first HTTP fetching with throttling and retry
//! - A circuit breaker for a failing host
//! - Listing pagination and link collection
//! - Profile field extraction
//! - Bounded concurrency for profile work
//! - Overall run coordination

mod breaker;
mod coordinator;
mod fetcher;
mod limiter;
mod listing;
mod profile;

pub use breaker::CircuitBreaker;
pub use coordinator::{run_harvest, Coordinator};
pub use fetcher::{build_http_client, FetchStats, Fetcher, RetryPolicy};
pub use limiter::ConcurrencyLimiter;
pub use listing::{
    crawl_listings, fetch_listing_page, listing_url, parse_listing_page, ListingCrawl,
    ListingPage,
};
pub use profile::{
    clean_registered, clean_text, extract_profile, find_email, find_phone, resolve_link,
    scrape_profile, section_text, try_scrape_profile,
};

use crate::config::Config;
use crate::output::HarvestStatistics;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Open the response cache
/// 2. Build the HTTP client and fetcher
/// 3. Crawl the listings of every filter pair
/// 4. Extract every listed profile
/// 5. Write the collected records
pub async fn harvest(config: Config) -> Result<HarvestStatistics, HarvestError> {
    run_harvest(config).await
}
