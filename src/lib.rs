//! Tutor-Harvest: a cached, throttled directory crawler
//!
//! This crate walks the search listings of a tutor directory for every
//! location × subject filter pair, visits each tutor's profile page, extracts
//! the profile fields and writes the collected records to a CSV file.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod model;
pub mod output;

use thiserror::Error;

/// Main error type for Tutor-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Concurrency limiter closed")]
    LimiterClosed,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Response cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache directory {path} is not usable: {source}")]
    Unusable {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write cache entry for {url}: {source}")]
    Write { url: String, source: std::io::Error },
}

/// Errors raised by the fetcher once a URL cannot be retrieved
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Giving up on {url} after {attempts} attempts: {source}")]
    Exhausted {
        url: String,
        attempts: u32,
        source: Box<FetchError>,
    },

    #[error("Circuit open, skipping {url}")]
    CircuitOpen { url: String },
}

/// Failure while crawling a single listing page
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Failed to fetch listing page {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("Invalid listing URL: {0}")]
    InvalidUrl(#[from] ::url::ParseError),
}

/// Failure while fetching or parsing a single profile page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to fetch profile: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid profile link '{link}': {source}")]
    InvalidLink {
        link: String,
        source: ::url::ParseError,
    },

    #[error("Profile section missing on {0}")]
    MissingProfile(String),
}

/// Result type alias for Tutor-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{FilterPair, TutorRecord};
