//! Configuration module for Tutor-Harvest
//!
//! The crawl is fully described by one immutable [`Config`]: the target site,
//! the filter lists, throttling and retry parameters, and output locations.
//! `Config::default()` reproduces the production crawl; a TOML file can
//! override any subset of it.
//!
//! # Example
//!
//! ```no_run
//! use tutor_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling {} locations", config.filters.locations.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FilterConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
