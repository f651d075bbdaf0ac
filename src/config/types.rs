use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Tutor-Harvest
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the built-in defaults, which describe the full production crawl.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    pub filters: FilterConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL that listing paths and relative profile links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Transport timeout for a single request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of profile pages fetched and extracted at once
    #[serde(rename = "max-concurrent-profiles")]
    pub max_concurrent_profiles: usize,

    /// Number of network attempts per uncached URL
    #[serde(rename = "fetch-attempts")]
    pub fetch_attempts: u32,

    /// Fixed delay before every network attempt (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Backoff after a failed attempt, multiplied by the attempt number (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Consecutive fetch failures before the circuit opens (0 disables it)
    #[serde(rename = "breaker-threshold")]
    pub breaker_threshold: u32,

    /// How long an open circuit rejects fetches (milliseconds)
    #[serde(rename = "breaker-cooldown-ms")]
    pub breaker_cooldown_ms: u64,

    /// Optional cap on listing pages per filter pair
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the CSV file written at the end of the run
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Directory holding cached response bodies
    #[serde(rename = "cache-dir")]
    pub cache_dir: String,
}

/// Filter lists whose cross product defines the crawl scope
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Region slugs, crawled in order (outer loop)
    pub locations: Vec<String>,

    /// Subject slugs, crawled in order (inner loop)
    pub subjects: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.tutorfinder.com.au".to_string(),
            user_agent: concat!("tutor-harvest/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_profiles: 50,
            fetch_attempts: 3,
            request_delay_ms: 2000,
            backoff_base_ms: 5000,
            breaker_threshold: 0,
            breaker_cooldown_ms: 60_000,
            max_pages: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "tutor_data.csv".to_string(),
            cache_dir: "html_cache".to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        let locations = ["melbourne", "sydney", "brisbane", "perth", "adelaide"];
        let subjects = [
            "biology",
            "chemistry",
            "economics",
            "english",
            "english-language",
            "english-literature",
            "general-maths",
            "maths-methods",
            "maths-specialist",
            "physics",
        ];

        Self {
            locations: locations.iter().map(|s| s.to_string()).collect(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_millis(self.breaker_cooldown_ms)
    }
}

impl SiteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
