use crate::config::types::{Config, CrawlerConfig, FilterConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_filter_config(&config.filters)?;
    Ok(())
}

/// Validates target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_profiles < 1 || config.max_concurrent_profiles > 500 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-profiles must be between 1 and 500, got {}",
            config.max_concurrent_profiles
        )));
    }

    if config.fetch_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch-attempts must be >= 1, got {}",
            config.fetch_attempts
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv-path cannot be empty".to_string(),
        ));
    }

    if config.cache_dir.is_empty() {
        return Err(ConfigError::Validation(
            "cache-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the location and subject lists
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.locations.is_empty() {
        return Err(ConfigError::Validation(
            "at least one location is required".to_string(),
        ));
    }

    if config.subjects.is_empty() {
        return Err(ConfigError::Validation(
            "at least one subject is required".to_string(),
        ));
    }

    for slug in config.locations.iter().chain(config.subjects.iter()) {
        validate_slug(slug)?;
    }

    Ok(())
}

/// A slug becomes a URL path segment, so it is limited to `[a-z0-9-]`
fn validate_slug(slug: &str) -> Result<(), ConfigError> {
    if slug.is_empty() {
        return Err(ConfigError::Validation(
            "filter slug cannot be empty".to_string(),
        ));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "filter slug '{}' must contain only lowercase letters, digits and hyphens",
            slug
        )));
    }

    Ok(())
}
