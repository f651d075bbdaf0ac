//! HTTP fetcher implementation
//!
//! This module handles every request the crawler makes:
//! - Serving bodies from the response cache when available
//! - Throttling new load with a fixed delay before each network attempt
//! - Retrying failed attempts with a backoff that grows with the attempt number
//! - Short-circuiting through the circuit breaker when the host keeps failing

use crate::cache::ResponseCache;
use crate::config::{CrawlerConfig, SiteConfig};
use crate::crawler::breaker::CircuitBreaker;
use crate::{FetchError, FetchResult};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Attempt count and timings for uncached fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total network attempts per URL
    pub attempts: u32,

    /// Sleep before every attempt
    pub delay: Duration,

    /// Sleep after failed attempt `n` is `backoff_base * n`
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            attempts: config.fetch_attempts.max(1),
            delay: config.request_delay(),
            backoff_base: config.backoff_base(),
        }
    }

    /// Backoff applied after the given (1-based) failed attempt
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Snapshot of fetcher counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Fetches answered from the response cache
    pub cache_hits: u64,

    /// GET requests sent over the network
    pub network_requests: u64,

    /// Attempts repeated after a failure
    pub retries: u64,

    /// Fetches that gave up (exhausted or rejected by the breaker)
    pub failures: u64,
}

#[derive(Debug, Default)]
struct FetchCounters {
    cache_hits: AtomicU64,
    network_requests: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
}

/// Builds the HTTP client used for every request
///
/// # Example
///
/// ```
/// use tutor_harvest::config::SiteConfig;
/// use tutor_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&SiteConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &SiteConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Cache-first fetcher with throttling and bounded retry
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    cache: ResponseCache,
    policy: RetryPolicy,
    breaker: Option<CircuitBreaker>,
    counters: FetchCounters,
}

impl Fetcher {
    pub fn new(client: Client, cache: ResponseCache, policy: RetryPolicy) -> Self {
        Self {
            client,
            cache,
            policy,
            breaker: None,
            counters: FetchCounters::default(),
        }
    }

    /// Layers a circuit breaker over network fetches
    pub fn with_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = Some(breaker);
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn stats(&self) -> FetchStats {
        FetchStats {
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            network_requests: self.counters.network_requests.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Fetches the body of `url`
    ///
    /// # Request Flow
    ///
    /// 1. Cache hit → return immediately (no delay, no request)
    /// 2. Breaker open → `FetchError::CircuitOpen`
    /// 3. For each attempt: sleep the fixed delay, then GET
    ///    - 2xx → cache the body and return it
    ///    - anything else → sleep `backoff_base * attempt` and retry
    /// 4. Last attempt failed → `FetchError::Exhausted` with the last error
    pub async fn fetch(&self, url: &str) -> FetchResult<String> {
        if let Some(body) = self.cache.get(url).await {
            tracing::info!("Serving from cache: {}", url);
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(body);
        }

        if let Some(breaker) = &self.breaker {
            if let Err(remaining) = breaker.check() {
                tracing::warn!("Circuit open ({:?} left), skipping {}", remaining, url);
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                return Err(FetchError::CircuitOpen {
                    url: url.to_string(),
                });
            }
        }

        tracing::info!("Fetching from network: {}", url);
        let mut attempt = 1;

        loop {
            tokio::time::sleep(self.policy.delay).await;

            match self.get_once(url).await {
                Ok(body) => {
                    match self.cache.put(url, &body).await {
                        Ok(()) => tracing::debug!("Saved to cache: {}", url),
                        Err(e) => tracing::warn!("{}", e),
                    }
                    if let Some(breaker) = &self.breaker {
                        breaker.record_success();
                    }
                    return Ok(body);
                }
                Err(e) => {
                    tracing::warn!(
                        "Error fetching {} (attempt {}/{}): {}",
                        url,
                        attempt,
                        self.policy.attempts,
                        e
                    );

                    if attempt >= self.policy.attempts {
                        self.counters.failures.fetch_add(1, Ordering::Relaxed);
                        if let Some(breaker) = &self.breaker {
                            breaker.record_failure();
                        }
                        return Err(FetchError::Exhausted {
                            url: url.to_string(),
                            attempts: attempt,
                            source: Box::new(e),
                        });
                    }

                    self.counters.retries.fetch_add(1, Ordering::Relaxed);
                    tokio::time::sleep(self.policy.backoff_for(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Sends a single GET; non-2xx statuses count as failures
    async fn get_once(&self, url: &str) -> FetchResult<String> {
        self.counters.network_requests.fetch_add(1, Ordering::Relaxed);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
    }
}
