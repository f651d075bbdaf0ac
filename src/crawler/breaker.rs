//! Process-wide circuit breaker layered over the fetcher
//!
//! When the target host is down, every uncached URL would otherwise pay the
//! full delay-plus-backoff schedule before failing. After `threshold`
//! consecutive exhausted fetches the breaker opens and rejects fetches until
//! the cooldown elapses. After the cooldown a single probe fetch is let
//! through while other callers are still rejected. A failed probe re-opens
//! the breaker immediately and a successful one closes it.

use crate::config::CrawlerConfig;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    open_until: Option<Instant>,
    probing: bool,
}

/// Trips after a run of consecutive fetch failures
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Creates a closed breaker
    ///
    /// `threshold` must be at least 1; use [`CircuitBreaker::from_config`] to
    /// get `None` for a disabled breaker.
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            cooldown,
            state: Mutex::new(BreakerState::default()),
        }
    }

    /// Builds a breaker from crawler settings; a zero threshold disables it
    pub fn from_config(config: &CrawlerConfig) -> Option<Self> {
        if config.breaker_threshold == 0 {
            return None;
        }
        Some(Self::new(
            config.breaker_threshold,
            config.breaker_cooldown(),
        ))
    }

    /// Admits a fetch, or returns `Err(remaining)` while the breaker is open
    ///
    /// Once the cooldown has passed the first caller becomes the half-open
    /// probe and must report back through `record_success` or
    /// `record_failure`. Until it does, other callers get `Err(Duration::ZERO)`.
    pub fn check(&self) -> Result<(), Duration> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(until) = state.open_until else {
            return Ok(());
        };

        let now = Instant::now();
        if now < until {
            return Err(until - now);
        }
        if state.probing {
            return Err(Duration::ZERO);
        }

        state.probing = true;
        tracing::info!("Circuit half-open, letting one probe fetch through");
        Ok(())
    }

    /// True while fetches would be rejected; never claims the probe slot
    pub fn is_open(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.open_until {
            Some(until) => Instant::now() < until || state.probing,
            None => false,
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.open_until.is_some() {
            tracing::info!("Circuit closed after successful fetch");
        }
        state.consecutive_failures = 0;
        state.open_until = None;
        state.probing = false;
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.probing = false;

        // The count is only reset by a success, so a failed probe after the
        // cooldown re-opens straight away.
        if state.consecutive_failures >= self.threshold {
            state.open_until = Some(Instant::now() + self.cooldown);
            tracing::warn!(
                "Circuit open for {:?} after {} consecutive fetch failures",
                self.cooldown,
                state.consecutive_failures
            );
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .consecutive_failures
    }
}
