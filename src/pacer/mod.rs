//! Rate and retry control
//!
//! All external requests funnel through a single [`Pacer`] token, enforcing a
//! minimum inter-request interval from the configured rate. Retries of transient
//! failures are governed by an explicit little state machine ([`RetrySchedule`])
//! that is independent of the transport: the caller classifies each failure and
//! asks the schedule whether to wait and retry or give up.
//!
//! Both the pacing wait and the backoff wait are cancellable on shutdown, so an
//! interrupted run abandons the in-flight city promptly instead of sleeping out
//! its delay.

use crate::config::{BackoffMode, ScraperConfig};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Sleeps for `duration`, returning false if the shutdown signal fires first
pub async fn interruptible_sleep(
    duration: Duration,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    if *shutdown.borrow() {
        return false;
    }

    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = shutdown.changed() => false,
    }
}

/// Single-token pacer enforcing a minimum interval between requests
///
/// Exactly one request may be in flight at a time; the orchestrator holds the
/// pacer and awaits [`Pacer::acquire`] before every page fetch.
pub struct Pacer {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl Pacer {
    /// Creates a pacer allowing `rate_limit_per_sec` requests per second
    ///
    /// Non-finite or non-positive rates fall back to one request per second;
    /// config validation rejects them before a real run gets here.
    pub fn new(rate_limit_per_sec: f64) -> Self {
        let rate = if rate_limit_per_sec.is_finite() && rate_limit_per_sec > 0.0 {
            rate_limit_per_sec
        } else {
            1.0
        };
        Self {
            min_interval: Duration::from_secs_f64(1.0 / rate),
            last_request: None,
        }
    }

    /// Waits until the next request may be issued
    ///
    /// Returns false if shutdown fired during the wait; the caller must not
    /// issue the request in that case.
    pub async fn acquire(&mut self, shutdown: &mut watch::Receiver<bool>) -> bool {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval
                && !interruptible_sleep(self.min_interval - elapsed, shutdown).await
            {
                return false;
            }
        }

        self.last_request = Some(Instant::now());
        true
    }
}

/// Backoff delay computation for retries
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base: Duration,
    mode: BackoffMode,
}

impl Backoff {
    pub fn new(base: Duration, mode: BackoffMode) -> Self {
        Self { base, mode }
    }

    /// Delay before the `failure`-th retry (1-based)
    pub fn delay(&self, failure: u32) -> Duration {
        match self.mode {
            BackoffMode::Fixed => self.base,
            BackoffMode::Exponential => self.base * 2u32.saturating_pow(failure.saturating_sub(1)),
        }
    }
}

/// What to do after a transient failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait this long, then retry the same request
    RetryAfter(Duration),

    /// Retries exhausted; classify the city unsupported
    GiveUp,
}

/// Retry state machine for one logical request
///
/// Create a fresh schedule per page fetch. After the initial attempt fails
/// transiently, up to `max_retries` further attempts are made, each preceded by
/// a backoff wait. The effective wait is the maximum of the computed backoff and
/// any server-provided retry hint.
pub struct RetrySchedule {
    max_retries: u32,
    backoff: Backoff,
    failures: u32,
}

impl RetrySchedule {
    pub fn new(max_retries: u32, backoff: Backoff) -> Self {
        Self {
            max_retries,
            backoff,
            failures: 0,
        }
    }

    /// Builds a schedule from the scraper configuration
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            config.max_retries,
            Backoff::new(
                Duration::from_millis(config.backoff_base_ms),
                config.backoff_mode,
            ),
        )
    }

    /// Records a transient failure and decides whether to retry
    ///
    /// `server_hint` is a Retry-After style delay from the response, if any.
    pub fn on_transient_failure(&mut self, server_hint: Option<Duration>) -> RetryDecision {
        self.failures += 1;
        if self.failures > self.max_retries {
            return RetryDecision::GiveUp;
        }

        let computed = self.backoff.delay(self.failures);
        let delay = match server_hint {
            Some(hint) => computed.max(hint),
            None => computed,
        };
        RetryDecision::RetryAfter(delay)
    }

    /// 1-based number of the attempt about to be made
    pub fn next_attempt(&self) -> u32 {
        self.failures + 1
    }
}
