//! # Rate Limiter Decorator
//!
//! Sliding-window-log admission control keyed by a caller-supplied identity
//! (for example a recipient address).
//!
//! For every call with key `k`:
//!
//! 1. drop timestamps in `k`'s window older than `now - window`
//! 2. reject with `RateLimited` if the window already holds the quota
//! 3. otherwise record `now` and forward the call
//!
//! Steps 1-3 run while holding the key's map entry, so concurrent calls with the
//! same key cannot over-admit. Calls with different keys only contend when they
//! hash to the same shard.
//!
//! Windows are created lazily on a key's first call and are never dropped, so
//! memory grows with the number of distinct keys seen.

use crate::error::{PipelineError, Result};
use crate::operation::{Decorator, Operation};
use crate::resilience::metrics::AtomicRateLimiterMetrics;
use crate::resilience::{RateLimiterConfig, RateLimiterMetrics};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Call recorded; `count` is the window size including it
    Admitted { count: usize },

    /// Quota reached; the oldest timestamp leaves the window after `retry_after`
    Rejected { retry_after: Duration },
}

/// Per-key request timestamps within the current window
///
/// Cloning yields another handle to the same windows. Two decorators share
/// quota only when constructed with clones of one state handle.
#[derive(Debug, Clone, Default)]
pub struct RateLimiterState {
    windows: Arc<DashMap<String, VecDeque<Instant>>>,
}

impl RateLimiterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically purge, check and record a call for `key` at `now`
    pub fn try_acquire_at(
        &self,
        key: &str,
        max_requests: u32,
        window: Duration,
        now: Instant,
    ) -> Admission {
        let mut timestamps = self.windows.entry(key.to_string()).or_default();
        purge_expired(&mut timestamps, window, now);

        if timestamps.len() >= max_requests as usize {
            let retry_after = timestamps
                .front()
                .map(|oldest| (*oldest + window).saturating_duration_since(now))
                .unwrap_or(Duration::ZERO);
            return Admission::Rejected { retry_after };
        }

        timestamps.push_back(now);
        Admission::Admitted {
            count: timestamps.len(),
        }
    }

    /// Atomically purge, check and record a call for `key` now
    pub fn try_acquire(&self, key: &str, max_requests: u32, window: Duration) -> Admission {
        self.try_acquire_at(key, max_requests, window, Instant::now())
    }

    /// Calls recorded for `key` within the window ending now
    ///
    /// Purges expired timestamps first; unknown keys report 0 without
    /// creating a window.
    pub fn current_count(&self, key: &str, window: Duration) -> usize {
        match self.windows.get_mut(key) {
            Some(mut timestamps) => {
                purge_expired(&mut timestamps, window, Instant::now());
                timestamps.len()
            }
            None => 0,
        }
    }

    /// Distinct keys with a window
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

fn purge_expired(timestamps: &mut VecDeque<Instant>, window: Duration, now: Instant) {
    let Some(cutoff) = now.checked_sub(window) else {
        return;
    };

    while timestamps.front().is_some_and(|oldest| *oldest < cutoff) {
        timestamps.pop_front();
    }
}

/// Rejects calls once a key's sliding-window quota is used up
pub struct RateLimiterDecorator<O, F> {
    inner: O,
    config: RateLimiterConfig,
    key_fn: F,
    state: RateLimiterState,
    metrics: AtomicRateLimiterMetrics,
}

impl<O, F> RateLimiterDecorator<O, F>
where
    O: Operation,
    F: Fn(&O::Input) -> String + Send + Sync,
{
    /// Wrap `inner` with its own, unshared state
    pub fn new(inner: O, config: RateLimiterConfig, key_fn: F) -> Result<Self> {
        Self::with_state(inner, config, key_fn, RateLimiterState::new())
    }

    /// Wrap `inner` using an existing state handle
    ///
    /// Decorators built from clones of the same handle draw from one quota per key.
    pub fn with_state(
        inner: O,
        config: RateLimiterConfig,
        key_fn: F,
        state: RateLimiterState,
    ) -> Result<Self> {
        config.validate().map_err(PipelineError::Configuration)?;

        debug!(
            operation = %inner.identity(),
            max_requests = config.max_requests_per_window,
            window_ms = config.window.as_millis() as u64,
            "Rate limiter decorator initialized"
        );

        Ok(Self {
            inner,
            config,
            key_fn,
            state,
            metrics: AtomicRateLimiterMetrics::default(),
        })
    }
}

impl<O, F> RateLimiterDecorator<O, F> {
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Handle to this decorator's windows, for deliberate sharing
    pub fn state(&self) -> &RateLimiterState {
        &self.state
    }

    /// Calls recorded for `key` within the current window
    pub fn current_count(&self, key: &str) -> usize {
        self.state.current_count(key, self.config.window)
    }

    /// Get current metrics snapshot
    pub fn metrics(&self) -> RateLimiterMetrics {
        self.metrics.snapshot(self.state.tracked_keys())
    }
}

impl<O: fmt::Debug, F> fmt::Debug for RateLimiterDecorator<O, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiterDecorator")
            .field("inner", &self.inner)
            .field("config", &self.config)
            .field("tracked_keys", &self.state.tracked_keys())
            .finish()
    }
}

#[async_trait]
impl<O, F> Operation for RateLimiterDecorator<O, F>
where
    O: Operation,
    F: Fn(&O::Input) -> String + Send + Sync,
{
    type Input = O::Input;
    type Output = O::Output;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let key = (self.key_fn)(&input);
        let admission = self.state.try_acquire(
            &key,
            self.config.max_requests_per_window,
            self.config.window,
        );

        match admission {
            Admission::Admitted { count } => {
                self.metrics.record_admitted();
                debug!(
                    operation = %self.inner.identity(),
                    key = %key,
                    count = count,
                    limit = self.config.max_requests_per_window,
                    "Call admitted"
                );
                self.inner.execute(input).await
            }
            Admission::Rejected { retry_after } => {
                self.metrics.record_rejected();
                warn!(
                    operation = %self.inner.identity(),
                    key = %key,
                    limit = self.config.max_requests_per_window,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Rate limit exceeded"
                );
                Err(PipelineError::RateLimited {
                    key,
                    limit: self.config.max_requests_per_window,
                    window: self.config.window,
                    retry_after,
                })
            }
        }
    }

    fn identity(&self) -> &str {
        self.inner.identity()
    }

    fn describe(&self) -> String {
        format!(
            "{} + RateLimit({}/{:?})",
            self.inner.describe(),
            self.config.max_requests_per_window,
            self.config.window
        )
    }

    fn estimated_cost(&self) -> f64 {
        self.inner.estimated_cost()
    }
}

impl<O: Operation, F> Decorator for RateLimiterDecorator<O, F> {
    type Inner = O;

    fn inner(&self) -> &O {
        &self.inner
    }

    fn into_inner(self) -> O {
        self.inner
    }
}
