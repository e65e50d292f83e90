//! # Resilience Metrics
//!
//! Lock-free counters kept by the retry and rate limiting decorators, and the
//! immutable snapshots handed out on read. Snapshots are plain values, so
//! introspection never copies decorator state or blocks callers.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a retry decorator's counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryMetrics {
    /// Calls made through the decorator
    pub total_calls: u64,

    /// Invocations of the wrapped operation across all calls
    pub total_attempts: u64,

    /// Calls that succeeded after at least one failed attempt
    pub recovered_calls: u64,

    /// Calls that ended in `RetryExhausted`
    pub exhausted_calls: u64,
}

impl RetryMetrics {
    /// Average invocations of the wrapped operation per call
    pub fn attempts_per_call(&self) -> f64 {
        if self.total_calls == 0 {
            return 0.0;
        }

        self.total_attempts as f64 / self.total_calls as f64
    }

    /// Format metrics for logging
    pub fn format_summary(&self) -> String {
        format!(
            "Calls: {} | Attempts: {} | Recovered: {} | Exhausted: {} | Attempts/call: {:.2}",
            self.total_calls,
            self.total_attempts,
            self.recovered_calls,
            self.exhausted_calls,
            self.attempts_per_call()
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct AtomicRetryMetrics {
    total_calls: AtomicU64,
    total_attempts: AtomicU64,
    recovered_calls: AtomicU64,
    exhausted_calls: AtomicU64,
}

impl AtomicRetryMetrics {
    #[inline]
    pub(crate) fn record_success(&self, attempts: u32) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.total_attempts
            .fetch_add(u64::from(attempts), Ordering::Relaxed);
        if attempts > 1 {
            self.recovered_calls.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_exhausted(&self, attempts: u32) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.total_attempts
            .fetch_add(u64::from(attempts), Ordering::Relaxed);
        self.exhausted_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RetryMetrics {
        RetryMetrics {
            total_calls: self.total_calls.load(Ordering::Relaxed),
            total_attempts: self.total_attempts.load(Ordering::Relaxed),
            recovered_calls: self.recovered_calls.load(Ordering::Relaxed),
            exhausted_calls: self.exhausted_calls.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of a rate limiter decorator's counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateLimiterMetrics {
    /// Calls admitted and forwarded to the wrapped operation
    pub admitted: u64,

    /// Calls rejected with `RateLimited`
    pub rejected: u64,

    /// Distinct keys with tracked windows
    pub tracked_keys: usize,
}

impl RateLimiterMetrics {
    /// Share of calls rejected (0.0 to 1.0)
    pub fn rejection_rate(&self) -> f64 {
        let total = self.admitted + self.rejected;
        if total == 0 {
            return 0.0;
        }

        self.rejected as f64 / total as f64
    }
}

#[derive(Debug, Default)]
pub(crate) struct AtomicRateLimiterMetrics {
    admitted: AtomicU64,
    rejected: AtomicU64,
}

impl AtomicRateLimiterMetrics {
    #[inline]
    pub(crate) fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, tracked_keys: usize) -> RateLimiterMetrics {
        RateLimiterMetrics {
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            tracked_keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_snapshot() {
        let metrics = AtomicRetryMetrics::default();
        metrics.record_success(1);
        metrics.record_success(3);
        metrics.record_exhausted(4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_calls, 3);
        assert_eq!(snapshot.total_attempts, 8);
        assert_eq!(snapshot.recovered_calls, 1);
        assert_eq!(snapshot.exhausted_calls, 1);
        assert!((snapshot.attempts_per_call() - 8.0 / 3.0).abs() < f64::EPSILON);
        assert!(snapshot.format_summary().contains("Exhausted: 1"));
    }

    #[test]
    fn test_empty_metrics_have_zero_rates() {
        assert_eq!(RetryMetrics::default().attempts_per_call(), 0.0);
        assert_eq!(RateLimiterMetrics::default().rejection_rate(), 0.0);
    }

    #[test]
    fn test_rate_limiter_snapshot() {
        let metrics = AtomicRateLimiterMetrics::default();
        metrics.record_admitted();
        metrics.record_admitted();
        metrics.record_admitted();
        metrics.record_rejected();

        let snapshot = metrics.snapshot(2);
        assert_eq!(snapshot.admitted, 3);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.tracked_keys, 2);
        assert_eq!(snapshot.rejection_rate(), 0.25);
    }
}
