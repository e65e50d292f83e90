//! # Resilience Configuration
//!
//! Runtime configuration structures and validation for the retry and rate
//! limiting decorators.
//!
//! **Note**: These are the in-process settings handed to decorator
//! constructors. For file-based configuration use `crate::config::PipelineConfig`,
//! which converts into these types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`RetryDecorator`](crate::resilience::RetryDecorator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total invocations allowed per call, including the first
    pub max_attempts: u32,

    /// Wait before the second attempt; doubles for each attempt after that
    pub base_delay: Duration,

    /// Upper bound on any single backoff wait
    pub max_delay: Duration,

    /// Share of the wrapped cost each extra attempt adds to the cost estimate
    pub retry_cost_factor: f64,
}

impl RetryConfig {
    /// Create configuration for outbound notification delivery
    pub fn for_notifications() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            retry_cost_factor: 1.0,
        }
    }

    /// Create configuration for cheap in-process work
    pub fn for_local_work() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            retry_cost_factor: 0.5,
        }
    }

    /// Backoff wait after failed attempt `attempt` (1-based)
    ///
    /// `base_delay * 2^(attempt - 1)`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(multiplier)
            .min(self.max_delay)
    }

    /// Worst-case cost of one call given the wrapped operation's cost
    pub fn worst_case_cost(&self, wrapped_cost: f64) -> f64 {
        let extra_attempts = self.max_attempts.saturating_sub(1) as f64;
        wrapped_cost * (1.0 + extra_attempts * self.retry_cost_factor)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }

        if self.max_attempts > 100 {
            return Err("max_attempts should not exceed 100".to_string());
        }

        if self.base_delay.is_zero() {
            return Err("base_delay must be greater than 0".to_string());
        }

        if self.max_delay < self.base_delay {
            return Err("max_delay must not be shorter than base_delay".to_string());
        }

        if !self.retry_cost_factor.is_finite() || self.retry_cost_factor < 0.0 {
            return Err("retry_cost_factor must be a non-negative number".to_string());
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(300), // 5 minutes
            retry_cost_factor: 1.0,
        }
    }
}

/// Configuration for a [`RateLimiterDecorator`](crate::resilience::RateLimiterDecorator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Calls admitted per key within any window
    pub max_requests_per_window: u32,

    /// Length of the sliding window
    pub window: Duration,
}

impl RateLimiterConfig {
    pub fn new(max_requests_per_window: u32, window: Duration) -> Self {
        Self {
            max_requests_per_window,
            window,
        }
    }

    /// Create configuration for per-recipient message delivery
    pub fn for_recipients() -> Self {
        Self {
            max_requests_per_window: 5,
            window: Duration::from_secs(60),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.max_requests_per_window == 0 {
            return Err("max_requests_per_window must be greater than 0".to_string());
        }

        if self.window.is_zero() {
            return Err("window must be greater than 0".to_string());
        }

        if self.window > Duration::from_secs(86_400) {
            return Err("window should not exceed 24 hours".to_string());
        }

        Ok(())
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests_per_window: 100,
            window: Duration::from_secs(60),
        }
    }
}
