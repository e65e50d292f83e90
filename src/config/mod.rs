//! # Pipeline Configuration
//!
//! File-backed settings for the decorators. Sections use file-friendly units
//! (milliseconds, seconds) and convert into the runtime configuration types
//! consumed by [`RetryDecorator`], [`RateLimiterDecorator`] and [`CacheDecorator`].
//!
//! ## Example
//!
//! ```yaml
//! retry:
//!   max_attempts: 4
//!   base_delay_ms: 250
//! rate_limit:
//!   max_requests_per_window: 5
//!   window_seconds: 60
//! cache:
//!   max_entries: 2000
//!   ttl_seconds: 900
//!   eviction_policy: lfu
//! ```
//!
//! ```rust,no_run
//! use resilient_ops::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let retry = manager.config().retry.to_retry_config();
//! # Ok(())
//! # }
//! ```
//!
//! [`RetryDecorator`]: crate::resilience::RetryDecorator
//! [`RateLimiterDecorator`]: crate::resilience::RateLimiterDecorator
//! [`CacheDecorator`]: crate::cache::CacheDecorator

pub mod error;
pub mod loader;

use crate::cache::{CacheConfig, EvictionPolicy};
use crate::resilience::{RateLimiterConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub retry: RetryComponentConfig,
    pub rate_limit: RateLimitComponentConfig,
    pub cache: CacheComponentConfig,
}

impl PipelineConfig {
    /// Validate every section, reporting the first failure with its section name
    pub fn validate(&self) -> ConfigResult<()> {
        self.retry
            .to_retry_config()
            .validate()
            .map_err(|e| ConfigurationError::validation_error(format!("retry: {e}")))?;

        self.rate_limit
            .to_rate_limiter_config()
            .validate()
            .map_err(|e| ConfigurationError::validation_error(format!("rate_limit: {e}")))?;

        self.cache
            .to_cache_config()
            .validate()
            .map_err(|e| ConfigurationError::validation_error(format!("cache: {e}")))?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryComponentConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub retry_cost_factor: f64,
}

impl RetryComponentConfig {
    /// Convert to the retry decorator's format
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            retry_cost_factor: self.retry_cost_factor,
        }
    }
}

impl Default for RetryComponentConfig {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            base_delay_ms: defaults.base_delay.as_millis() as u64,
            max_delay_ms: defaults.max_delay.as_millis() as u64,
            retry_cost_factor: defaults.retry_cost_factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitComponentConfig {
    pub max_requests_per_window: u32,
    pub window_seconds: u64,
}

impl RateLimitComponentConfig {
    /// Convert to the rate limiter decorator's format
    pub fn to_rate_limiter_config(&self) -> RateLimiterConfig {
        RateLimiterConfig::new(
            self.max_requests_per_window,
            Duration::from_secs(self.window_seconds),
        )
    }
}

impl Default for RateLimitComponentConfig {
    fn default() -> Self {
        let defaults = RateLimiterConfig::default();
        Self {
            max_requests_per_window: defaults.max_requests_per_window,
            window_seconds: defaults.window.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheComponentConfig {
    pub max_entries: usize,
    pub ttl_seconds: u64,
    pub eviction_policy: EvictionPolicy,
}

impl CacheComponentConfig {
    /// Convert to the cache decorator's format
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig::new(
            self.max_entries,
            Duration::from_secs(self.ttl_seconds),
            self.eviction_policy,
        )
    }
}

impl Default for CacheComponentConfig {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            max_entries: defaults.max_entries,
            ttl_seconds: defaults.ttl.as_secs(),
            eviction_policy: defaults.eviction_policy,
        }
    }
}
