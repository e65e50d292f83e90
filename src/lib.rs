#![allow(clippy::doc_markdown)] // Allow technical terms like LRU, TTL, SHA-256 in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Resilient Ops
//!
//! Composable decorators that add retries, per-key rate limiting and result
//! caching to any asynchronous operation.
//!
//! ## Overview
//!
//! Callers wrap a base [`Operation`] (send a notification, transform text,
//! render a report) in decorators. Every decorator is itself an `Operation`,
//! so stacks are built by nesting and the caller chooses the order.
//!
//! ## Module Organization
//!
//! - [`operation`] - The operation contract, closure adapter and fluent composition
//! - [`resilience`] - Retry with exponential backoff and sliding-window rate limiting
//! - [`cache`] - Fingerprinted result cache with LRU, LFU and FIFO eviction
//! - [`config`] - YAML + environment configuration for the decorators
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resilient_ops::cache::CacheConfig;
//! use resilient_ops::resilience::{RateLimiterConfig, RetryConfig};
//! use resilient_ops::{FnOperation, Operation, OperationExt, PipelineError};
//!
//! # async fn example() -> resilient_ops::Result<()> {
//! resilient_ops::logging::init_structured_logging();
//!
//! let render = FnOperation::new("render_report", |name: String| async move {
//!     Ok::<_, PipelineError>(format!("<h1>{name}</h1>"))
//! });
//!
//! let pipeline = render
//!     .with_retry(RetryConfig::default())?
//!     .with_cache(CacheConfig::default())?
//!     .with_rate_limit(RateLimiterConfig::new(10, std::time::Duration::from_secs(1)), |name| {
//!         name.clone()
//!     })?;
//!
//! let html = pipeline.execute("weekly".to_string()).await?;
//! println!("{html} via {}", pipeline.describe());
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Time-dependent behavior runs on the Tokio clock, so tests use paused time:
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests, including composition and property tests
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod operation;
pub mod resilience;

pub use cache::{
    CacheConfig, CacheDecorator, CacheStats, EvictionPolicy, Fingerprint, FingerprintError,
};
pub use config::{ConfigManager, ConfigurationError, PipelineConfig};
pub use error::{BoxError, ErrorKind, PipelineError, Result};
pub use operation::{BoxOperation, Decorator, FnOperation, Operation, OperationExt};
pub use resilience::{
    RateLimiterConfig, RateLimiterDecorator, RateLimiterState, RetryConfig, RetryDecorator,
};
