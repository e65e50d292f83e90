//! # Resilience Module
//!
//! Decorators that keep callers safe from failing or overloaded operations.
//!
//! ## Architecture
//!
//! - **Retry**: bounded re-invocation with exponential backoff between attempts
//! - **Rate Limiting**: per-key sliding-window quotas with explicit, shareable state
//! - **Metrics Collection**: atomic counters exposed as immutable snapshots
//! - **Configuration**: validated runtime settings with presets per use case
//!
//! ## Usage
//!
//! ```rust,no_run
//! use resilient_ops::operation::{FnOperation, Operation, OperationExt};
//! use resilient_ops::resilience::{RateLimiterConfig, RetryConfig};
//! use resilient_ops::PipelineError;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let send_email = FnOperation::new("send_email", |(to, body): (String, String)| async move {
//!     // SMTP delivery here
//!     Ok::<_, PipelineError>(format!("queued for {to}: {} bytes", body.len()))
//! });
//!
//! // Retries happen inside the quota: one admitted call may use several attempts
//! let protected = send_email
//!     .with_retry(RetryConfig::for_notifications())?
//!     .with_rate_limit(RateLimiterConfig::for_recipients(), |(to, _)| to.clone())?;
//!
//! match protected.execute(("ops@example.com".into(), "disk full".into())).await {
//!     Ok(receipt) => println!("{receipt}"),
//!     Err(e) if e.is_rate_limited() => println!("try again later: {e}"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod metrics;
pub mod rate_limiter;
pub mod retry;

pub use config::{RateLimiterConfig, RetryConfig};
pub use metrics::{RateLimiterMetrics, RetryMetrics};
pub use rate_limiter::{Admission, RateLimiterDecorator, RateLimiterState};
pub use retry::RetryDecorator;
