//! # Result Caching
//!
//! [`CacheDecorator`] memoizes successful results of an [`Operation`] keyed by
//! a [`Fingerprint`] of the operation identity and its input. Entries live in a
//! bounded [`CacheStore`] with a TTL and one of three eviction policies.
//!
//! Failures are never cached, and inputs that cannot be fingerprinted skip the
//! cache entirely rather than failing the call.
//!
//! ## Usage
//!
//! ```rust
//! use resilient_ops::cache::{CacheConfig, EvictionPolicy};
//! use resilient_ops::{FnOperation, Operation, OperationExt, PipelineError};
//! use std::time::Duration;
//!
//! # async fn example() -> resilient_ops::Result<()> {
//! let summarize = FnOperation::new("summarize", |text: String| async move {
//!     Ok::<_, PipelineError>(text.split_whitespace().count())
//! })
//! .with_cache(CacheConfig::new(500, Duration::from_secs(600), EvictionPolicy::Lfu))?;
//!
//! let words = summarize.execute("the quick brown fox".to_string()).await?;
//! assert_eq!(words, 4);
//! # Ok(())
//! # }
//! ```
//!
//! [`Operation`]: crate::Operation

mod canonical;
pub mod config;
pub mod decorator;
pub mod fingerprint;
pub mod policy;
pub mod stats;
pub mod store;

pub use config::CacheConfig;
pub use decorator::CacheDecorator;
pub use fingerprint::{Fingerprint, FingerprintError};
pub use policy::EvictionPolicy;
pub use stats::CacheStats;
pub use store::{CacheEntry, CacheStore, Lookup};
