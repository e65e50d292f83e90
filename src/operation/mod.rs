//! # Operation Contract
//!
//! The atomic unit of work the pipeline decorates, plus the helpers used to
//! build and compose decorator stacks.
//!
//! ## Architecture
//!
//! ```text
//! RateLimiterDecorator       <- outermost: receives the call first
//!   └── CacheDecorator
//!         └── RetryDecorator
//!               └── FnOperation  <- base operation (send, transform, render)
//! ```
//!
//! Every layer implements [`Operation`], so any layer can be wrapped again.
//! Each decorator owns the layer directly inside it; there is no shared
//! ownership and no cycles. Stacking order is chosen by the caller and changes
//! observable behavior:
//!
//! - `Retry(Cache(op))`: hits skip the retry machinery; only the final success is cached
//! - `Cache(Retry(op))`: a result obtained after N attempts is cached as one unit
//! - `RateLimiter(Cache(op))`: cache hits still consume quota
//! - `Cache(RateLimiter(op))`: cache hits bypass the limiter entirely
//!
//! Failures are never cached in any order.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use resilient_ops::operation::{FnOperation, Operation, OperationExt};
//! use resilient_ops::resilience::RetryConfig;
//! use resilient_ops::cache::CacheConfig;
//!
//! # async fn example() -> resilient_ops::Result<()> {
//! let uppercase = FnOperation::new("uppercase", |text: String| async move {
//!     Ok::<_, resilient_ops::PipelineError>(text.to_uppercase())
//! })
//! .with_description("Uppercase text")
//! .with_cost(1.0);
//!
//! let pipeline = uppercase
//!     .with_retry(RetryConfig::for_local_work())?
//!     .with_cache(CacheConfig::default())?;
//!
//! let shouted = pipeline.execute("hello".to_string()).await?;
//! assert_eq!(shouted, "HELLO");
//! println!("{}", pipeline.describe());
//! # Ok(())
//! # }
//! ```

mod function;

pub use function::FnOperation;

use crate::cache::{CacheConfig, CacheDecorator};
use crate::error::Result;
use crate::resilience::{RateLimiterConfig, RateLimiterDecorator, RetryConfig, RetryDecorator};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// An executable unit of work with a stable identity
///
/// Implementations hold no mutable state from the pipeline's perspective:
/// the same input is expected to yield the same output.
#[async_trait]
pub trait Operation: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Run the operation. All failures are reported through the error channel.
    async fn execute(&self, input: Self::Input) -> Result<Self::Output>;

    /// Stable identity used to namespace cache fingerprints
    fn identity(&self) -> &str;

    /// Human-readable description. Decorators append their own suffix, so the
    /// description of a stack reads inner-to-outer.
    fn describe(&self) -> String;

    /// Static cost estimate used for monitoring
    fn estimated_cost(&self) -> f64;
}

/// Type-erased operation
pub type BoxOperation<I, O> = Box<dyn Operation<Input = I, Output = O>>;

#[async_trait]
impl<T> Operation for Box<T>
where
    T: Operation + ?Sized,
{
    type Input = T::Input;
    type Output = T::Output;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        (**self).execute(input).await
    }

    fn identity(&self) -> &str {
        (**self).identity()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn estimated_cost(&self) -> f64 {
        (**self).estimated_cost()
    }
}

#[async_trait]
impl<T> Operation for Arc<T>
where
    T: Operation + ?Sized,
{
    type Input = T::Input;
    type Output = T::Output;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        (**self).execute(input).await
    }

    fn identity(&self) -> &str {
        (**self).identity()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn estimated_cost(&self) -> f64 {
        (**self).estimated_cost()
    }
}

/// A layer that wraps exactly one inner operation
pub trait Decorator {
    type Inner: Operation;

    /// The next layer inward
    fn inner(&self) -> &Self::Inner;

    /// Unwrap this layer, discarding its state
    fn into_inner(self) -> Self::Inner;
}

/// Fluent construction of decorator stacks
///
/// Each method wraps `self` in one more layer. Construction validates the
/// decorator's configuration and fails with `PipelineError::Configuration`.
pub trait OperationExt: Operation + Sized {
    /// Wrap in a [`RetryDecorator`]
    fn with_retry(self, config: RetryConfig) -> Result<RetryDecorator<Self>>
    where
        Self::Input: Clone + Sync,
    {
        RetryDecorator::new(self, config)
    }

    /// Wrap in a [`RateLimiterDecorator`] keyed by `key_fn`
    fn with_rate_limit<F>(
        self,
        config: RateLimiterConfig,
        key_fn: F,
    ) -> Result<RateLimiterDecorator<Self, F>>
    where
        F: Fn(&Self::Input) -> String + Send + Sync,
    {
        RateLimiterDecorator::new(self, config, key_fn)
    }

    /// Wrap in a [`CacheDecorator`]
    fn with_cache(self, config: CacheConfig) -> Result<CacheDecorator<Self>>
    where
        Self::Input: Serialize + Sync,
        Self::Output: Clone,
    {
        CacheDecorator::new(self, config)
    }

    /// Erase the concrete stack type
    fn boxed(self) -> BoxOperation<Self::Input, Self::Output>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<T: Operation> OperationExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn doubler() -> impl Operation<Input = u64, Output = u64> {
        FnOperation::new("doubler", |n: u64| async move { Ok::<_, PipelineError>(n * 2) })
            .with_description("Double a number")
            .with_cost(2.5)
    }

    #[tokio::test]
    async fn test_boxed_operation_forwards_contract() {
        let op = doubler().boxed();

        assert_eq!(op.execute(21).await.unwrap(), 42);
        assert_eq!(op.identity(), "doubler");
        assert_eq!(op.describe(), "Double a number");
        assert_eq!(op.estimated_cost(), 2.5);
    }

    #[tokio::test]
    async fn test_arc_operation_is_shareable() {
        let op = Arc::new(doubler());
        let shared = Arc::clone(&op);

        let handle = tokio::spawn(async move { shared.execute(5).await });
        assert_eq!(handle.await.unwrap().unwrap(), 10);
        assert_eq!(op.execute(7).await.unwrap(), 14);
    }

    #[tokio::test]
    async fn test_fluent_stack_describes_inner_to_outer() {
        let stack = doubler()
            .with_retry(RetryConfig::for_local_work())
            .unwrap()
            .with_cache(CacheConfig::default())
            .unwrap();

        let description = stack.describe();
        let retry_at = description.find("Retry(").unwrap();
        let cache_at = description.find("Cache(").unwrap();
        assert!(description.starts_with("Double a number"));
        assert!(retry_at < cache_at);

        assert_eq!(stack.identity(), "doubler");
        assert_eq!(stack.inner().inner().identity(), "doubler");
    }

    #[tokio::test]
    async fn test_invalid_configuration_is_rejected_at_construction() {
        let config = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };

        let result = doubler().with_retry(config);
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }
}
