//! # Retry Decorator
//!
//! Re-invokes the wrapped operation on failure with exponential backoff.
//!
//! Each call runs a small state machine:
//!
//! ```text
//! ATTEMPTING ──ok──────────────────────────▶ SUCCESS
//!     │
//!     └─err─▶ attempt < max ──▶ RETRYING (sleep) ──▶ ATTEMPTING
//!             attempt == max ─▶ EXHAUSTED (RetryExhausted)
//! ```
//!
//! The backoff sleep is the only suspension point and only parks the calling
//! task. At most `max_attempts` invocations of the wrapped operation happen per
//! call.

use crate::error::{PipelineError, Result};
use crate::operation::{Decorator, Operation};
use crate::resilience::metrics::AtomicRetryMetrics;
use crate::resilience::{RetryConfig, RetryMetrics};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};

/// Transient per-call retry bookkeeping
#[derive(Debug, Default)]
struct RetryState {
    attempt: u32,
    last_error: Option<PipelineError>,
}

impl RetryState {
    fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    fn record_failure(&mut self, error: PipelineError) {
        self.last_error = Some(error);
    }

    fn into_exhausted(self, operation: &str) -> PipelineError {
        let last_error = self.last_error.unwrap_or_else(|| {
            PipelineError::operation_failed(operation, "no attempt was recorded")
        });

        PipelineError::RetryExhausted {
            operation: operation.to_string(),
            attempts: self.attempt,
            last_error: Box::new(last_error),
        }
    }
}

/// Retries the wrapped operation with exponential backoff
#[derive(Debug)]
pub struct RetryDecorator<O> {
    inner: O,
    config: RetryConfig,
    last_attempt_count: AtomicU32,
    metrics: AtomicRetryMetrics,
}

impl<O> RetryDecorator<O>
where
    O: Operation,
    O::Input: Clone + Sync,
{
    /// Wrap `inner`, validating `config`
    pub fn new(inner: O, config: RetryConfig) -> Result<Self> {
        config.validate().map_err(PipelineError::Configuration)?;

        debug!(
            operation = %inner.identity(),
            max_attempts = config.max_attempts,
            base_delay_ms = config.base_delay.as_millis() as u64,
            "Retry decorator initialized"
        );

        Ok(Self {
            inner,
            config,
            last_attempt_count: AtomicU32::new(0),
            metrics: AtomicRetryMetrics::default(),
        })
    }
}

impl<O> RetryDecorator<O> {
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Invocations used by the most recently finished call (0 before any call)
    pub fn last_attempt_count(&self) -> u32 {
        self.last_attempt_count.load(Ordering::Relaxed)
    }

    /// Get current metrics snapshot
    pub fn metrics(&self) -> RetryMetrics {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl<O> Operation for RetryDecorator<O>
where
    O: Operation,
    O::Input: Clone + Sync,
{
    type Input = O::Input;
    type Output = O::Output;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let mut state = RetryState::default();

        loop {
            let attempt = state.begin_attempt();

            match self.inner.execute(input.clone()).await {
                Ok(output) => {
                    self.last_attempt_count.store(attempt, Ordering::Relaxed);
                    self.metrics.record_success(attempt);

                    if attempt > 1 {
                        info!(
                            operation = %self.inner.identity(),
                            attempt = attempt,
                            max_attempts = self.config.max_attempts,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(output);
                }
                Err(error) if attempt >= self.config.max_attempts => {
                    self.last_attempt_count.store(attempt, Ordering::Relaxed);
                    self.metrics.record_exhausted(attempt);

                    warn!(
                        operation = %self.inner.identity(),
                        attempts = attempt,
                        error = %error,
                        "Retry budget exhausted"
                    );
                    state.record_failure(error);
                    return Err(state.into_exhausted(self.inner.identity()));
                }
                Err(error) => {
                    let delay = self.config.delay_for_attempt(attempt);
                    debug!(
                        operation = %self.inner.identity(),
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Attempt failed, backing off"
                    );

                    state.record_failure(error);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn identity(&self) -> &str {
        self.inner.identity()
    }

    fn describe(&self) -> String {
        format!(
            "{} + Retry(max={})",
            self.inner.describe(),
            self.config.max_attempts
        )
    }

    fn estimated_cost(&self) -> f64 {
        self.config.worst_case_cost(self.inner.estimated_cost())
    }
}

impl<O: Operation> Decorator for RetryDecorator<O> {
    type Inner = O;

    fn inner(&self) -> &O {
        &self.inner
    }

    fn into_inner(self) -> O {
        self.inner
    }
}
