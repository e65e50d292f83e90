//! Stub operations with call counters for decorator tests

use async_trait::async_trait;
use resilient_ops::{Operation, PipelineError, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Returns `input * 2` and counts invocations
#[derive(Debug, Clone, Default)]
pub struct CountingDoubler {
    calls: Arc<AtomicU32>,
}

impl CountingDoubler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that keeps counting after the stub is moved into a stack
    pub fn counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Operation for CountingDoubler {
    type Input = u64;
    type Output = u64;

    async fn execute(&self, input: u64) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(input * 2)
    }

    fn identity(&self) -> &str {
        "double"
    }

    fn describe(&self) -> String {
        "Double".to_string()
    }

    fn estimated_cost(&self) -> f64 {
        1.0
    }
}

/// Fails a scripted number of times, then echoes its input upper-cased
#[derive(Debug, Clone)]
pub struct FlakyOperation {
    failures_before_success: u32,
    calls: Arc<AtomicU32>,
}

impl FlakyOperation {
    pub fn failing_times(failures_before_success: u32) -> Self {
        Self {
            failures_before_success,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn always_failing() -> Self {
        Self::failing_times(u32::MAX)
    }

    pub fn counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Operation for FlakyOperation {
    type Input = String;
    type Output = String;

    async fn execute(&self, input: String) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures_before_success {
            return Err(PipelineError::operation_failed(
                self.identity(),
                format!("transient failure on call {call}"),
            ));
        }

        Ok(input.to_uppercase())
    }

    fn identity(&self) -> &str {
        "flaky_uppercase"
    }

    fn describe(&self) -> String {
        "FlakyUppercase".to_string()
    }

    fn estimated_cost(&self) -> f64 {
        2.0
    }
}

pub fn calls(counter: &Arc<AtomicU32>) -> u32 {
    counter.load(Ordering::SeqCst)
}
