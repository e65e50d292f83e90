//! # Pipeline Errors
//!
//! Typed failures surfaced by the decoration pipeline. Callers branch on
//! [`ErrorKind`] to tell "try again later" ([`PipelineError::RateLimited`]) apart
//! from "gave up after N attempts" ([`PipelineError::RetryExhausted`]) and
//! "underlying failure" ([`PipelineError::OperationFailed`]).

use std::time::Duration;
use thiserror::Error;

/// Boxed error produced by a wrapped operation
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by operations and the decorators around them
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The wrapped operation itself failed
    #[error("Operation '{operation}' failed: {source}")]
    OperationFailed {
        operation: String,
        #[source]
        source: BoxError,
    },

    /// Retry budget consumed without a success
    #[error("Operation '{operation}' gave up after {attempts} attempts: {last_error}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        #[source]
        last_error: Box<PipelineError>,
    },

    /// Quota exceeded for the call's key; the wrapped operation was not invoked
    #[error("Rate limit exceeded for key '{key}': {limit} requests per {window:?} (retry after {retry_after:?})")]
    RateLimited {
        key: String,
        limit: u32,
        window: Duration,
        retry_after: Duration,
    },

    /// Decorator or file configuration is invalid
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Fieldless classification of a [`PipelineError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OperationFailed,
    RetryExhausted,
    RateLimited,
    Configuration,
}

impl PipelineError {
    /// Wrap an error raised by the operation identified by `operation`
    pub fn operation_failed(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        PipelineError::OperationFailed {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::OperationFailed { .. } => ErrorKind::OperationFailed,
            PipelineError::RetryExhausted { .. } => ErrorKind::RetryExhausted,
            PipelineError::RateLimited { .. } => ErrorKind::RateLimited,
            PipelineError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind() == ErrorKind::RateLimited
    }

    /// Innermost error, following `RetryExhausted` wrappers
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            PipelineError::RetryExhausted { last_error, .. } => last_error.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
