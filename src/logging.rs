//! # Structured Logging Module
//!
//! Environment-aware structured logging for the decorators' tracing events.
//!
//! The level comes from the detected environment unless `PIPELINE_LOG_LEVEL`
//! (any `EnvFilter` directive) is set. `PIPELINE_LOG_FORMAT=json` switches the
//! console output to JSON lines.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let json = use_json_format();

        let console = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .json()
                .with_filter(EnvFilter::new(&log_level))
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(EnvFilter::new(&log_level))
                .boxed()
        };

        // A global subscriber may already exist (host application, test harness)
        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
            return;
        }

        tracing::info!(
            environment = %environment,
            log_level = %log_level,
            json = json,
            "Structured logging initialized"
        );
    });
}

/// Reads one process environment variable
fn process_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Get current environment from environment variables
fn get_environment() -> String {
    resolve_environment(process_var)
}

/// Get log level, honoring an explicit `PIPELINE_LOG_LEVEL`
fn get_log_level(environment: &str) -> String {
    resolve_log_level(environment, process_var)
}

fn use_json_format() -> bool {
    resolve_json_format(process_var)
}

/// `PIPELINE_ENV`, then `APP_ENV`, then "development"
fn resolve_environment(var: impl Fn(&str) -> Option<String>) -> String {
    var("PIPELINE_ENV")
        .or_else(|| var("APP_ENV"))
        .unwrap_or_else(|| "development".to_string())
}

fn resolve_log_level(environment: &str, var: impl Fn(&str) -> Option<String>) -> String {
    var("PIPELINE_LOG_LEVEL").unwrap_or_else(|| default_log_level(environment).to_string())
}

fn resolve_json_format(var: impl Fn(&str) -> Option<String>) -> bool {
    var("PIPELINE_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "test" | "development" => "debug",
        _ => "debug",
    }
}
