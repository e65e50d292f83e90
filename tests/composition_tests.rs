//! Stacking-order behavior across retry, rate limiting and caching

mod common;

use common::*;
use resilient_ops::{
    CacheConfig, Decorator, ErrorKind, Operation, OperationExt, RateLimiterConfig, RetryConfig,
};
use std::time::Duration;

fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(1),
        retry_cost_factor: 1.0,
    }
}

fn one_per_minute(max_requests: u32) -> RateLimiterConfig {
    RateLimiterConfig::new(max_requests, Duration::from_secs(60))
}

#[tokio::test(start_paused = true)]
async fn test_retry_outside_cache_caches_only_final_success() {
    init_test_logging();
    let flaky = FlakyOperation::failing_times(2);
    let counter = flaky.counter();

    let stack = flaky
        .with_cache(CacheConfig::default())
        .unwrap()
        .with_retry(fast_retry(3))
        .unwrap();

    assert_eq!(stack.execute("hello".to_string()).await.unwrap(), "HELLO");
    assert_eq!(calls(&counter), 3);
    assert_eq!(stack.last_attempt_count(), 3);

    let cache = stack.inner();
    assert_eq!(cache.size(), 1);
    assert_eq!(cache.stats().misses, 3);

    // A hit returns on the first attempt without touching the operation
    assert_eq!(stack.execute("hello".to_string()).await.unwrap(), "HELLO");
    assert_eq!(calls(&counter), 3);
    assert_eq!(stack.last_attempt_count(), 1);
    assert_eq!(stack.inner().stats().hits, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cache_outside_retry_caches_retried_result_as_one_unit() {
    let flaky = FlakyOperation::failing_times(2);
    let counter = flaky.counter();

    let stack = flaky
        .with_retry(fast_retry(3))
        .unwrap()
        .with_cache(CacheConfig::default())
        .unwrap();

    assert_eq!(stack.execute("hello".to_string()).await.unwrap(), "HELLO");
    assert_eq!(calls(&counter), 3);

    let stats = stack.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 1);
    assert_eq!(stack.inner().metrics().recovered_calls, 1);

    assert_eq!(stack.execute("hello".to_string()).await.unwrap(), "HELLO");
    assert_eq!(calls(&counter), 3);
    assert_eq!(stack.hit_ratio(), 0.5);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limiter_outside_cache_charges_quota_for_hits() {
    let doubler = CountingDoubler::new();
    let counter = doubler.counter();

    let stack = doubler
        .with_cache(CacheConfig::default())
        .unwrap()
        .with_rate_limit(one_per_minute(2), |_| "global".to_string())
        .unwrap();

    assert_eq!(stack.execute(4).await.unwrap(), 8); // miss
    assert_eq!(stack.execute(4).await.unwrap(), 8); // hit, still admitted

    let error = stack.execute(4).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::RateLimited);

    assert_eq!(calls(&counter), 1);
    assert_eq!(stack.metrics().admitted, 2);
    assert_eq!(stack.metrics().rejected, 1);
    assert_eq!(stack.inner().stats().hits, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cache_outside_rate_limiter_lets_hits_bypass_quota() {
    let doubler = CountingDoubler::new();
    let counter = doubler.counter();

    let stack = doubler
        .with_rate_limit(one_per_minute(1), |_| "global".to_string())
        .unwrap()
        .with_cache(CacheConfig::default())
        .unwrap();

    for _ in 0..5 {
        assert_eq!(stack.execute(4).await.unwrap(), 8);
    }
    assert_eq!(calls(&counter), 1);
    assert_eq!(stack.inner().metrics().admitted, 1);

    // A new input needs the limiter, whose quota is spent
    let error = stack.execute(5).await.unwrap_err();
    assert!(error.is_rate_limited());
    // Rejections are failures and are not cached
    assert_eq!(stack.size(), 1);

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(stack.execute(5).await.unwrap(), 10);
    assert_eq!(stack.size(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_are_never_cached() {
    let failing = FlakyOperation::always_failing();
    let counter = failing.counter();

    let stack = failing
        .with_retry(fast_retry(2))
        .unwrap()
        .with_cache(CacheConfig::default())
        .unwrap();

    for _ in 0..2 {
        let error = stack.execute("hello".to_string()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RetryExhausted);
        assert_eq!(error.root_cause().kind(), ErrorKind::OperationFailed);
    }

    assert_eq!(calls(&counter), 4);
    assert_eq!(stack.size(), 0);
    assert_eq!(stack.inner().metrics().exhausted_calls, 2);
}

#[tokio::test(start_paused = true)]
async fn test_retry_does_not_bypass_rate_limit_rejections() {
    let doubler = CountingDoubler::new();
    let counter = doubler.counter();

    let stack = doubler
        .with_rate_limit(one_per_minute(1), |n| format!("n:{n}"))
        .unwrap()
        .with_retry(fast_retry(3))
        .unwrap();

    assert_eq!(stack.execute(1).await.unwrap(), 2);

    // Every retry attempt is rejected inside the same window
    let error = stack.execute(1).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::RetryExhausted);
    assert!(error.root_cause().is_rate_limited());
    assert_eq!(calls(&counter), 1);
    assert_eq!(stack.inner().metrics().rejected, 3);
}

#[tokio::test]
async fn test_full_stack_describes_and_boxes() {
    let stack = CountingDoubler::new()
        .with_retry(RetryConfig::for_local_work())
        .unwrap()
        .with_cache(CacheConfig::lru(8, Duration::from_secs(60)))
        .unwrap()
        .with_rate_limit(one_per_minute(10), |n| n.to_string())
        .unwrap();

    let description = stack.describe();
    assert_eq!(description, stack.describe());
    assert!(description.starts_with("Double + Retry(max=2) + Cache(policy=LRU, size=0/8"));
    assert!(description.ends_with("RateLimit(10/60s)"));

    // Retry adds half the wrapped cost for its one extra attempt
    assert_eq!(stack.estimated_cost(), 1.5);
    assert_eq!(stack.identity(), "double");

    let boxed = stack.boxed();
    assert_eq!(boxed.execute(21).await.unwrap(), 42);
}
