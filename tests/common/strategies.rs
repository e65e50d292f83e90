//! Proptest strategies for cache and rate limiter properties

use proptest::prelude::*;
use resilient_ops::EvictionPolicy;

pub fn eviction_policy_strategy() -> impl Strategy<Value = EvictionPolicy> {
    prop_oneof![
        Just(EvictionPolicy::Lru),
        Just(EvictionPolicy::Lfu),
        Just(EvictionPolicy::Fifo),
    ]
}

/// Sequence of keys drawn from a small space so repeats (hits) are common
pub fn access_pattern_strategy() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(0u16..32, 1..200)
}

/// Gaps in milliseconds between successive calls
pub fn call_gaps_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..400, 1..120)
}
