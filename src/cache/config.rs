//! Cache decorator configuration

use super::EvictionPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`CacheDecorator`](crate::cache::CacheDecorator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Store capacity; inserting past it evicts one entry
    pub max_entries: usize,

    /// Entries older than this are treated as misses and removed
    pub ttl: Duration,

    pub eviction_policy: EvictionPolicy,
}

impl CacheConfig {
    pub fn new(max_entries: usize, ttl: Duration, eviction_policy: EvictionPolicy) -> Self {
        Self {
            max_entries,
            ttl,
            eviction_policy,
        }
    }

    /// Small LRU cache
    pub fn lru(max_entries: usize, ttl: Duration) -> Self {
        Self::new(max_entries, ttl, EvictionPolicy::Lru)
    }

    /// Create configuration for text processing results (large, long-lived)
    pub fn for_text_processing() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
            eviction_policy: EvictionPolicy::Lfu,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }

        if self.ttl.is_zero() {
            return Err("ttl must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            ttl: Duration::from_secs(300),
            eviction_policy: EvictionPolicy::Lru,
        }
    }
}
