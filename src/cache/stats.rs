//! Cache statistics

use super::EvictionPolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of a cache decorator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the store
    pub hits: u64,

    /// Lookups that ran the wrapped operation (including expired entries)
    pub misses: u64,

    /// Entries dropped to make room
    pub evictions: u64,

    /// Entries dropped because their TTL elapsed
    pub expirations: u64,

    /// Current occupancy
    pub size: usize,

    pub max_entries: usize,

    pub policy: EvictionPolicy,

    /// When this snapshot was taken
    pub collected_at: DateTime<Utc>,
}

impl CacheStats {
    /// `hits / (hits + misses)`, or 0.0 before the first lookup
    pub fn hit_ratio(&self) -> f64 {
        hit_ratio(self.hits, self.misses)
    }

    /// Format statistics for logging
    pub fn format_summary(&self) -> String {
        format!(
            "Policy: {} | Size: {}/{} | Hits: {} | Misses: {} | Hit ratio: {:.1}% | Evictions: {} | Expirations: {}",
            self.policy,
            self.size,
            self.max_entries,
            self.hits,
            self.misses,
            self.hit_ratio() * 100.0,
            self.evictions,
            self.expirations
        )
    }
}

pub(crate) fn hit_ratio(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        return 0.0;
    }

    hits as f64 / total as f64
}

/// Lifetime counters; never reset by `clear()`
#[derive(Debug, Default)]
pub(crate) struct AtomicCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl AtomicCacheStats {
    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn hit_ratio(&self) -> f64 {
        hit_ratio(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    pub(crate) fn snapshot(
        &self,
        size: usize,
        max_entries: usize,
        policy: EvictionPolicy,
    ) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            size,
            max_entries,
            policy,
            collected_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio_is_zero_without_lookups() {
        let stats = AtomicCacheStats::default();
        assert_eq!(stats.hit_ratio(), 0.0);
        assert_eq!(stats.snapshot(0, 10, EvictionPolicy::Lru).hit_ratio(), 0.0);
    }

    #[test]
    fn test_snapshot_and_summary() {
        let stats = AtomicCacheStats::default();
        stats.record_miss();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_eviction();
        stats.record_expirations(2);

        let snapshot = stats.snapshot(7, 10, EvictionPolicy::Fifo);
        assert_eq!(snapshot.hits, 3);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.evictions, 1);
        assert_eq!(snapshot.expirations, 2);
        assert_eq!(snapshot.hit_ratio(), 0.75);

        let summary = snapshot.format_summary();
        assert!(summary.contains("FIFO"));
        assert!(summary.contains("7/10"));
        assert!(summary.contains("75.0%"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = AtomicCacheStats::default().snapshot(0, 5, EvictionPolicy::Lfu);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["policy"], "lfu");
        assert_eq!(json["max_entries"], 5);
    }
}
