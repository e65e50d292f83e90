//! # Cache Store
//!
//! Bounded map of fingerprints to cached values with TTL expiry and policy
//! driven eviction. The store is not synchronized; [`CacheDecorator`] keeps it
//! behind a mutex.
//!
//! Recency and insertion order are tracked with a logical clock rather than
//! timestamps, so entries created within the same clock tick still have a
//! strict order for LRU, FIFO and LFU tie-breaking.
//!
//! [`CacheDecorator`]: crate::cache::CacheDecorator

use super::{CacheConfig, EvictionPolicy, Fingerprint};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// A cached value with its access bookkeeping
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: Fingerprint,
    pub value: V,
    pub created_at: Instant,
    pub last_accessed_at: Instant,
    pub access_count: u64,
    inserted_seq: u64,
    accessed_seq: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

/// Result of a store lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    Hit(V),
    /// Entry existed but outlived its TTL; it has been removed
    Expired,
    Miss,
}

/// Bounded, policy-evicting entry store
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: HashMap<Fingerprint, CacheEntry<V>>,
    max_entries: usize,
    ttl: Duration,
    policy: EvictionPolicy,
    clock: u64,
}

impl<V: Clone> CacheStore<V> {
    /// Look up `key` at `now`, recording the access on a hit
    pub fn get(&mut self, key: &Fingerprint, now: Instant) -> Lookup<V> {
        let expired = match self.entries.get(key) {
            None => return Lookup::Miss,
            Some(entry) => entry.is_expired(self.ttl, now),
        };

        if expired {
            self.entries.remove(key);
            return Lookup::Expired;
        }

        let seq = self.tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_accessed_at = now;
                entry.access_count += 1;
                entry.accessed_seq = seq;
                Lookup::Hit(entry.value.clone())
            }
            None => Lookup::Miss,
        }
    }
}

impl<V> CacheStore<V> {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: config.max_entries,
            ttl: config.ttl,
            policy: config.eviction_policy,
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Insert or replace `key`, returning the evicted fingerprint if room had to be made
    ///
    /// A new key arriving at a full store evicts one existing entry chosen by the
    /// policy before it is stored, so the store never holds more than
    /// `max_entries` and the newcomer is never its own victim.
    pub fn insert(&mut self, key: Fingerprint, value: V, now: Instant) -> Option<Fingerprint> {
        let evicted = if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries
        {
            self.select_victim()
                .and_then(|victim| self.entries.remove(&victim))
                .map(|entry| entry.key)
        } else {
            None
        };

        let seq = self.tick();
        self.entries.insert(
            key.clone(),
            CacheEntry {
                key,
                value,
                created_at: now,
                last_accessed_at: now,
                access_count: 1,
                inserted_seq: seq,
                accessed_seq: seq,
            },
        );

        evicted
    }

    fn select_victim(&self) -> Option<Fingerprint> {
        let entries = self.entries.values();
        let victim = match self.policy {
            EvictionPolicy::Lru => entries.min_by_key(|entry| entry.accessed_seq),
            EvictionPolicy::Lfu => {
                entries.min_by_key(|entry| (entry.access_count, entry.inserted_seq))
            }
            EvictionPolicy::Fifo => entries.min_by_key(|entry| entry.inserted_seq),
        };

        victim.map(|entry| entry.key.clone())
    }

    pub fn remove(&mut self, key: &Fingerprint) -> Option<CacheEntry<V>> {
        self.entries.remove(key)
    }

    /// Drop every entry whose TTL has elapsed at `now`; returns how many were dropped
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| !entry.is_expired(ttl, now));
        before - self.entries.len()
    }

    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u32) -> Fingerprint {
        Fingerprint::compute("store_test", &n).unwrap()
    }

    fn store(max_entries: usize, policy: EvictionPolicy) -> CacheStore<u32> {
        CacheStore::new(&CacheConfig::new(
            max_entries,
            Duration::from_secs(60),
            policy,
        ))
    }

    #[test]
    fn test_lru_evicts_least_recently_touched() {
        let now = Instant::now();
        let mut store = store(2, EvictionPolicy::Lru);

        store.insert(key(1), 10, now);
        store.insert(key(2), 20, now);
        assert_eq!(store.get(&key(1), now), Lookup::Hit(10));

        let evicted = store.insert(key(3), 30, now);
        assert_eq!(evicted, Some(key(2)));
        assert!(store.contains(&key(1)));
        assert!(store.contains(&key(3)));
    }

    #[test]
    fn test_lfu_evicts_least_frequently_used() {
        let now = Instant::now();
        let mut store = store(3, EvictionPolicy::Lfu);

        store.insert(key(1), 10, now);
        store.insert(key(2), 20, now);
        store.insert(key(3), 30, now);
        store.get(&key(1), now);
        store.get(&key(1), now);
        store.get(&key(3), now);

        // key(2) was never read after insertion
        assert_eq!(store.insert(key(4), 40, now), Some(key(2)));
    }

    #[test]
    fn test_lfu_ties_go_to_oldest_insertion() {
        let now = Instant::now();
        let mut store = store(2, EvictionPolicy::Lfu);

        store.insert(key(1), 10, now);
        store.insert(key(2), 20, now);

        assert_eq!(store.insert(key(3), 30, now), Some(key(1)));
    }

    #[test]
    fn test_fifo_ignores_access_pattern() {
        let now = Instant::now();
        let mut store = store(2, EvictionPolicy::Fifo);

        store.insert(key(1), 10, now);
        store.insert(key(2), 20, now);
        for _ in 0..5 {
            store.get(&key(1), now);
        }

        assert_eq!(store.insert(key(3), 30, now), Some(key(1)));
    }

    #[test]
    fn test_expired_entry_is_removed_on_lookup() {
        let start = Instant::now();
        let mut store = store(4, EvictionPolicy::Lru);
        store.insert(key(1), 10, start);

        assert_eq!(
            store.get(&key(1), start + Duration::from_secs(59)),
            Lookup::Hit(10)
        );
        assert_eq!(
            store.get(&key(1), start + Duration::from_secs(60)),
            Lookup::Expired
        );
        assert!(store.is_empty());
        assert_eq!(store.get(&key(1), start), Lookup::Miss);
    }

    #[test]
    fn test_replacing_a_key_does_not_evict() {
        let now = Instant::now();
        let mut store = store(2, EvictionPolicy::Fifo);

        store.insert(key(1), 10, now);
        store.insert(key(2), 20, now);
        assert_eq!(store.insert(key(2), 21, now), None);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&key(2), now), Lookup::Hit(21));
    }

    #[test]
    fn test_purge_expired_and_hit_bookkeeping() {
        let start = Instant::now();
        let mut store = store(4, EvictionPolicy::Lru);
        store.insert(key(1), 10, start);
        store.insert(key(2), 20, start + Duration::from_secs(30));

        let later = start + Duration::from_secs(45);
        store.get(&key(2), later);
        let entry = store.remove(&key(2)).unwrap();
        assert_eq!(entry.access_count, 2);
        assert_eq!(entry.last_accessed_at, later);
        store.insert(key(2), 20, start + Duration::from_secs(30));

        assert_eq!(store.purge_expired(start + Duration::from_secs(61)), 1);
        assert!(!store.contains(&key(1)));
        assert!(store.contains(&key(2)));

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.max_entries(), 4);
        assert_eq!(store.policy(), EvictionPolicy::Lru);
    }
}
