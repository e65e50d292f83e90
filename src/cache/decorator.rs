//! # Cache Decorator
//!
//! Memoizes successful results of the wrapped operation by input fingerprint.
//!
//! ## Concurrency
//!
//! The store sits behind a short-lived `parking_lot` mutex that is never held
//! across an await. Lookup-or-insert for a single fingerprint is serialized by a
//! per-fingerprint async lock, so concurrent misses on the same input run the
//! wrapped operation once while other fingerprints proceed independently.

use super::stats::AtomicCacheStats;
use super::store::{CacheStore, Lookup};
use super::{CacheConfig, CacheStats, Fingerprint};
use crate::error::{PipelineError, Result};
use crate::operation::{Decorator, Operation};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Caches successful results of the wrapped operation
pub struct CacheDecorator<O: Operation> {
    inner: O,
    config: CacheConfig,
    store: Mutex<CacheStore<O::Output>>,
    in_flight: InFlight,
    stats: AtomicCacheStats,
}

impl<O> CacheDecorator<O>
where
    O: Operation,
    O::Input: Serialize + Sync,
    O::Output: Clone,
{
    /// Wrap `inner`, validating `config`
    pub fn new(inner: O, config: CacheConfig) -> Result<Self> {
        config.validate().map_err(PipelineError::Configuration)?;

        debug!(
            operation = %inner.identity(),
            max_entries = config.max_entries,
            ttl_seconds = config.ttl.as_secs(),
            policy = %config.eviction_policy,
            "Cache decorator initialized"
        );

        Ok(Self {
            store: Mutex::new(CacheStore::new(&config)),
            inner,
            config,
            in_flight: DashMap::new(),
            stats: AtomicCacheStats::default(),
        })
    }

    /// Drop the cached result for `input`, if any
    pub fn invalidate(&self, input: &O::Input) -> bool {
        match Fingerprint::compute(self.inner.identity(), input) {
            Ok(fingerprint) => self.store.lock().remove(&fingerprint).is_some(),
            Err(_) => false,
        }
    }

    /// Look up a live entry, recording a hit or an expiration
    fn lookup(&self, fingerprint: &Fingerprint) -> Option<O::Output> {
        let lookup = self.store.lock().get(fingerprint, Instant::now());

        match lookup {
            Lookup::Hit(value) => {
                self.stats.record_hit();
                debug!(
                    operation = %self.inner.identity(),
                    fingerprint = %fingerprint.short(),
                    "Cache HIT"
                );
                Some(value)
            }
            Lookup::Expired => {
                self.stats.record_expirations(1);
                debug!(
                    operation = %self.inner.identity(),
                    fingerprint = %fingerprint.short(),
                    "Cache entry expired"
                );
                None
            }
            Lookup::Miss => None,
        }
    }

    fn store_value(&self, fingerprint: Fingerprint, value: O::Output) {
        let evicted = self
            .store
            .lock()
            .insert(fingerprint, value, Instant::now());

        if let Some(victim) = evicted {
            self.stats.record_eviction();
            debug!(
                operation = %self.inner.identity(),
                evicted = %victim.short(),
                policy = %self.config.eviction_policy,
                "Cache entry evicted"
            );
        }
    }
}

type InFlight = DashMap<Fingerprint, Arc<AsyncMutex<()>>>;

/// Handle on the per-fingerprint lock
///
/// Dropping the last handle removes the map entry, whether the call finished or
/// its future was dropped mid-flight.
struct InFlightSlot<'a> {
    slots: &'a InFlight,
    fingerprint: &'a Fingerprint,
    lock: Arc<AsyncMutex<()>>,
}

impl<'a> InFlightSlot<'a> {
    fn join(slots: &'a InFlight, fingerprint: &'a Fingerprint) -> Self {
        let lock = Arc::clone(&slots.entry(fingerprint.clone()).or_default());
        Self {
            slots,
            fingerprint,
            lock,
        }
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        // Only the map and this handle left: nobody else is waiting
        self.slots.remove_if(self.fingerprint, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

impl<O: Operation> CacheDecorator<O> {
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Lifetime `hits / (hits + misses)`; 0.0 before the first call
    pub fn hit_ratio(&self) -> f64 {
        self.stats.hit_ratio()
    }

    /// Entries currently stored
    pub fn size(&self) -> usize {
        self.store.lock().len()
    }

    /// Remove every entry; lifetime counters are kept
    pub fn clear(&self) {
        self.store.lock().clear();
        debug!(operation = %self.inner.identity(), "Cache cleared");
    }

    /// Remove entries whose TTL has elapsed; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let purged = self.store.lock().purge_expired(Instant::now());
        self.stats.record_expirations(purged as u64);
        purged
    }

    /// Get current statistics snapshot
    pub fn stats(&self) -> CacheStats {
        let store = self.store.lock();
        self.stats
            .snapshot(store.len(), store.max_entries(), store.policy())
    }
}

impl<O> fmt::Debug for CacheDecorator<O>
where
    O: Operation + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheDecorator")
            .field("inner", &self.inner)
            .field("config", &self.config)
            .field("size", &self.size())
            .field("hit_ratio", &self.hit_ratio())
            .finish()
    }
}

#[async_trait]
impl<O> Operation for CacheDecorator<O>
where
    O: Operation,
    O::Input: Serialize + Sync,
    O::Output: Clone,
{
    type Input = O::Input;
    type Output = O::Output;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let fingerprint = match Fingerprint::compute(self.inner.identity(), &input) {
            Ok(fingerprint) => fingerprint,
            Err(error) => {
                warn!(
                    operation = %self.inner.identity(),
                    error = %error,
                    "Input cannot be fingerprinted, bypassing cache"
                );
                return self.inner.execute(input).await;
            }
        };

        if let Some(value) = self.lookup(&fingerprint) {
            return Ok(value);
        }

        // Declared before the guard so the lock is released before the slot
        let slot = InFlightSlot::join(&self.in_flight, &fingerprint);
        let _guard = slot.lock.lock().await;

        // Another caller may have filled the entry while we waited
        if let Some(value) = self.lookup(&fingerprint) {
            return Ok(value);
        }

        self.stats.record_miss();
        debug!(
            operation = %self.inner.identity(),
            fingerprint = %fingerprint.short(),
            "Cache MISS"
        );

        let output = self.inner.execute(input).await?;
        self.store_value(fingerprint.clone(), output.clone());
        Ok(output)
    }

    fn identity(&self) -> &str {
        self.inner.identity()
    }

    fn describe(&self) -> String {
        let stats = self.stats();
        format!(
            "{} + Cache(policy={}, size={}/{}, hit_ratio={:.1}%)",
            self.inner.describe(),
            stats.policy,
            stats.size,
            stats.max_entries,
            stats.hit_ratio() * 100.0
        )
    }

    fn estimated_cost(&self) -> f64 {
        self.inner.estimated_cost()
    }
}

impl<O: Operation> Decorator for CacheDecorator<O> {
    type Inner = O;

    fn inner(&self) -> &O {
        &self.inner
    }

    fn into_inner(self) -> O {
        self.inner
    }
}
