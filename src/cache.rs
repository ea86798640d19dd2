//! `CreatureCache` – the single owned cache instance consumers are handed.
//!
//! Bundles the identity cache, category index and freshness controller
//! behind one surface.  There is no global: construct one, inject it by
//! reference, drop it to tear down.

use crate::category::CategoryIndex;
use crate::clock::{Clock, MonotonicClock};
use crate::config::CacheConfig;
use crate::entry::{Entry, EntrySnapshot};
use crate::freshness::FreshnessController;
use crate::handle::{EntityHandle, InvalidHandle};
use crate::identity::IdentityCache;
use crate::observer::WorldObserver;
use crate::pool::EntryPool;
use crate::spatial;
use crate::types::{CacheStats, Classification, Position, SpectatorRadius};
use std::sync::Arc;

pub struct CreatureCache {
    config: CacheConfig,
    identity: IdentityCache,
    index: CategoryIndex,
    freshness: FreshnessController,
    observer: Option<Arc<dyn WorldObserver>>,
    clock: Arc<dyn Clock>,
}

impl CreatureCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let pool = EntryPool::new(config.pooling, config.pool_capacity);
        Self {
            identity: IdentityCache::new(config.max_size, pool),
            index: CategoryIndex::new(),
            freshness: FreshnessController::new(),
            observer: None,
            clock,
            config,
        }
    }

    /// Wire the world observer used for bulk refreshes.
    pub fn with_observer(mut self, observer: Arc<dyn WorldObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn WorldObserver>>) {
        self.observer = observer;
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    pub fn upsert(&mut self, handle: &EntityHandle) -> Result<&Entry, InvalidHandle> {
        let now = self.clock.now_ms();
        self.identity.upsert(handle, now)
    }

    pub fn get(&mut self, id: u32) -> Option<&Entry> {
        self.identity.get(id)
    }

    pub fn peek(&self, id: u32) -> Option<&Entry> {
        self.identity.peek(id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.identity.contains(id)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        self.identity.remove(id)
    }

    /// Empty the cache and every derived view.  The next live view pulls.
    pub fn clear(&mut self) {
        self.identity.clear();
        self.index.invalidate();
        self.freshness.reset();
    }

    /// Periodic maintenance: purge entries whose creature is gone.
    pub fn cleanup_invalid(&mut self) -> usize {
        self.identity.cleanup_invalid()
    }

    pub fn len(&self) -> usize {
        self.identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identity.is_empty()
    }

    /// Cached ids, least recently touched first.
    pub fn lru_order(&self) -> Vec<u32> {
        self.identity.ids()
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    /// Valid entries of one classification.  Entries that fail validation
    /// are removed from the cache before the bucket is read.
    pub fn bucket(&mut self, classification: Classification) -> Vec<&Entry> {
        self.identity.purge_invalid();
        self.index.bucket(&self.identity, classification)
    }

    pub fn is_index_dirty(&self) -> bool {
        self.index.is_dirty(&self.identity)
    }

    pub fn rebuild_count(&self) -> u64 {
        self.index.rebuild_count()
    }

    // -----------------------------------------------------------------------
    // Spatial (hostile bucket unless a classification is given)
    // -----------------------------------------------------------------------

    pub fn nearest(&mut self, origin: &Position, max_range: u32) -> Option<(&Entry, u32)> {
        self.nearest_in(Classification::Hostile, origin, max_range)
    }

    pub fn nearest_in(
        &mut self,
        classification: Classification,
        origin: &Position,
        max_range: u32,
    ) -> Option<(&Entry, u32)> {
        let bucket = self.bucket(classification);
        spatial::nearest(&bucket, origin, max_range)
    }

    pub fn in_range(&mut self, origin: &Position, range: u32) -> Vec<&Entry> {
        self.in_range_in(Classification::Hostile, origin, range)
    }

    pub fn in_range_in(
        &mut self,
        classification: Classification,
        origin: &Position,
        range: u32,
    ) -> Vec<&Entry> {
        let bucket = self.bucket(classification);
        spatial::in_range(&bucket, origin, range)
    }

    pub fn on_floor(&mut self, z: u8) -> Vec<&Entry> {
        self.on_floor_in(Classification::Hostile, z)
    }

    pub fn on_floor_in(&mut self, classification: Classification, z: u8) -> Vec<&Entry> {
        let bucket = self.bucket(classification);
        spatial::on_floor(&bucket, z)
    }

    // -----------------------------------------------------------------------
    // Freshness
    // -----------------------------------------------------------------------

    /// Handles of all valid cached creatures, pulling from the world observer
    /// first if the last pull is at least `ttl_ms` old.
    pub fn live_view(
        &mut self,
        origin: Position,
        radius: SpectatorRadius,
        ttl_ms: u64,
    ) -> Vec<EntityHandle> {
        let now = self.clock.now_ms();
        self.freshness.live_view(
            &mut self.identity,
            self.observer.as_deref(),
            origin,
            radius,
            ttl_ms,
            now,
        )
    }

    /// Clock milliseconds of the last bulk pull, if any.
    pub fn last_bulk_update(&self) -> Option<u64> {
        self.freshness.last_bulk_update()
    }

    /// [`live_view`](Self::live_view) with the configured radius and TTL.
    pub fn refresh_view(&mut self, origin: Position) -> Vec<EntityHandle> {
        let radius = self.config.spectator_radius();
        let ttl = self.config.ttl_ms;
        self.live_view(origin, radius, ttl)
    }

    // -----------------------------------------------------------------------
    // Observability
    // -----------------------------------------------------------------------

    pub fn stats(&self) -> CacheStats {
        let c = self.identity.counters();
        let lookups = c.hits + c.misses;
        CacheStats {
            hits: c.hits,
            misses: c.misses,
            evictions: c.evictions,
            cleanups: c.cleanups,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                c.hits as f64 / lookups as f64
            },
            size: self.identity.len(),
            max_size: self.identity.max_size(),
            rebuilds: self.index.rebuild_count(),
            bulk_pulls: self.freshness.pull_count(),
            pool: self.identity.pool().stats(),
        }
    }

    pub fn reset_stats(&mut self) {
        self.identity.reset_counters();
        self.index.reset_rebuild_count();
        self.freshness.reset_pull_count();
    }

    /// Serialisable view of every entry, least recently touched first.
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        let now = self.clock.now_ms();
        self.identity.iter().map(|e| e.snapshot(now)).collect()
    }
}
