//! Identity cache: the authoritative `id → Entry` map, bounded by LRU order.
//!
//! Reads and writes both count as a touch.  When a new id arrives while the
//! cache is full, exactly one least-recently-used entry is evicted *before*
//! the insert, so the size never exceeds `max_size`.
//!
//! Every change to the classified population (insert, evict, remove,
//! reclassification) bumps [`IdentityCache::epoch`].  The category index
//! compares epochs to decide whether its buckets are stale; health and
//! position refreshes on an existing id leave the epoch alone.

use crate::entry::Entry;
use crate::handle::{Creature, EntityHandle, InvalidHandle};
use crate::pool::EntryPool;
use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub cleanups: u64,
}

pub struct IdentityCache {
    entries: LruCache<u32, Box<Entry>>,
    pool: EntryPool,
    max_size: usize,
    epoch: u64,
    counters: Counters,
}

impl IdentityCache {
    /// `max_size` is clamped to at least one entry.
    pub fn new(max_size: usize, pool: EntryPool) -> Self {
        let cap = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            pool,
            max_size: cap.get(),
            epoch: 0,
            counters: Counters::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Validate `handle` and insert or refresh its entry.
    ///
    /// On failure nothing is mutated and the reason is returned.
    pub fn upsert(&mut self, handle: &EntityHandle, now_ms: u64) -> Result<&Entry, InvalidHandle> {
        handle.read(move |creature| self.store(handle, creature, now_ms))
    }

    fn store(&mut self, handle: &EntityHandle, creature: &Creature, now_ms: u64) -> &Entry {
        let id = creature.id;
        let existed = self.entries.contains(&id);
        if !existed && self.entries.len() >= self.max_size {
            self.evict_lru();
        }

        let pool = &mut self.pool;
        let entry = self.entries.get_or_insert_mut(id, || pool.acquire());
        let population_changed = !existed || entry.classification != creature.classification;
        entry.refresh(handle, creature, now_ms);

        if population_changed {
            self.epoch = self.epoch.wrapping_add(1);
        }
        &**entry
    }

    /// Delete `id` if present.  Returns whether anything was removed.
    pub fn remove(&mut self, id: u32) -> bool {
        match self.entries.pop(&id) {
            Some(entry) => {
                self.pool.release(entry);
                self.bump_epoch();
                true
            }
            None => false,
        }
    }

    /// Release every entry back to the pool.
    pub fn clear(&mut self) {
        while let Some((_, entry)) = self.entries.pop_lru() {
            self.pool.release(entry);
        }
        self.bump_epoch();
    }

    /// Periodic maintenance: remove every entry whose handle no longer
    /// validates and count them as cleanups.
    pub fn cleanup_invalid(&mut self) -> usize {
        let purged = self.purge_invalid();
        if purged > 0 {
            debug!("Cleanup purged {} invalid entries", purged);
        }
        self.counters.cleanups += purged as u64;
        purged
    }

    /// Lazy removal of every entry that fails validation.  Ids are copied
    /// out first so removal never runs while the map is being iterated.
    pub fn purge_invalid(&mut self) -> usize {
        let stale: Vec<u32> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_valid())
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            self.remove(*id);
        }
        stale.len()
    }

    fn evict_lru(&mut self) {
        if let Some((id, entry)) = self.entries.pop_lru() {
            debug!("Evicting least recently used creature {} ({})", id, entry.name);
            self.pool.release(entry);
            self.counters.evictions += 1;
            self.bump_epoch();
        }
    }

    fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Validated lookup.  Touches the LRU order on a hit; lazily removes the
    /// entry if its creature has been invalidated.
    pub fn get(&mut self, id: u32) -> Option<&Entry> {
        let validity = match self.entries.peek(&id) {
            Some(entry) => entry.handle.validate(),
            None => {
                self.counters.misses += 1;
                return None;
            }
        };

        if let Err(reason) = validity {
            debug!("Dropping stale entry {}: {}", id, reason);
            self.remove(id);
            self.counters.misses += 1;
            return None;
        }

        self.counters.hits += 1;
        self.entries.get(&id).map(|entry| &**entry)
    }

    /// Unvalidated lookup with no LRU touch and no counters.
    pub fn peek(&self, id: u32) -> Option<&Entry> {
        self.entries.peek(&id).map(|entry| &**entry)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains(&id)
    }

    /// Entries from least to most recently touched.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().rev().map(|(_, entry)| &**entry)
    }

    /// Copy of the current ids, least recently touched first.
    pub fn ids(&self) -> Vec<u32> {
        self.entries.iter().rev().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Population generation; changes whenever category membership may have.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn pool(&self) -> &EntryPool {
        &self.pool
    }

    // -----------------------------------------------------------------------
    // Counters
    // -----------------------------------------------------------------------

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn record_hit(&mut self) {
        self.counters.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.counters.misses += 1;
    }

    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
        self.pool.reset_stats();
    }
}
