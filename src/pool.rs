//! Entry pool: recycles entry records under high creature turnover.

use crate::entry::Entry;
use crate::types::PoolStats;

pub struct EntryPool {
    free: Vec<Box<Entry>>,
    capacity: usize,
    enabled: bool,
    stats: PoolStats,
}

impl EntryPool {
    pub fn new(enabled: bool, capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(if enabled { capacity } else { 0 }),
            capacity,
            enabled,
            stats: PoolStats::default(),
        }
    }

    /// Take a record from the free list, or allocate one.
    pub fn acquire(&mut self) -> Box<Entry> {
        self.stats.acquired += 1;
        match self.free.pop() {
            Some(entry) => {
                self.stats.reused += 1;
                entry
            }
            None => Box::new(Entry::vacant()),
        }
    }

    /// Return a record.  It is reset first so no world link outlives the cache.
    pub fn release(&mut self, mut entry: Box<Entry>) {
        if !self.enabled || self.free.len() >= self.capacity {
            self.stats.discarded += 1;
            return;
        }
        entry.reset();
        self.free.push(entry);
        self.stats.released += 1;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn idle(&self) -> usize {
        self.free.len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            idle: self.free.len(),
            ..self.stats
        }
    }

    /// Reset counters; idle records are kept.
    pub fn reset_stats(&mut self) {
        self.stats = PoolStats::default();
    }
}
