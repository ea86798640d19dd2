//! Push notifications from the world and the adapter that applies them.
//!
//! The adapter owns no cache state.  It is handed the single
//! [`CreatureCache`] on every dispatch and turns each notification into an
//! upsert or a removal.  A handle that fails validation by the time its
//! notification is handled means the creature vanished in between; that
//! is counted and otherwise ignored.

use crate::cache::CreatureCache;
use crate::handle::EntityHandle;
use log::trace;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A single creature notification.
#[derive(Debug, Clone)]
pub enum CreatureEvent {
    /// A creature entered the visible area.
    Appeared(EntityHandle),
    /// A creature stepped to a new tile.
    Moved(EntityHandle),
    /// A creature's health percentage changed.
    HealthChanged(EntityHandle),
    /// A creature left the visible area or was destroyed.
    Disappeared { id: u32 },
}

/// Anything that queues creature notifications between polls.
pub trait EventSource {
    /// Take every notification queued since the last call, oldest first.
    fn drain_events(&self) -> Vec<CreatureEvent>;
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterStats {
    pub appeared: u64,
    pub moved: u64,
    pub health_changed: u64,
    pub disappeared: u64,
    /// Notifications whose creature was already invalid, or moves while
    /// move tracking is off.
    pub ignored: u64,
}

#[derive(Debug, Default)]
pub struct EventAdapter {
    stats: AdapterStats,
}

impl EventAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, cache: &mut CreatureCache, event: &CreatureEvent) {
        match event {
            CreatureEvent::Appeared(handle) => {
                self.stats.appeared += 1;
                self.refresh(cache, handle);
            }
            CreatureEvent::Moved(handle) => {
                self.stats.moved += 1;
                if cache.config().track_moves {
                    self.refresh(cache, handle);
                } else {
                    self.stats.ignored += 1;
                }
            }
            CreatureEvent::HealthChanged(handle) => {
                self.stats.health_changed += 1;
                self.refresh(cache, handle);
            }
            CreatureEvent::Disappeared { id } => {
                self.stats.disappeared += 1;
                cache.remove(*id);
            }
        }
    }

    /// Dispatch a batch in order.
    pub fn dispatch_all<'e>(
        &mut self,
        cache: &mut CreatureCache,
        events: impl IntoIterator<Item = &'e CreatureEvent>,
    ) -> usize {
        let mut n = 0;
        for event in events {
            self.dispatch(cache, event);
            n += 1;
        }
        n
    }

    /// Drain `source` and dispatch everything it had queued.
    pub fn pump(&mut self, cache: &mut CreatureCache, source: &dyn EventSource) -> usize {
        let events = source.drain_events();
        self.dispatch_all(cache, &events)
    }

    fn refresh(&mut self, cache: &mut CreatureCache, handle: &EntityHandle) {
        if let Err(reason) = cache.upsert(handle) {
            trace!("Ignoring notification for vanished creature: {}", reason);
            self.stats.ignored += 1;
        }
    }

    pub fn stats(&self) -> AdapterStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = AdapterStats::default();
    }
}
