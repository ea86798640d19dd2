//! Cache-owned snapshot of one creature.

use crate::handle::{Creature, EntityHandle};
use crate::types::{Classification, Position};
use serde::{Deserialize, Serialize};

/// Snapshot record owned by the identity cache.
///
/// Entries are refreshed in place on every sighting and recycled through
/// the entry pool, so the `name` buffer keeps its allocation across reuse.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: u32,
    /// Weak reference back to the world; revalidated on every read.
    pub handle: EntityHandle,
    pub name: String,
    pub position: Option<Position>,
    pub health_percent: u8,
    pub classification: Classification,
    /// Clock milliseconds of the last refresh.
    pub last_update: u64,
}

impl Entry {
    /// An unused record, as handed out by an empty pool.
    pub fn vacant() -> Self {
        Self {
            id: 0,
            handle: EntityHandle::dangling(),
            name: String::new(),
            position: None,
            health_percent: 0,
            classification: Classification::Hostile,
            last_update: 0,
        }
    }

    /// Overwrite every field from the creature's current state.
    pub(crate) fn refresh(&mut self, handle: &EntityHandle, creature: &Creature, now_ms: u64) {
        self.id = creature.id;
        if !self.handle.same_creature(handle) {
            self.handle = handle.clone();
        }
        self.name.clear();
        self.name.push_str(&creature.name);
        self.position = creature.position;
        self.health_percent = creature.health_percent.min(100);
        self.classification = creature.classification;
        self.last_update = now_ms;
    }

    /// Drop the world link and field values before the record goes idle.
    pub(crate) fn reset(&mut self) {
        self.id = 0;
        self.handle = EntityHandle::dangling();
        self.name.clear();
        self.position = None;
        self.health_percent = 0;
        self.last_update = 0;
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    pub fn snapshot(&self, now_ms: u64) -> EntrySnapshot {
        EntrySnapshot {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            health_percent: self.health_percent,
            classification: self.classification,
            age_ms: now_ms.saturating_sub(self.last_update),
        }
    }
}

/// Serialisable diagnostic view of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub id: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub health_percent: u8,
    pub classification: Classification,
    pub age_ms: u64,
}
