//! World-side creature state and the weak handles the cache holds to it.
//!
//! The world owns every [`Creature`] behind a [`SharedCreature`].  The cache
//! only ever keeps an [`EntityHandle`], which is a `Weak` pointer: the world
//! may drop, kill or remove a creature at any moment, so every read goes
//! through [`EntityHandle::read`] and re-checks liveness first.

use crate::types::{Classification, Position};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Creature
// ---------------------------------------------------------------------------

/// Live state of a creature as the world sees it.
#[derive(Debug, Clone)]
pub struct Creature {
    /// Stable identity.  `0` means the world has not resolved it yet.
    pub id: u32,
    pub name: String,
    /// `None` while the creature is not placed on the map.
    pub position: Option<Position>,
    /// Remaining health, 0..=100.
    pub health_percent: u8,
    pub classification: Classification,
    pub dead: bool,
    pub removed: bool,
}

impl Creature {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        classification: Classification,
        position: Position,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position: Some(position),
            health_percent: 100,
            classification,
            dead: false,
            removed: false,
        }
    }

    /// Move into shared ownership so handles can be taken.
    pub fn shared(self) -> SharedCreature {
        Arc::new(RwLock::new(self))
    }

    fn check(&self) -> Result<(), InvalidHandle> {
        if self.id == 0 {
            Err(InvalidHandle::Unresolved)
        } else if self.removed {
            Err(InvalidHandle::Removed { id: self.id })
        } else if self.dead {
            Err(InvalidHandle::Dead { id: self.id })
        } else {
            Ok(())
        }
    }
}

/// World-owned creature state.
pub type SharedCreature = Arc<RwLock<Creature>>;

// ---------------------------------------------------------------------------
// Validation failure
// ---------------------------------------------------------------------------

/// Why a handle could not be used.  Returned as a value, never panicked on.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidHandle {
    #[error("creature was released by the world")]
    Released,
    #[error("creature identity is not resolvable")]
    Unresolved,
    #[error("creature {id} is dead")]
    Dead { id: u32 },
    #[error("creature {id} was removed")]
    Removed { id: u32 },
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Non-owning reference to a world creature.
#[derive(Debug, Clone, Default)]
pub struct EntityHandle {
    inner: Weak<RwLock<Creature>>,
}

impl EntityHandle {
    pub fn new(creature: &SharedCreature) -> Self {
        Self {
            inner: Arc::downgrade(creature),
        }
    }

    /// A handle that never resolves.
    pub fn dangling() -> Self {
        Self::default()
    }

    /// Validate the creature and, if it is live, run `f` against its state.
    pub fn read<R>(&self, f: impl FnOnce(&Creature) -> R) -> Result<R, InvalidHandle> {
        let creature = self.inner.upgrade().ok_or(InvalidHandle::Released)?;
        let guard = creature.read();
        guard.check()?;
        Ok(f(&guard))
    }

    /// Liveness check without reading any fields.
    pub fn validate(&self) -> Result<(), InvalidHandle> {
        self.read(|_| ())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Resolved id, if the creature is still live.
    pub fn id(&self) -> Option<u32> {
        self.read(|c| c.id).ok()
    }

    /// True when both handles point at the same world allocation.
    pub fn same_creature(&self, other: &EntityHandle) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<&SharedCreature> for EntityHandle {
    fn from(creature: &SharedCreature) -> Self {
        Self::new(creature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat() -> SharedCreature {
        Creature::new(7, "Rat", Classification::Hostile, Position::new(1, 1, 7)).shared()
    }

    #[test]
    fn live_creature_reads_through() {
        let c = rat();
        let h = EntityHandle::new(&c);
        assert_eq!(h.read(|c| c.name.clone()).unwrap(), "Rat");
        assert_eq!(h.id(), Some(7));
    }

    #[test]
    fn dropped_creature_is_released() {
        let c = rat();
        let h = EntityHandle::new(&c);
        drop(c);
        assert_eq!(h.validate(), Err(InvalidHandle::Released));
    }

    #[test]
    fn dead_and_removed_are_distinguished() {
        let c = rat();
        let h = EntityHandle::new(&c);

        c.write().dead = true;
        assert_eq!(h.validate(), Err(InvalidHandle::Dead { id: 7 }));

        c.write().removed = true;
        assert_eq!(h.validate(), Err(InvalidHandle::Removed { id: 7 }));
    }

    #[test]
    fn zero_id_is_unresolved() {
        let c = Creature::new(0, "Ghost", Classification::Hostile, Position::new(0, 0, 7)).shared();
        assert_eq!(EntityHandle::new(&c).validate(), Err(InvalidHandle::Unresolved));
    }

    #[test]
    fn dangling_handle_never_resolves() {
        assert!(!EntityHandle::dangling().is_valid());
    }
}
