//! The world observer: supplies the currently visible creature set.

use crate::handle::EntityHandle;
use crate::types::{Position, SpectatorRadius};

/// Anything that can scan the world for visible creatures.
///
/// Implementations return a fresh `Vec` per call.  The cache iterates that
/// copy, never a live world collection, so world callbacks that fire during
/// a bulk refresh cannot skip or duplicate entries.
pub trait WorldObserver: Send + Sync {
    fn spectators(&self, origin: Position, radius: SpectatorRadius) -> Vec<EntityHandle>;
}
