//! Core cache types shared across all modules.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Grid position
// ---------------------------------------------------------------------------

/// A world grid coordinate.  `z` is the floor (level).
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: u8,
}

impl Position {
    pub fn new(x: i32, y: i32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Grid-step distance `max(|dx|, |dy|)`.  Floors are not compared.
    pub fn chebyshev(&self, other: &Position) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{},{}]", self.x, self.y, self.z)
    }
}

/// Half-extents of the rectangular spectator window used for bulk pulls.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct SpectatorRadius {
    pub x: u32,
    pub y: u32,
}

impl SpectatorRadius {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// True when `pos` lies inside the window centred on `origin` on the same floor.
    pub fn contains(&self, origin: &Position, pos: &Position) -> bool {
        origin.z == pos.z
            && origin.x.abs_diff(pos.x) <= self.x
            && origin.y.abs_diff(pos.y) <= self.y
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The closed set of categories a creature falls into.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Hostile,
    Player,
    PassiveNpc,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::Hostile,
        Classification::Player,
        Classification::PassiveNpc,
    ];
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Classification::Hostile => "hostile",
            Classification::Player => "player",
            Classification::PassiveNpc => "passive_npc",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Entry pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Entries handed out by the pool (fresh or recycled).
    pub acquired: u64,
    /// Acquisitions served from the free list.
    pub reused: u64,
    /// Entries returned to the free list.
    pub released: u64,
    /// Entries dropped because pooling is off or the free list is full.
    pub discarded: u64,
    /// Entries currently idle in the free list.
    pub idle: usize,
}

/// Best-effort cache telemetry.  Counters never affect correctness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub cleanups: u64,
    /// `hits / (hits + misses)`, or 0 before the first lookup.
    pub hit_rate: f64,
    pub size: usize,
    pub max_size: usize,
    /// Category index rebuilds.
    pub rebuilds: u64,
    /// Bulk refreshes pulled from the world observer.
    pub bulk_pulls: u64,
    pub pool: PoolStats,
}
