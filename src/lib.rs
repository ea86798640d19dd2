//! Creature Cache
//!
//! A bounded, low-latency cache of creature snapshots for a client that
//! watches a live world through a limited visibility window.
//!
//! ## Architecture
//!
//! ```text
//! EventSource ──► EventAdapter (events.rs) ─┐
//!                                           ▼
//! CreatureCache  (cache.rs)  ← the single owned instance
//!   ├── IdentityCache     (identity.rs)  ← id → Entry, LRU-bounded
//!   │     └── EntryPool   (pool.rs)
//!   ├── CategoryIndex     (category.rs)  ← lazy hostile/player/npc buckets
//!   ├── spatial           (spatial.rs)   ← Chebyshev nearest / range / floor
//!   └── FreshnessController (freshness.rs) ─► WorldObserver (observer.rs)
//! ```
//!
//! Cached entries hold weak [`EntityHandle`]s; every read path revalidates
//! the creature before trusting it.
//!
//! The `runtime` feature adds [`scheduler::CacheScheduler`], which drives a
//! deterministic [`sim::SimWorld`] and the cache's periodic maintenance.

pub mod cache;
pub mod category;
pub mod clock;
pub mod config;
pub mod entry;
pub mod events;
pub mod freshness;
pub mod handle;
pub mod identity;
pub mod observer;
pub mod pool;
pub mod spatial;
pub mod types;

// Runtime modules require the `runtime` feature.
#[cfg(feature = "runtime")]
pub mod scheduler;
#[cfg(feature = "runtime")]
pub mod sim;

pub use cache::CreatureCache;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{CacheConfig, ConfigError};
pub use entry::{Entry, EntrySnapshot};
pub use events::{AdapterStats, CreatureEvent, EventAdapter, EventSource};
pub use handle::{Creature, EntityHandle, InvalidHandle, SharedCreature};
pub use observer::WorldObserver;
pub use types::{CacheStats, Classification, PoolStats, Position, SpectatorRadius};

#[cfg(feature = "runtime")]
pub use scheduler::{CacheScheduler, SchedulerConfig, SchedulerReport};
#[cfg(feature = "runtime")]
pub use sim::{SimConfig, SimWorld};
