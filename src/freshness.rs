//! Freshness controller: answer bulk reads from the cache or pull first.
//!
//! A pull is skipped while the last one is younger than the caller's TTL.
//! The view is approximate: creatures that walked out of sight without a
//! disappear notification stay in it until they fail validation or the
//! next pull no longer refreshes them.  Pass `ttl_ms = 0` to pull on every
//! call.

use crate::handle::EntityHandle;
use crate::identity::IdentityCache;
use crate::observer::WorldObserver;
use crate::types::{Position, SpectatorRadius};
use log::{debug, warn};

#[derive(Debug, Default)]
pub struct FreshnessController {
    last_bulk_update: Option<u64>,
    pulls: u64,
    warned_unwired: bool,
}

impl FreshnessController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fresh(&self, now_ms: u64, ttl_ms: u64) -> bool {
        self.last_bulk_update
            .is_some_and(|last| now_ms.saturating_sub(last) < ttl_ms)
    }

    pub fn last_bulk_update(&self) -> Option<u64> {
        self.last_bulk_update
    }

    pub fn pull_count(&self) -> u64 {
        self.pulls
    }

    pub fn reset(&mut self) {
        self.last_bulk_update = None;
    }

    pub fn reset_pull_count(&mut self) {
        self.pulls = 0;
    }

    /// Handles of every currently valid cached creature, pulling a bulk
    /// refresh from `observer` first when the cache is older than `ttl_ms`.
    pub fn live_view(
        &mut self,
        identity: &mut IdentityCache,
        observer: Option<&dyn WorldObserver>,
        origin: Position,
        radius: SpectatorRadius,
        ttl_ms: u64,
        now_ms: u64,
    ) -> Vec<EntityHandle> {
        if self.is_fresh(now_ms, ttl_ms) {
            identity.record_hit();
        } else {
            identity.record_miss();
            match observer {
                Some(observer) => self.pull(identity, observer, origin, radius, now_ms),
                None => {
                    if !self.warned_unwired {
                        warn!("No world observer wired; live view reflects explicit upserts only");
                        self.warned_unwired = true;
                    }
                }
            }
        }

        collect_valid(identity)
    }

    fn pull(
        &mut self,
        identity: &mut IdentityCache,
        observer: &dyn WorldObserver,
        origin: Position,
        radius: SpectatorRadius,
        now_ms: u64,
    ) {
        let visible = observer.spectators(origin, radius);
        let mut accepted = 0usize;
        for handle in &visible {
            if identity.upsert(handle, now_ms).is_ok() {
                accepted += 1;
            }
        }

        self.last_bulk_update = Some(now_ms);
        self.pulls += 1;
        debug!(
            "Bulk refresh at {}: {}/{} visible creatures cached",
            origin,
            accepted,
            visible.len()
        );
    }
}

/// Validate every cached entry, dropping the dead ones, and return the
/// handles of the rest (least recently touched first).
fn collect_valid(identity: &mut IdentityCache) -> Vec<EntityHandle> {
    let mut handles = Vec::with_capacity(identity.len());
    for id in identity.ids() {
        let Some(entry) = identity.peek(id) else {
            continue;
        };
        if entry.is_valid() {
            handles.push(entry.handle.clone());
        } else {
            identity.remove(id);
        }
    }
    handles
}
