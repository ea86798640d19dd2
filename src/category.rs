//! Category index: lazily rebuilt partition of cached entries by classification.
//!
//! The index remembers the identity cache epoch it was built against.  Any
//! population change bumps that epoch, so the next bucket read notices the
//! mismatch and rebuilds in one O(size) pass.  Writes never trigger a
//! rebuild themselves, which keeps bursts of push events cheap.

use crate::entry::Entry;
use crate::identity::IdentityCache;
use crate::types::Classification;
use log::trace;

#[derive(Debug, Default)]
pub struct CategoryIndex {
    hostile: Vec<u32>,
    players: Vec<u32>,
    passive: Vec<u32>,
    built_epoch: Option<u64>,
    rebuilds: u64,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dirty(&self, identity: &IdentityCache) -> bool {
        self.built_epoch != Some(identity.epoch())
    }

    /// Force the next read to rebuild.
    pub fn invalidate(&mut self) {
        self.built_epoch = None;
        self.hostile.clear();
        self.players.clear();
        self.passive.clear();
    }

    /// Live entries of one classification, rebuilding first if stale.
    ///
    /// Never mutates `identity`.  Callers purge invalid entries first; any
    /// that slip through are filtered out of the result.
    pub fn bucket<'a>(
        &mut self,
        identity: &'a IdentityCache,
        classification: Classification,
    ) -> Vec<&'a Entry> {
        if self.is_dirty(identity) {
            self.rebuild(identity);
        }

        let ids = match classification {
            Classification::Hostile => &self.hostile,
            Classification::Player => &self.players,
            Classification::PassiveNpc => &self.passive,
        };

        ids.iter()
            .filter_map(|id| identity.peek(*id))
            .filter(|entry| entry.classification == classification && entry.is_valid())
            .collect()
    }

    fn rebuild(&mut self, identity: &IdentityCache) {
        self.hostile.clear();
        self.players.clear();
        self.passive.clear();

        for entry in identity.iter() {
            match entry.classification {
                Classification::Hostile => self.hostile.push(entry.id),
                Classification::Player => self.players.push(entry.id),
                Classification::PassiveNpc => self.passive.push(entry.id),
            }
        }

        self.built_epoch = Some(identity.epoch());
        self.rebuilds += 1;
        trace!(
            "Category index rebuilt: {} hostile, {} players, {} passive",
            self.hostile.len(),
            self.players.len(),
            self.passive.len()
        );
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn reset_rebuild_count(&mut self) {
        self.rebuilds = 0;
    }
}
