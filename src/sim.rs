//! Deterministic simulated world: a creature population around one observer.
//!
//! `SimWorld` stands in for the real game client.  It owns every creature,
//! hands out weak handles through [`WorldObserver::spectators`], and queues
//! notifications for [`EventSource::drain_events`].  A share of deaths is
//! deliberately *silent* (no disappear notification) so the cache's lazy
//! validation and periodic cleanup have something to do.

use crate::events::{CreatureEvent, EventSource};
use crate::handle::{Creature, EntityHandle, SharedCreature};
use crate::observer::WorldObserver;
use crate::types::{Classification, Position, SpectatorRadius};
use log::trace;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

const HOSTILE_NAMES: &[&str] = &["Rat", "Cave Rat", "Rotworm", "Troll", "Orc", "Cyclops", "Dragon"];
const PLAYER_NAMES: &[&str] = &["Bubble", "Eternal Oblivion", "Seromontis", "Kiwi"];
const NPC_NAMES: &[&str] = &["Sam", "Frodo", "Gorn", "Oswald"];

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub seed: u64,
    /// Population the world replenishes to each step.
    pub population: usize,
    /// Where the observing character stands.
    pub origin: Position,
    /// Creatures further than this from `origin` despawn.
    pub roam: SpectatorRadius,
    /// Percent of deaths that produce no disappear notification.
    pub silent_death_percent: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            population: 40,
            origin: Position::new(32000, 32000, 7),
            roam: SpectatorRadius::new(10, 8),
            silent_death_percent: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Step report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub frame: u64,
    pub spawned: usize,
    pub moved: usize,
    pub damaged: usize,
    pub died: usize,
    pub silent_deaths: usize,
    pub despawned: usize,
    pub population: usize,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

pub struct SimWorld {
    state: Mutex<SimState>,
}

struct SimState {
    config: SimConfig,
    rng: Lcg,
    creatures: Vec<SharedCreature>,
    next_id: u32,
    pending: Vec<CreatureEvent>,
    frame: u64,
}

impl SimWorld {
    pub fn new(config: SimConfig) -> Self {
        let mut state = SimState {
            rng: Lcg::new(config.seed),
            creatures: Vec::with_capacity(config.population),
            next_id: 1,
            pending: Vec::new(),
            frame: 0,
            config,
        };
        state.replenish();
        Self {
            state: Mutex::new(state),
        }
    }

    /// Advance one frame: corpses vanish, creatures act, new ones spawn.
    pub fn step(&self) -> StepReport {
        self.state.lock().step()
    }

    pub fn population(&self) -> usize {
        self.state.lock().creatures.len()
    }

    pub fn origin(&self) -> Position {
        self.state.lock().config.origin
    }

    pub fn frame(&self) -> u64 {
        self.state.lock().frame
    }

    /// Strong reference to a live creature, for tests and tooling.
    pub fn creature(&self, id: u32) -> Option<SharedCreature> {
        self.state
            .lock()
            .creatures
            .iter()
            .find(|c| c.read().id == id)
            .cloned()
    }
}

impl WorldObserver for SimWorld {
    fn spectators(&self, origin: Position, radius: SpectatorRadius) -> Vec<EntityHandle> {
        let state = self.state.lock();
        state
            .creatures
            .iter()
            .filter(|c| {
                c.read()
                    .position
                    .is_some_and(|pos| radius.contains(&origin, &pos))
            })
            .map(EntityHandle::new)
            .collect()
    }
}

impl EventSource for SimWorld {
    fn drain_events(&self) -> Vec<CreatureEvent> {
        std::mem::take(&mut self.state.lock().pending)
    }
}

impl SimState {
    fn step(&mut self) -> StepReport {
        self.frame += 1;
        let mut report = StepReport {
            frame: self.frame,
            ..Default::default()
        };

        // Corpses from the previous frame leave the world; their handles stop resolving.
        self.creatures.retain(|c| !c.read().dead);

        let origin = self.config.origin;
        let roam = self.config.roam;
        let silent = self.config.silent_death_percent;

        let mut departed = Vec::new();
        for creature in &self.creatures {
            let handle = EntityHandle::new(creature);
            let roll = self.rng.below(100);
            let mut c = creature.write();

            if roll < 30 {
                if let Some(pos) = c.position.as_mut() {
                    pos.x += self.rng.below(3) as i32 - 1;
                    pos.y += self.rng.below(3) as i32 - 1;
                }
                report.moved += 1;

                if c.position.is_some_and(|pos| !roam.contains(&origin, &pos)) {
                    c.removed = true;
                    departed.push(c.id);
                    self.pending.push(CreatureEvent::Disappeared { id: c.id });
                    report.despawned += 1;
                } else {
                    self.pending.push(CreatureEvent::Moved(handle));
                }
            } else if roll < 45 {
                let damage = 5 + self.rng.below(21) as u8;
                c.health_percent = c.health_percent.saturating_sub(damage);
                report.damaged += 1;

                if c.health_percent == 0 {
                    c.dead = true;
                    report.died += 1;
                    if self.rng.below(100) < silent {
                        report.silent_deaths += 1;
                    } else {
                        self.pending.push(CreatureEvent::Disappeared { id: c.id });
                    }
                } else {
                    self.pending.push(CreatureEvent::HealthChanged(handle));
                }
            }
        }
        self.creatures.retain(|c| !departed.contains(&c.read().id));

        report.spawned = self.replenish();
        report.population = self.creatures.len();
        trace!("Sim frame {}: {:?}", self.frame, report);
        report
    }

    fn replenish(&mut self) -> usize {
        let mut spawned = 0;
        while self.creatures.len() < self.config.population {
            let creature = self.spawn_one();
            self.pending
                .push(CreatureEvent::Appeared(EntityHandle::new(&creature)));
            self.creatures.push(creature);
            spawned += 1;
        }
        spawned
    }

    fn spawn_one(&mut self) -> SharedCreature {
        let id = self.next_id;
        self.next_id += 1;

        let (classification, names) = match self.rng.below(100) {
            0..=69 => (Classification::Hostile, HOSTILE_NAMES),
            70..=84 => (Classification::Player, PLAYER_NAMES),
            _ => (Classification::PassiveNpc, NPC_NAMES),
        };
        let name = names[self.rng.below(names.len() as u32) as usize];

        let origin = self.config.origin;
        let roam = self.config.roam;
        let dx = self.rng.below(roam.x * 2 + 1) as i32 - roam.x as i32;
        let dy = self.rng.below(roam.y * 2 + 1) as i32 - roam.y as i32;
        let position = Position::new(origin.x + dx, origin.y + dy, origin.z);

        Creature::new(id, name, classification, position).shared()
    }
}

// ---------------------------------------------------------------------------
// RNG
// ---------------------------------------------------------------------------

/// Knuth MMIX linear congruential generator.  Deterministic per seed.
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    /// Uniform-ish value in `0..n`.  `n` must be non-zero.
    fn below(&mut self, n: u32) -> u32 {
        self.next_u32() % n.max(1)
    }
}
