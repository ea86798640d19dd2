//! CacheScheduler – drives the simulated world and cache maintenance.
//!
//! ## Timers
//!
//! | Timer   | Interval                 | Effect                                      |
//! |---------|--------------------------|---------------------------------------------|
//! | world   | `1 / tick_rate_hz`       | step the world, dispatch queued events      |
//! | cleanup | `cleanup_interval_ms`    | `CreatureCache::cleanup_invalid`            |
//! | refresh | `refresh_interval_ms`    | `refresh_view` + nearest-hostile probe      |
//! | stats   | `stats_interval_ms`      | log `CacheStats` as JSON                    |
//!
//! Everything runs on one task; timers interleave only at `select!`
//! boundaries, so no cache operation ever observes another mid-flight.

use crate::cache::CreatureCache;
use crate::events::{AdapterStats, EventAdapter};
use crate::sim::SimWorld;
use crate::types::{CacheStats, Position};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// World step rate in Hz.
    pub tick_rate_hz: f32,
    pub cleanup_interval_ms: u64,
    pub refresh_interval_ms: u64,
    pub stats_interval_ms: u64,
    /// Position of the observing character.
    pub origin: Position,
    /// Range used by the periodic nearest-hostile probe.
    pub hunt_range: u32,
    /// Stop after this many world ticks (`None` = until Ctrl-C).
    pub max_ticks: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 10.0,
            cleanup_interval_ms: 2000,
            refresh_interval_ms: 100,
            stats_interval_ms: 5000,
            origin: Position::new(32000, 32000, 7),
            hunt_range: 7,
            max_ticks: None,
        }
    }
}

/// Summary returned when the scheduler stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerReport {
    pub ticks: u64,
    pub events: u64,
    pub cleanup_runs: u64,
    pub purged: u64,
    pub refreshes: u64,
    pub cache: CacheStats,
    pub adapter: AdapterStats,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

pub struct CacheScheduler {
    config: SchedulerConfig,
    cache: CreatureCache,
    adapter: EventAdapter,
    world: Arc<SimWorld>,
    ticks: u64,
    events: u64,
    cleanup_runs: u64,
    purged: u64,
    refreshes: u64,
}

impl CacheScheduler {
    pub fn new(config: SchedulerConfig, cache: CreatureCache, world: Arc<SimWorld>) -> Self {
        Self {
            config,
            cache,
            adapter: EventAdapter::new(),
            world,
            ticks: 0,
            events: 0,
            cleanup_runs: 0,
            purged: 0,
            refreshes: 0,
        }
    }

    pub fn cache(&self) -> &CreatureCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut CreatureCache {
        &mut self.cache
    }

    // -----------------------------------------------------------------------
    // Single steps (also used directly by tests)
    // -----------------------------------------------------------------------

    /// Step the world once and apply every notification it queued.
    pub fn world_tick(&mut self) -> usize {
        self.world.step();
        let n = self.adapter.pump(&mut self.cache, self.world.as_ref());
        self.ticks += 1;
        self.events += n as u64;
        n
    }

    pub fn cleanup(&mut self) -> usize {
        let purged = self.cache.cleanup_invalid();
        self.cleanup_runs += 1;
        self.purged += purged as u64;
        if purged > 0 {
            debug!("Cleanup removed {} invalid creatures", purged);
        }
        purged
    }

    /// Refresh the live view and look for the closest hostile.
    pub fn refresh(&mut self) -> usize {
        let origin = self.config.origin;
        let visible = self.cache.refresh_view(origin).len();
        self.refreshes += 1;
        if let Some((target, distance)) = self.cache.nearest(&origin, self.config.hunt_range) {
            debug!(
                "Nearest hostile: {} '{}' at distance {} ({}% health)",
                target.id, target.name, distance, target.health_percent
            );
        }
        visible
    }

    pub fn log_stats(&self) {
        match serde_json::to_string(&self.cache.stats()) {
            Ok(json) => info!("Cache stats: {}", json),
            Err(e) => warn!("Failed to serialise cache stats: {}", e),
        }
    }

    pub fn report(&self) -> SchedulerReport {
        SchedulerReport {
            ticks: self.ticks,
            events: self.events,
            cleanup_runs: self.cleanup_runs,
            purged: self.purged,
            refreshes: self.refreshes,
            cache: self.cache.stats(),
            adapter: self.adapter.stats(),
        }
    }

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------

    /// Run until `max_ticks` world ticks have elapsed or Ctrl-C arrives.
    pub async fn run(self) -> Result<SchedulerReport> {
        let span = tracing::info_span!("cache_scheduler", origin = %self.config.origin);
        self.run_loop().instrument(span).await
    }

    async fn run_loop(mut self) -> Result<SchedulerReport> {
        if self.config.tick_rate_hz.is_nan() || self.config.tick_rate_hz <= 0.0 {
            anyhow::bail!("tick_rate_hz must be positive, got {}", self.config.tick_rate_hz);
        }

        let mut world_timer = timer(Duration::from_secs_f32(1.0 / self.config.tick_rate_hz));
        let mut cleanup_timer = timer(millis(self.config.cleanup_interval_ms));
        let mut refresh_timer = timer(millis(self.config.refresh_interval_ms));
        let mut stats_timer = timer(millis(self.config.stats_interval_ms));

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        info!(
            "CacheScheduler started: {:.0}Hz world, cleanup every {}ms",
            self.config.tick_rate_hz, self.config.cleanup_interval_ms
        );

        loop {
            tokio::select! {
                _ = world_timer.tick() => {
                    self.world_tick();
                    if self.config.max_ticks.is_some_and(|max| self.ticks >= max) {
                        info!("CacheScheduler reached {} ticks", self.ticks);
                        break;
                    }
                }
                _ = cleanup_timer.tick() => {
                    self.cleanup();
                }
                _ = refresh_timer.tick() => {
                    self.refresh();
                }
                _ = stats_timer.tick() => {
                    self.log_stats();
                }
                signal = &mut shutdown => {
                    signal.context("Failed to listen for Ctrl-C")?;
                    info!("CacheScheduler shutting down (SIGINT)");
                    break;
                }
            }
        }

        self.log_stats();
        Ok(self.report())
    }
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}

fn timer(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}
