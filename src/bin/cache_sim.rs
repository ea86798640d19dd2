//! creature-cache-sim binary
//!
//! Runs the creature cache against a deterministic simulated world, with
//! the scheduler driving event delivery and periodic maintenance.
//!
//! ## Configuration (env / TOML via `config` crate, CLI flags override)
//!
//! | Key                                   | Default | Description                   |
//! |---------------------------------------|---------|-------------------------------|
//! | `CREATURE_CACHE_MAX_SIZE`             | `100`   | Identity cache bound          |
//! | `CREATURE_CACHE_TTL_MS`               | `250`   | Live view freshness window    |
//! | `CREATURE_CACHE_CLEANUP_INTERVAL_MS`  | `2000`  | Cleanup period                |
//! | `CREATURE_CACHE_POOLING`              | `true`  | Recycle entry records         |
//! | `SIM_POPULATION`                      | `40`    | Simulated creature count      |
//! | `SIM_SEED`                            | `42`    | Simulation seed               |
//! | `SIM_TICK_RATE_HZ`                    | `10`    | World step rate               |

use anyhow::{Context, Result};
use clap::Parser;
use creature_cache::{
    cache::CreatureCache,
    clock::MonotonicClock,
    config::CacheConfig,
    observer::WorldObserver,
    scheduler::{CacheScheduler, SchedulerConfig},
    sim::{SimConfig, SimWorld},
};
use std::path::PathBuf;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "creature-cache-sim", about = "Creature cache simulation", version)]
struct Args {
    /// TOML file with cache settings
    #[arg(long, env = "CREATURE_CACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Identity cache bound
    #[arg(long)]
    max_size: Option<usize>,

    /// Live view freshness window (ms)
    #[arg(long)]
    ttl_ms: Option<u64>,

    /// Cleanup period (ms)
    #[arg(long)]
    cleanup_interval_ms: Option<u64>,

    /// Disable entry pooling
    #[arg(long)]
    no_pool: bool,

    /// Simulated creature count
    #[arg(long, env = "SIM_POPULATION", default_value_t = 40)]
    population: usize,

    /// Simulation seed
    #[arg(long, env = "SIM_SEED", default_value_t = 42)]
    seed: u64,

    /// World step rate (Hz)
    #[arg(long, env = "SIM_TICK_RATE_HZ", default_value_t = 10.0)]
    tick_rate_hz: f32,

    /// Stop after this many world ticks (default: run until Ctrl-C)
    #[arg(long)]
    ticks: Option<u64>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("creature_cache=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut cache_config =
        CacheConfig::load(args.config.as_deref()).context("Failed to load cache configuration")?;
    if let Some(max_size) = args.max_size {
        cache_config.max_size = max_size;
    }
    if let Some(ttl_ms) = args.ttl_ms {
        cache_config.ttl_ms = ttl_ms;
    }
    if let Some(interval) = args.cleanup_interval_ms {
        cache_config.cleanup_interval_ms = interval;
    }
    if args.no_pool {
        cache_config.pooling = false;
    }
    cache_config.validate()?;

    log::info!(
        "Starting creature-cache-sim (seed={}, population={}, max_size={}, ttl={}ms)",
        args.seed,
        args.population,
        cache_config.max_size,
        cache_config.ttl_ms,
    );

    // Simulated world
    let sim_config = SimConfig {
        seed: args.seed,
        population: args.population,
        ..Default::default()
    };
    let origin = sim_config.origin;
    let world = Arc::new(SimWorld::new(sim_config));

    // Cache wired to the world as its observer
    let observer: Arc<dyn WorldObserver> = world.clone();
    let cleanup_interval_ms = cache_config.cleanup_interval_ms;
    let cache = CreatureCache::with_clock(cache_config, Arc::new(MonotonicClock::new()))
        .with_observer(observer);

    let scheduler_config = SchedulerConfig {
        tick_rate_hz: args.tick_rate_hz,
        cleanup_interval_ms,
        origin,
        max_ticks: args.ticks,
        ..Default::default()
    };

    let report = CacheScheduler::new(scheduler_config, cache, world)
        .run()
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
