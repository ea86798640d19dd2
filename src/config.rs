//! Cache configuration and layered loading.
//!
//! Sources are merged in order, later ones winning:
//!
//! | Layer            | Example                                  |
//! |------------------|------------------------------------------|
//! | built-in default | `CacheConfig::default()`                 |
//! | TOML file        | `max_size = 150`                         |
//! | environment      | `CREATURE_CACHE_TTL_MS=500`              |

use crate::types::SpectatorRadius;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix for every config key.
pub const ENV_PREFIX: &str = "CREATURE_CACHE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Upper bound on cached entries (LRU-evicted beyond this).
    pub max_size: usize,
    /// Spectator window half-width used for bulk pulls.
    pub radius_x: u32,
    /// Spectator window half-height used for bulk pulls.
    pub radius_y: u32,
    /// Maximum age of the last bulk pull before `live_view` pulls again.
    pub ttl_ms: u64,
    /// How often the scheduler runs `cleanup_invalid`.
    pub cleanup_interval_ms: u64,
    /// Recycle entry records instead of reallocating them.
    pub pooling: bool,
    /// Maximum idle records kept by the pool.
    pub pool_capacity: usize,
    /// Upsert on move notifications (health and appear always upsert).
    pub track_moves: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            radius_x: 8,
            radius_y: 6,
            ttl_ms: 250,
            cleanup_interval_ms: 2000,
            pooling: true,
            pool_capacity: 100,
            track_moves: true,
        }
    }
}

impl CacheConfig {
    /// Merge defaults, an optional TOML file and `CREATURE_CACHE_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let cfg: CacheConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size == 0 {
            return Err(ConfigError::Invalid("max_size must be at least 1".into()));
        }
        Ok(())
    }

    pub fn spectator_radius(&self) -> SpectatorRadius {
        SpectatorRadius::new(self.radius_x, self.radius_y)
    }
}
