//! Runtime configuration.
//!
//! [`StorageConfig`] is a plain snapshot: the aggregator hands each context a
//! copy at creation, and that copy never changes for the context's lifetime.
//!
//! Configuration is stored as JSON. Every field is optional; missing fields
//! take their defaults.
//!
//! ```
//! use storehouse_world::{ProviderCategory, StorageConfig};
//!
//! let config = StorageConfig::from_json_str(r#"{
//!     "range": 25.0,
//!     "pull_from_vehicle_storage": false
//! }"#).unwrap();
//!
//! assert_eq!(config.effective_range(), Some(25.0));
//! assert!(!config.is_category_enabled(ProviderCategory::VehicleCargo));
//! assert!(config.is_category_enabled(ProviderCategory::LootableContainer));
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::category::ProviderCategory;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`StorageConfig`].
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// `range` is NaN or infinite.
    #[error("range must be a finite number, got {0}")]
    InvalidRange(f32),

    /// A TTL is zero.
    #[error("{0} must be greater than zero")]
    ZeroTtl(&'static str),

    /// The item cache would outlive the context holding it.
    #[error("item_cache_ttl_ms ({item_ms}) must not exceed context_ttl_ms ({context_ms})")]
    ItemTtlExceedsContextTtl {
        /// Configured item-cache TTL.
        item_ms: u64,
        /// Configured context TTL.
        context_ms: u64,
    },
}

/// Which providers to pull from, how far, and how long results stay cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Maximum pull distance from the reference point. Zero or negative means
    /// unlimited.
    pub range: f32,
    /// Pull from collector devices.
    pub pull_from_collectors: bool,
    /// Pull from workstation output bins.
    pub pull_from_workstation_outputs: bool,
    /// Pull from lootable containers.
    pub pull_from_containers: bool,
    /// Pull from vehicle cargo holds.
    pub pull_from_vehicle_storage: bool,
    /// Restrict lootable containers to player-built storage.
    pub only_player_storage: bool,
    /// Lifetime of a context's discovered provider lists, in milliseconds.
    pub context_ttl_ms: u64,
    /// Lifetime of a context's derived item listing, in milliseconds.
    pub item_cache_ttl_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            range: -1.0,
            pull_from_collectors: true,
            pull_from_workstation_outputs: true,
            pull_from_containers: true,
            pull_from_vehicle_storage: true,
            only_player_storage: false,
            context_ttl_ms: 1000,
            item_cache_ttl_ms: 800,
        }
    }
}

impl StorageConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or a validation
    /// error from [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), ?config, "loaded storage config");
        Ok(config)
    }

    /// Checks invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.range.is_finite() {
            return Err(ConfigError::InvalidRange(self.range));
        }
        if self.context_ttl_ms == 0 {
            return Err(ConfigError::ZeroTtl("context_ttl_ms"));
        }
        if self.item_cache_ttl_ms == 0 {
            return Err(ConfigError::ZeroTtl("item_cache_ttl_ms"));
        }
        if self.item_cache_ttl_ms > self.context_ttl_ms {
            return Err(ConfigError::ItemTtlExceedsContextTtl {
                item_ms: self.item_cache_ttl_ms,
                context_ms: self.context_ttl_ms,
            });
        }
        Ok(())
    }

    /// Whether providers of `category` may be pulled from.
    #[must_use]
    pub fn is_category_enabled(&self, category: ProviderCategory) -> bool {
        match category {
            ProviderCategory::Collector => self.pull_from_collectors,
            ProviderCategory::WorkstationOutput => self.pull_from_workstation_outputs,
            ProviderCategory::LootableContainer => self.pull_from_containers,
            ProviderCategory::VehicleCargo => self.pull_from_vehicle_storage,
        }
    }

    /// Returns a copy with `category` enabled or disabled.
    #[must_use]
    pub fn with_category(mut self, category: ProviderCategory, enabled: bool) -> Self {
        let flag = match category {
            ProviderCategory::Collector => &mut self.pull_from_collectors,
            ProviderCategory::WorkstationOutput => &mut self.pull_from_workstation_outputs,
            ProviderCategory::LootableContainer => &mut self.pull_from_containers,
            ProviderCategory::VehicleCargo => &mut self.pull_from_vehicle_storage,
        };
        *flag = enabled;
        self
    }

    /// The range limit, or `None` when unlimited.
    #[must_use]
    pub fn effective_range(&self) -> Option<f32> {
        (self.range > 0.0).then_some(self.range)
    }

    /// Context lifetime as a [`Duration`].
    #[must_use]
    pub fn context_ttl(&self) -> Duration {
        Duration::from_millis(self.context_ttl_ms)
    }

    /// Item-cache lifetime as a [`Duration`].
    #[must_use]
    pub fn item_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.item_cache_ttl_ms)
    }
}
