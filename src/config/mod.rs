//! # Configuration and persistence (§6, ambient)
//!
//! A run's configuration document is a `toml` file (§6.1): particle
//! layout, boundary condition, Interaction/Local/Global/System lists and
//! the PRNG seed. Checkpointing a running `Simulation` uses `bincode` for
//! the fast binary path and `serde_json` for a human-diffable path,
//! following `examples/a-samea-vicseksim-rs/src/io/{bin,json}.rs`'s
//! `save_file`/`load_file`/`export_json` shape, generalized from that
//! module's `DataPersistence`-keyed file layout to a caller-supplied path
//! (a running simulation checkpoints to one fixed file per invocation, not
//! a growing per-entity archive).

pub mod xml;

use crate::error::{ConfigError, DynamoError};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Bumped whenever the on-disk configuration schema changes in a
/// backwards-incompatible way (§6.1, §7 `ConfigError::VersionMismatch`).
pub const CONFIG_VERSION: u32 = 1;

/// Top-level configuration document (§6.1). Holds everything
/// `Simulation::initialise` (§4.9) needs except the particle array itself,
/// which is stored separately so a single configuration can seed multiple
/// independent starting layouts from the packer (§4.9 step 1).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Configuration {
    pub version: u32,
    pub box_dimensions: crate::boundary::BoxDimensions,
    pub boundary: crate::boundary::BoundaryCondition,
    pub liouvillean: crate::liouvillean::Liouvillean,
    pub species: Vec<crate::species::Species>,
    pub interactions: crate::interactions::InteractionList,
    pub seed: u64,
    pub round_output: bool,
}

impl Configuration {
    /// Validates the schema version, per §6.1/§7.
    pub fn check_version(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch {
                expected: CONFIG_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, DynamoError> {
        toml::to_string_pretty(self)
            .map_err(|e| DynamoError::Config(ConfigError::Malformed(e.to_string())))
    }

    pub fn from_toml(text: &str) -> Result<Self, DynamoError> {
        let config: Configuration =
            toml::from_str(text).map_err(|e| DynamoError::Config(ConfigError::Malformed(e.to_string())))?;
        config.check_version().map_err(DynamoError::Config)?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, DynamoError> {
        let text = std::fs::read_to_string(path).map_err(DynamoError::Io)?;
        Self::from_toml(&text)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), DynamoError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DynamoError::Io)?;
        }
        std::fs::write(path, self.to_toml()?).map_err(DynamoError::Io)
    }
}

/// Writes `value` to `path` as a compact `bincode` checkpoint (fast path).
pub fn save_checkpoint<T: Serialize>(value: &T, path: &Path) -> Result<(), DynamoError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(DynamoError::Io)?;
    }
    let bytes = bincode::serialize(value)
        .map_err(|e| DynamoError::Config(ConfigError::Malformed(e.to_string())))?;
    std::fs::write(path, bytes).map_err(DynamoError::Io)
}

/// Reads a `bincode` checkpoint written by [`save_checkpoint`].
pub fn load_checkpoint<T: DeserializeOwned>(path: &Path) -> Result<T, DynamoError> {
    let bytes = std::fs::read(path).map_err(DynamoError::Io)?;
    bincode::deserialize(&bytes).map_err(|e| DynamoError::Config(ConfigError::Malformed(e.to_string())))
}

/// Writes `value` to `path` as pretty-printed JSON (human-diffable path,
/// e.g. for golden-file tests or manual inspection).
pub fn save_checkpoint_json<T: Serialize>(value: &T, path: &Path) -> Result<(), DynamoError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(DynamoError::Io)?;
    }
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| DynamoError::Config(ConfigError::Malformed(e.to_string())))?;
    std::fs::write(path, text).map_err(DynamoError::Io)
}
