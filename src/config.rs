// src/config.rs

//! Configuration loading utilities.
//!
//! This module combines the optional TOML config file with the run settings
//! from the environment, and picks the snapshot store they describe.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{Config, RunConfig};
use crate::storage::LocalSnapshotStore;

#[cfg(feature = "s3")]
use crate::storage::s3::S3SnapshotStore;

/// Config loader for the Lambda environment.
///
/// Reads `config.toml` from the snapshot bucket under a prefix; a missing
/// file means defaults.
#[cfg(feature = "s3")]
pub struct LambdaConfigLoader {
    storage: S3SnapshotStore,
    prefix: String,
}

#[cfg(feature = "s3")]
impl LambdaConfigLoader {
    pub fn new(storage: S3SnapshotStore, config_prefix: &str) -> Self {
        Self {
            storage,
            prefix: config_prefix.trim_matches('/').to_string(),
        }
    }

    fn key(&self, file_name: &str) -> String {
        if self.prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.prefix, file_name)
        }
    }

    pub async fn load_config(&self) -> Result<Config> {
        let key = self.key("config.toml");
        log::info!("Loading config file from S3: {}", key);
        let Some(bytes) = self.storage.read_bytes_optional(&key).await? else {
            log::info!("No config file in S3, using defaults");
            return Ok(Config::default());
        };

        let s = String::from_utf8(bytes).map_err(|e| {
            AppError::config(format!("Config file {} is not valid UTF-8: {}", key, e))
        })?;
        Config::from_toml(&s)
    }
}

/// Load the config file (or defaults) and the run settings, and validate them.
///
/// Only a missing file falls back to defaults; a file that cannot be read or
/// parsed is an error.
pub fn load_all(config_path: &Path) -> Result<(Config, RunConfig)> {
    let config = if config_path.exists() {
        Config::load(config_path).map_err(|e| {
            AppError::config(format!("Cannot load {}: {e}", config_path.display()))
        })?
    } else {
        log::debug!("No config file at {}, using defaults", config_path.display());
        Config::default()
    };
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid config {}: {e}", config_path.display())))?;

    let run = RunConfig::from_env()?;
    Ok((config, run))
}

/// Snapshot file for this run: `STATE_FILE` wins over `storage.state_file`.
pub fn state_file(config: &Config, run: Option<&RunConfig>) -> PathBuf {
    run.and_then(|r| r.state_file.clone())
        .unwrap_or_else(|| config.storage.state_file.clone())
}

/// The local snapshot store described by the configuration.
pub fn local_store(config: &Config, run: Option<&RunConfig>) -> LocalSnapshotStore {
    LocalSnapshotStore::new(state_file(config, run))
}
