// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{CliOverrides, ConfigFile, RawConfigFile};
use crate::errors::{ReloadError, Result};

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "Statreload.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the effective configuration for a run.
///
/// - `Some(path)`: the file must exist.
/// - `None`: [`DEFAULT_CONFIG_FILE`] is used when present, built-in defaults
///   otherwise.
///
/// CLI overrides are applied before validation so an invalid flag value is
/// reported the same way as an invalid file value.
pub fn load_with_overrides(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<ConfigFile> {
    let mut raw = match path {
        Some(path) => {
            if !path.is_file() {
                return Err(ReloadError::ConfigError(format!(
                    "config file {:?} does not exist",
                    path
                )));
            }
            load_from_path(path)?
        }
        None => {
            let default = default_config_path();
            if default.is_file() {
                debug!(path = ?default, "using config file from working directory");
                load_from_path(&default)?
            } else {
                RawConfigFile::default()
            }
        }
    };

    raw.apply_overrides(overrides);
    ConfigFile::try_from(raw)
}

/// Helper to resolve a default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
