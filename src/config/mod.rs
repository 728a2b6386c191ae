// src/config/mod.rs

//! Configuration loading and validation for statreload.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and merge CLI overrides (`loader.rs`).
//! - Validate interval, ignore lists and patterns (`validate.rs`).
//! - Turn a validated file into runtime `ReloadSettings` (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_with_overrides, DEFAULT_CONFIG_FILE};
pub use model::{CliOverrides, ConfigFile, RawConfigFile, ReloadSection};
pub use settings::{ReloadSettings, DEFAULT_EXTENSIONS, DEFAULT_IGNORED_DIRS};
