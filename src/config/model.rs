// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [reload]
/// interval = 0.5
/// track = ["config/app.yaml"]
/// ignore_patterns = ["*.log", "re:^tmp_.*"]
/// ignore_dirs = ["_static"]
/// extensions = ["rs", "toml"]
/// use_default_ignore_dirs = true
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub reload: ReloadSection,
}

/// `[reload]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReloadSection {
    /// Seconds between two polls. Must be positive.
    #[serde(default = "default_interval_secs")]
    pub interval: f64,

    /// Files (or directories) always watched, regardless of ignore patterns.
    #[serde(default)]
    pub track: Vec<PathBuf>,

    /// Glob patterns, or regexes prefixed with `re:`, for files to skip.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Bare directory names pruned at any depth.
    #[serde(default)]
    pub ignore_dirs: Vec<String>,

    /// Extensions picked up by the directory scan.
    ///
    /// `None` uses the built-in source extensions; an empty list accepts
    /// every file.
    #[serde(default)]
    pub extensions: Option<Vec<String>>,

    /// Whether the built-in ignore directories (`.git`, `target`, ...) apply.
    #[serde(default = "default_true")]
    pub use_default_ignore_dirs: bool,

    /// Scan root; defaults to the directory of the entry file.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

fn default_interval_secs() -> f64 {
    crate::types::DEFAULT_INTERVAL.as_secs_f64()
}

fn default_true() -> bool {
    true
}

impl Default for ReloadSection {
    fn default() -> Self {
        Self {
            interval: default_interval_secs(),
            track: Vec::new(),
            ignore_patterns: Vec::new(),
            ignore_dirs: Vec::new(),
            extensions: None,
            use_default_ignore_dirs: true,
            root: None,
        }
    }
}

/// Overrides coming from the command line.
///
/// List flags are appended to the file's lists; scalar flags replace the
/// file's values.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub track: Vec<PathBuf>,
    pub ignore_patterns: Vec<String>,
    pub ignore_dirs: Vec<String>,
    pub interval: Option<f64>,
    pub extensions: Option<Vec<String>>,
    pub no_default_ignores: bool,
    pub root: Option<PathBuf>,
}

impl RawConfigFile {
    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        let reload = &mut self.reload;
        reload.track.extend(overrides.track.iter().cloned());
        reload
            .ignore_patterns
            .extend(overrides.ignore_patterns.iter().cloned());
        reload
            .ignore_dirs
            .extend(overrides.ignore_dirs.iter().cloned());
        if let Some(interval) = overrides.interval {
            reload.interval = interval;
        }
        if let Some(ref exts) = overrides.extensions {
            reload.extensions = Some(exts.clone());
        }
        if overrides.no_default_ignores {
            reload.use_default_ignore_dirs = false;
        }
        if let Some(ref root) = overrides.root {
            reload.root = Some(root.clone());
        }
    }
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>`, so holding one means
/// the interval is positive and every ignore pattern compiles.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    reload: ReloadSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(reload: ReloadSection) -> Self {
        Self { reload }
    }

    pub fn reload_section(&self) -> &ReloadSection {
        &self.reload
    }

    /// Poll interval. Validation guarantees the value converts; anything
    /// else falls back to the default.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.reload.interval)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(crate::types::DEFAULT_INTERVAL)
    }
}
