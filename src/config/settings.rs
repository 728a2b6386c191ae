// src/config/settings.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::ConfigFile;
use crate::types::DEFAULT_INTERVAL;

/// Extensions picked up by the directory scan when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["rs", "toml", "py", "pyw", "js", "ts", "go", "rb", "sh"];

/// Directory names never descended into unless disabled.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    "node_modules",
    "target",
];

/// Runtime view of the reload configuration.
///
/// This is what the collector and the reloader consume; it is built from a
/// validated [`ConfigFile`] or directly (library use, tests).
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadSettings {
    pub track: Vec<PathBuf>,
    pub ignore_patterns: Vec<String>,
    pub ignore_dirs: Vec<String>,
    pub interval: Duration,
    /// Normalised extensions (no leading dot, lowercase). Empty = all files.
    pub extensions: Vec<String>,
    pub use_default_ignore_dirs: bool,
    pub root: Option<PathBuf>,
}

impl Default for ReloadSettings {
    fn default() -> Self {
        Self {
            track: Vec::new(),
            ignore_patterns: Vec::new(),
            ignore_dirs: Vec::new(),
            interval: DEFAULT_INTERVAL,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            use_default_ignore_dirs: true,
            root: None,
        }
    }
}

impl ReloadSettings {
    /// Every directory name the scan prunes, defaults included.
    pub fn effective_ignore_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = if self.use_default_ignore_dirs {
            DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };
        for dir in &self.ignore_dirs {
            if !dirs.contains(dir) {
                dirs.push(dir.clone());
            }
        }
        dirs
    }
}

impl From<&ConfigFile> for ReloadSettings {
    fn from(cfg: &ConfigFile) -> Self {
        let section = cfg.reload_section();
        let extensions = match section.extensions {
            Some(ref exts) => exts.iter().map(|e| normalise_extension(e)).collect(),
            None => DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            track: section.track.clone(),
            ignore_patterns: section.ignore_patterns.clone(),
            ignore_dirs: section.ignore_dirs.clone(),
            interval: cfg.interval(),
            extensions,
            use_default_ignore_dirs: section.use_default_ignore_dirs,
            root: section.root.clone(),
        }
    }
}

fn normalise_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}
