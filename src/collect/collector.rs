// src/collect/collector.rs

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::collect::patterns::IgnoreMatcher;
use crate::config::ReloadSettings;
use crate::errors::{ReloadError, Result};
use crate::fs::FileSystem;

/// Absolute paths monitored by one reloader session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSet {
    paths: BTreeSet<PathBuf>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    fn insert(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }
}

impl FromIterator<PathBuf> for WatchSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

/// How a directory walk filters what it finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    /// Root scan: extension filter + ignore patterns + ignore dirs.
    Filtered,
    /// Explicitly tracked directory: only ignore dirs apply.
    Tracked,
}

/// Builds the [`WatchSet`] for a session.
///
/// The scan starts at `root`, prunes any directory whose name is listed in
/// the ignore dirs, keeps files with a watched extension that no ignore
/// pattern matches, and finally adds the explicitly tracked paths, which
/// bypass the ignore patterns.
#[derive(Debug)]
pub struct PathCollector<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    track: Vec<PathBuf>,
    ignore: IgnoreMatcher,
    ignore_dirs: HashSet<String>,
    extensions: Vec<String>,
}

impl<'a> PathCollector<'a> {
    /// Validate inputs and compile patterns.
    ///
    /// Fails with a configuration error when a pattern is malformed or the
    /// root is not a readable directory.
    pub fn new(fs: &'a dyn FileSystem, root: &Path, settings: &ReloadSettings) -> Result<Self> {
        let ignore = IgnoreMatcher::new(&settings.ignore_patterns)?;

        let root = fs.canonicalize(root).map_err(|e| {
            ReloadError::ConfigError(format!("scan root {:?} is not readable: {e:#}", root))
        })?;
        if !fs.is_dir(&root) {
            return Err(ReloadError::ConfigError(format!(
                "scan root {:?} is not a directory",
                root
            )));
        }

        let track = settings
            .track
            .iter()
            .map(|p| absolutize(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            fs,
            root,
            track,
            ignore,
            ignore_dirs: settings.effective_ignore_dirs().into_iter().collect(),
            extensions: settings.extensions.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the filesystem and return the watch set.
    pub fn collect(&self) -> Result<WatchSet> {
        let mut set = WatchSet::new();

        // The root listing must succeed; deeper failures are only skipped.
        self.fs.read_dir(&self.root).map_err(|e| {
            ReloadError::ConfigError(format!("cannot list scan root {:?}: {e:#}", self.root))
        })?;
        self.walk(&self.root, ScanMode::Filtered, &mut set);
        let scanned = set.len();

        for path in &self.track {
            if self.fs.is_file(path) {
                set.insert(path.clone());
            } else if self.fs.is_dir(path) {
                self.walk(path, ScanMode::Tracked, &mut set);
            } else {
                debug!(path = ?path, "tracked path does not exist; skipping");
            }
        }

        debug!(
            root = ?self.root,
            scanned,
            total = set.len(),
            "collected watch set"
        );
        Ok(set)
    }

    fn walk(&self, start: &Path, mode: ScanMode, set: &mut WatchSet) {
        let mut stack = vec![start.to_path_buf()];
        let mut visited: HashSet<PathBuf> = HashSet::new();

        while let Some(dir) = stack.pop() {
            // Guard against symlink cycles.
            let key = self.fs.canonicalize(&dir).unwrap_or_else(|_| dir.clone());
            if !visited.insert(key) {
                continue;
            }

            let entries = match self.fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = ?dir, error = %e, "skipping unreadable directory");
                    continue;
                }
            };

            for path in entries {
                if self.fs.is_dir(&path) {
                    if !self.is_ignored_dir(&path) {
                        stack.push(path);
                    }
                } else if self.fs.is_file(&path) && self.accepts_file(&path, mode) {
                    set.insert(path);
                }
            }
        }
    }

    fn is_ignored_dir(&self, dir: &Path) -> bool {
        dir.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.ignore_dirs.contains(name))
    }

    fn accepts_file(&self, path: &Path, mode: ScanMode) -> bool {
        match mode {
            ScanMode::Tracked => true,
            ScanMode::Filtered => {
                self.has_watched_extension(path) && !self.ignore.matches_file(&self.root, path)
            }
        }
    }

    fn has_watched_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|w| *w == ext)
            })
    }
}

/// Convenience: build a collector and run it.
pub fn collect(fs: &dyn FileSystem, root: &Path, settings: &ReloadSettings) -> Result<WatchSet> {
    PathCollector::new(fs, root, settings)?.collect()
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::path::absolute(path)?)
    }
}
