// src/reload/snapshot.rs

//! Modification-time snapshots and the per-tick diff.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::collect::WatchSet;
use crate::fs::FileSystem;

/// Last observed state of one watched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    Present(SystemTime),
    Missing,
}

/// Whether moving from `previous` to `current` counts as a change.
///
/// - strictly newer mtime: change
/// - reappearing after being `Missing`: change
/// - disappearing: not a change (only a later re-creation triggers)
/// - first observation (`previous == None`): baseline, not a change
pub fn is_change(previous: Option<Stamp>, current: Stamp) -> bool {
    match (previous, current) {
        (Some(Stamp::Present(prev)), Stamp::Present(now)) => now > prev,
        (Some(Stamp::Missing), Stamp::Present(_)) => true,
        (None, Stamp::Present(_)) => false,
        (_, Stamp::Missing) => false,
    }
}

/// Result of comparing one poll against the stored snapshot.
///
/// All changes found in one tick are one aggregate event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub changed: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    /// Paths that could not be stat'ed this tick; treated as unchanged.
    pub unreadable: Vec<PathBuf>,
}

impl TickReport {
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Path → last observed [`Stamp`]. Keys are always members of the watch set
/// the snapshot was captured from.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    stamps: HashMap<PathBuf, Stamp>,
}

impl Snapshot {
    /// Record a baseline for every path in `watch_set`.
    ///
    /// Paths that cannot be stat'ed right now stay unknown and get their
    /// baseline on the first successful tick.
    pub fn capture(fs: &dyn FileSystem, watch_set: &WatchSet) -> Self {
        let mut snapshot = Snapshot::default();
        for path in watch_set.iter() {
            match stat(fs, path) {
                Some(stamp) => {
                    snapshot.stamps.insert(path.to_path_buf(), stamp);
                }
                None => debug!(path = ?path, "no baseline yet; stat failed"),
            }
        }
        snapshot
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<Stamp> {
        self.stamps.get(path).copied()
    }

    /// Re-stat every path, update the stored stamps and report what changed.
    pub fn refresh(&mut self, fs: &dyn FileSystem, watch_set: &WatchSet) -> TickReport {
        let mut report = TickReport::default();

        for path in watch_set.iter() {
            let Some(current) = stat(fs, path) else {
                report.unreadable.push(path.to_path_buf());
                continue;
            };

            let previous = self.stamps.insert(path.to_path_buf(), current);

            if is_change(previous, current) {
                report.changed.push(path.to_path_buf());
            } else if matches!(previous, Some(Stamp::Present(_))) && current == Stamp::Missing {
                info!(path = ?path, "watched file removed; waiting for it to reappear");
                report.removed.push(path.to_path_buf());
            }
        }

        report
    }
}

/// Stat one path. `None` means a transient failure.
fn stat(fs: &dyn FileSystem, path: &Path) -> Option<Stamp> {
    match fs.modified(path) {
        Ok(Some(mtime)) => Some(Stamp::Present(mtime)),
        Ok(None) => Some(Stamp::Missing),
        Err(e) => {
            debug!(path = ?path, error = %e, "stat failed; treating as unchanged this tick");
            None
        }
    }
}
