// src/reload/core.rs

//! Pure reloader state machine.
//!
//! [`ReloaderCore`] owns the watch set and the snapshot and knows how to
//! diff one tick. It has no timers, no channels and no processes; the async
//! shell in [`super::runtime`] drives it.
//!
//! States:
//!
//! ```text
//! Idle -> Running -> (Changed | Interrupted | Crashed) -> Terminated
//! ```
//!
//! `Running` only exists inside a [`WatchScope`]. Dropping the scope, on any
//! path out of the loop, releases the snapshot and lands in `Terminated`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::collect::WatchSet;
use crate::errors::{ReloadError, Result};
use crate::fs::FileSystem;
use crate::reload::snapshot::{Snapshot, TickReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloaderState {
    Idle,
    Running,
    Changed,
    Interrupted,
    Crashed,
    Terminated,
}

impl ReloaderState {
    /// States a running session may end in.
    pub fn is_session_end(self) -> bool {
        matches!(
            self,
            ReloaderState::Changed | ReloaderState::Interrupted | ReloaderState::Crashed
        )
    }
}

#[derive(Debug)]
pub struct ReloaderCore {
    fs: Arc<dyn FileSystem>,
    watch_set: WatchSet,
    snapshot: Option<Snapshot>,
    state: ReloaderState,
    /// How the session ended, kept after the move to `Terminated`.
    exit_state: Option<ReloaderState>,
    last_changed: Vec<PathBuf>,
}

impl ReloaderCore {
    pub fn new(fs: Arc<dyn FileSystem>, watch_set: WatchSet) -> Self {
        Self {
            fs,
            watch_set,
            snapshot: None,
            state: ReloaderState::Idle,
            exit_state: None,
            last_changed: Vec::new(),
        }
    }

    /// Seed the paths reported on a crash before this session sees any
    /// change of its own (e.g. the edit that caused the restart).
    pub fn with_last_changed(mut self, paths: Vec<PathBuf>) -> Self {
        self.last_changed = paths;
        self
    }

    pub fn state(&self) -> ReloaderState {
        self.state
    }

    /// `Changed`, `Interrupted` or `Crashed` once a session has ended
    /// through one of them; `None` while idle/running or after an abrupt
    /// release.
    pub fn exit_state(&self) -> Option<ReloaderState> {
        self.exit_state
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Paths reported by the most recent tick that saw a change.
    pub fn last_changed(&self) -> &[PathBuf] {
        &self.last_changed
    }

    /// Enter the watch scope: take the initial snapshot and start running.
    ///
    /// A core is single-use; entering it a second time is an error.
    pub fn enter(&mut self) -> Result<WatchScope<'_>> {
        if self.state != ReloaderState::Idle {
            return Err(ReloadError::Other(anyhow!(
                "reloader session cannot be re-entered (state {:?})",
                self.state
            )));
        }

        let snapshot = Snapshot::capture(self.fs.as_ref(), &self.watch_set);
        debug!(
            watched = self.watch_set.len(),
            baselined = snapshot.len(),
            "initial snapshot taken"
        );
        self.snapshot = Some(snapshot);
        self.state = ReloaderState::Running;

        Ok(WatchScope { core: self })
    }

    fn release(&mut self) {
        self.snapshot = None;
        if self.state.is_session_end() {
            self.exit_state = Some(self.state);
        } else if self.state == ReloaderState::Running {
            warn!("watch scope released while still running");
        }
        self.state = ReloaderState::Terminated;
    }
}

/// RAII guard for a running session. See the module docs.
#[derive(Debug)]
pub struct WatchScope<'a> {
    core: &'a mut ReloaderCore,
}

impl WatchScope<'_> {
    pub fn state(&self) -> ReloaderState {
        self.core.state
    }

    pub fn last_changed(&self) -> &[PathBuf] {
        &self.core.last_changed
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.core.watch_set
    }

    /// Poll every watched path once.
    ///
    /// A tick with at least one change moves the session to `Changed`;
    /// further ticks are no-ops.
    pub fn tick(&mut self) -> TickReport {
        let core = &mut *self.core;
        if core.state != ReloaderState::Running {
            return TickReport::default();
        }
        let Some(snapshot) = core.snapshot.as_mut() else {
            return TickReport::default();
        };

        let report = snapshot.refresh(core.fs.as_ref(), &core.watch_set);
        if report.has_changes() {
            core.last_changed = report.changed.clone();
            core.state = ReloaderState::Changed;
        }
        report
    }

    /// End the session as `Interrupted` or `Crashed`.
    pub fn end(&mut self, state: ReloaderState) {
        debug_assert!(state.is_session_end());
        if self.core.state == ReloaderState::Running {
            self.core.state = state;
        }
    }
}

impl Drop for WatchScope<'_> {
    fn drop(&mut self) {
        self.core.release();
    }
}
