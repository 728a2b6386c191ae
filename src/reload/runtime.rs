// src/reload/runtime.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, info, warn};

use crate::collect::WatchSet;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::launch::{Invocation, ProcessLauncher};

use super::core::{ReloaderCore, ReloaderState};

/// How long a non-zero exit waits for a stop request that raced it.
const STOP_GRACE: Duration = Duration::from_millis(100);

/// How a polling session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Watched files changed; the inner process has been stopped and the
    /// caller should restart.
    Changed(Vec<PathBuf>),
    /// Stop requested (Ctrl+C, SIGTERM, or the inner process was killed by
    /// a signal). No restart.
    Interrupted,
    /// The inner process exited with a non-zero code.
    Crashed {
        code: i32,
        last_changed: Vec<PathBuf>,
    },
}

/// Drives a [`ReloaderCore`] on a fixed interval while supervising the inner
/// process.
///
/// Each loop iteration waits for the first of:
/// 1. the shutdown signal,
/// 2. the inner process exiting,
/// 3. the next tick deadline.
///
/// in that priority order, so a shutdown that arrives while a tick is due is
/// honoured instead of a restart.
pub struct Reloader {
    core: ReloaderCore,
    interval: Duration,
}

impl fmt::Debug for Reloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reloader")
            .field("interval", &self.interval)
            .field("state", &self.core.state())
            .finish_non_exhaustive()
    }
}

impl Reloader {
    pub fn new(fs: Arc<dyn FileSystem>, watch_set: WatchSet, interval: Duration) -> Self {
        Self {
            core: ReloaderCore::new(fs, watch_set),
            interval,
        }
    }

    /// See [`ReloaderCore::with_last_changed`].
    pub fn with_last_changed(mut self, paths: Vec<PathBuf>) -> Self {
        self.core = self.core.with_last_changed(paths);
        self
    }

    pub fn core(&self) -> &ReloaderCore {
        &self.core
    }

    pub fn state(&self) -> ReloaderState {
        self.core.state()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one session: snapshot, start `target`, poll until something ends
    /// the session.
    ///
    /// A closed `shutdown` channel (sender dropped without sending) is not a
    /// shutdown request.
    pub async fn run<L: ProcessLauncher>(
        &mut self,
        launcher: &mut L,
        target: &Invocation,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Result<ReloadOutcome> {
        let interval = self.interval;
        let mut scope = self.core.enter()?;

        info!(
            watched = scope.watch_set().len(),
            interval_ms = interval.as_millis() as u64,
            "reloader running"
        );

        if let Err(e) = launcher.spawn_target(target) {
            scope.end(ReloaderState::Crashed);
            return Err(e);
        }

        let mut target_alive = true;
        let mut shutdown_open = true;
        let mut next_tick = Instant::now() + interval;

        let outcome = loop {
            tokio::select! {
                biased;

                res = &mut shutdown, if shutdown_open => {
                    match res {
                        Ok(()) => {
                            info!("shutdown requested");
                            break ReloadOutcome::Interrupted;
                        }
                        Err(_) => {
                            debug!("shutdown channel closed; ignoring");
                            shutdown_open = false;
                        }
                    }
                }

                exit = launcher.wait_target(), if target_alive => {
                    let exit = exit?;
                    target_alive = false;
                    match exit.code {
                        Some(0) => {
                            info!("supervised process finished; waiting for changes");
                        }
                        Some(code) => {
                            // A terminal Ctrl+C hits the inner process too and
                            // can land here before the signal task reports it.
                            if shutdown_open
                                && matches!(timeout(STOP_GRACE, &mut shutdown).await, Ok(Ok(())))
                            {
                                info!(code, "supervised process exited during shutdown");
                                break ReloadOutcome::Interrupted;
                            }
                            break ReloadOutcome::Crashed {
                                code,
                                last_changed: scope.last_changed().to_vec(),
                            };
                        }
                        None => {
                            info!("supervised process terminated by a signal");
                            break ReloadOutcome::Interrupted;
                        }
                    }
                }

                _ = sleep_until(next_tick) => {
                    // A stop request that raced the timer wins.
                    if shutdown_open {
                        match shutdown.try_recv() {
                            Ok(()) => {
                                info!("shutdown requested");
                                break ReloadOutcome::Interrupted;
                            }
                            Err(TryRecvError::Closed) => shutdown_open = false,
                            Err(TryRecvError::Empty) => {}
                        }
                    }

                    let report = scope.tick();
                    if !report.unreadable.is_empty() {
                        debug!(count = report.unreadable.len(), "paths unreadable this tick");
                    }
                    if report.has_changes() {
                        break ReloadOutcome::Changed(report.changed);
                    }
                    next_tick = Instant::now() + interval;
                }
            }
        };

        match &outcome {
            ReloadOutcome::Changed(paths) => {
                debug!(changed = ?paths, "change detected; stopping supervised process");
            }
            ReloadOutcome::Interrupted => scope.end(ReloaderState::Interrupted),
            ReloadOutcome::Crashed { code, last_changed } => {
                scope.end(ReloaderState::Crashed);
                warn!(code, last_changed = ?last_changed, "supervised process crashed");
            }
        }

        if target_alive {
            launcher.stop_target().await?;
        }

        Ok(outcome)
    }
}
