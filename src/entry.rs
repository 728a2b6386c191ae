// src/entry.rs

//! The role-aware entry point.
//!
//! The same program runs twice. The outer copy scans for files, starts the
//! inner copy with the role marker set, and polls. The inner copy skips all
//! of that and just runs the target.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::collect::{self, WatchSet};
use crate::config::ReloadSettings;
use crate::errors::{ReloadError, Result};
use crate::fs::FileSystem;
use crate::launch::{startup_banner, Invocation, ProcessLauncher};
use crate::reload::{ReloadOutcome, Reloader};
use crate::types::ProcessRole;

/// Wraps a target so that it restarts whenever a watched file changes.
pub struct LiveReload<L: ProcessLauncher> {
    role: ProcessRole,
    settings: ReloadSettings,
    fs: Arc<dyn FileSystem>,
    launcher: L,
    invocation: Invocation,
    entry_file: Option<PathBuf>,
}

impl<L: ProcessLauncher> LiveReload<L> {
    /// `invocation` is how this process was started; the inner copy gets the
    /// same argv and environment plus the role marker.
    pub fn new(
        role: ProcessRole,
        settings: ReloadSettings,
        fs: Arc<dyn FileSystem>,
        launcher: L,
        invocation: Invocation,
    ) -> Self {
        Self {
            role,
            settings,
            fs,
            launcher,
            invocation,
            entry_file: None,
        }
    }

    /// File named in the banner and whose directory is scanned when no root
    /// is configured.
    pub fn with_entry_file(mut self, entry_file: Option<PathBuf>) -> Self {
        self.entry_file = entry_file;
        self
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Run `target` under live reload.
    ///
    /// - Inner role: calls `target` and returns `Some` of its result.
    /// - Outer role: never calls `target`. Returns `Ok(None)` when stopped
    ///   by `shutdown`, `TargetError` when the inner copy fails, and
    ///   otherwise only returns if restarting failed.
    pub async fn run<F, T>(&mut self, shutdown: oneshot::Receiver<()>, target: F) -> Result<Option<T>>
    where
        F: FnOnce() -> T,
    {
        if self.role.is_inner() {
            debug!("inner role; running target");
            return Ok(Some(target()));
        }

        self.supervise(shutdown).await?;
        Ok(None)
    }

    /// Collect the watch set for the configured root.
    pub fn watch_set(&self) -> Result<WatchSet> {
        let root = collect::scan_root(&self.settings, self.entry_file.as_deref())?;
        collect::collect(self.fs.as_ref(), &root, &self.settings)
    }

    async fn supervise(&mut self, shutdown: oneshot::Receiver<()>) -> Result<()> {
        let watch_set = self.watch_set()?;
        if watch_set.is_empty() {
            warn!("no files to watch; changes will never trigger a reload");
        }

        let shown = self
            .entry_file
            .as_ref()
            .unwrap_or(&self.invocation.program);
        eprintln!("{}", startup_banner(shown));

        let inner = self
            .invocation
            .clone()
            .with_last_changed(&[])
            .with_role(ProcessRole::Inner);
        let mut reloader = Reloader::new(self.fs.clone(), watch_set, self.settings.interval)
            .with_last_changed(self.invocation.last_changed());

        match reloader.run(&mut self.launcher, &inner, shutdown).await? {
            ReloadOutcome::Changed(paths) => {
                match paths.split_first() {
                    Some((first, [])) => info!("Changes detected in {}, reloading", first.display()),
                    Some((first, rest)) => info!(
                        "Changes detected in {} (and {} more), reloading",
                        first.display(),
                        rest.len()
                    ),
                    None => info!("Changes detected, reloading"),
                }
                let next = self.invocation.clone().with_last_changed(&paths);
                let err = self.launcher.restart(&next);
                error!(error = %err, "could not restart");
                Err(err)
            }
            ReloadOutcome::Interrupted => {
                info!("stopped");
                Ok(())
            }
            ReloadOutcome::Crashed { code, last_changed } => {
                if !last_changed.is_empty() {
                    let paths: Vec<_> =
                        last_changed.iter().map(|p| p.display().to_string()).collect();
                    error!(code, "exited after changes in {}", paths.join(", "));
                }
                Err(ReloadError::TargetError(code))
            }
        }
    }
}

/// Resolve once Ctrl+C is received, or SIGTERM on Unix, or Ctrl+Break on
/// Windows.
///
/// If no handler can be installed the sender is dropped, which the reloader
/// treats as "never".
pub fn shutdown_signal() -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        if wait_for_stop().await {
            let _ = tx.send(());
        }
    });
    rx
}

#[cfg(unix)]
async fn wait_for_stop() -> bool {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGTERM");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        ok = ctrl_c() => ok,
        _ = term.recv() => true,
    }
}

#[cfg(windows)]
async fn wait_for_stop() -> bool {
    let mut ctrl_break = match tokio::signal::windows::ctrl_break() {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to listen for Ctrl+Break");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        ok = ctrl_c() => ok,
        _ = ctrl_break.recv() => true,
    }
}

#[cfg(not(any(unix, windows)))]
async fn wait_for_stop() -> bool {
    ctrl_c().await
}

async fn ctrl_c() -> bool {
    match tokio::signal::ctrl_c().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "failed to listen for Ctrl+C");
            false
        }
    }
}
