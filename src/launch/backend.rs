// src/launch/backend.rs

//! Pluggable process launcher abstraction.
//!
//! The reloader talks to a `ProcessLauncher` instead of spawning processes
//! itself. This makes it easy to swap in a fake launcher in tests while
//! keeping the production implementation here.
//!
//! - `RealLauncher` spawns the inner process with `tokio::process` and
//!   restarts by replacing the current process image.
//! - Tests can provide their own `ProcessLauncher` that records invocations
//!   and reports scripted exits.

use std::future::Future;
use std::pin::Pin;
use std::process::ExitStatus;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::errors::{ReloadError, Result};
use crate::launch::invocation::Invocation;
use crate::launch::terminal::ensure_echo_on;

/// How the inner process ended.
///
/// `code` is `None` when the process was terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetExit {
    pub code: Option<i32>,
}

impl TargetExit {
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for TargetExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Trait abstracting how the supervised process is started, watched and
/// replaced.
pub trait ProcessLauncher: Send {
    /// Start the inner process described by `invocation`.
    fn spawn_target(&mut self, invocation: &Invocation) -> Result<()>;

    /// Resolve once the inner process exits.
    ///
    /// Only meaningful after a successful `spawn_target`; the reloader does
    /// not poll it once an exit has been reported.
    fn wait_target(&mut self) -> Pin<Box<dyn Future<Output = Result<TargetExit>> + Send + '_>>;

    /// Kill and reap the inner process if it is still running.
    fn stop_target(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Replace the current process with `invocation`.
    ///
    /// Like `CommandExt::exec`, this only returns on failure, and the value
    /// returned is the reason.
    fn restart(&mut self, invocation: &Invocation) -> ReloadError;
}

/// Real launcher used in production.
#[derive(Debug, Default)]
pub struct RealLauncher {
    child: Option<Child>,
}

impl RealLauncher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessLauncher for RealLauncher {
    fn spawn_target(&mut self, invocation: &Invocation) -> Result<()> {
        ensure_echo_on();
        let mut cmd = Command::from(invocation.to_command());
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| ReloadError::LaunchError {
            program: invocation.program.clone(),
            source,
        })?;

        info!(
            program = ?invocation.program,
            pid = child.id(),
            "started supervised process"
        );
        self.child = Some(child);
        Ok(())
    }

    fn wait_target(&mut self) -> Pin<Box<dyn Future<Output = Result<TargetExit>> + Send + '_>> {
        Box::pin(async move {
            let Some(child) = self.child.as_mut() else {
                // Nothing to wait for.
                return std::future::pending().await;
            };
            let status = child.wait().await?;
            self.child = None;

            let exit = TargetExit::from(status);
            debug!(code = ?exit.code, "supervised process exited");
            Ok(exit)
        })
    }

    fn stop_target(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let Some(mut child) = self.child.take() else {
                return Ok(());
            };

            if let Some(status) = child.try_wait()? {
                debug!(code = ?status.code(), "supervised process had already exited");
                return Ok(());
            }

            debug!(pid = child.id(), "stopping supervised process");
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill supervised process");
                return Err(e.into());
            }
            Ok(())
        })
    }

    fn restart(&mut self, invocation: &Invocation) -> ReloadError {
        ensure_echo_on();
        replace_current_process(invocation)
    }
}

/// Replace the current process image with `invocation`.
///
/// Returns only if the replacement could not happen.
#[cfg(unix)]
pub fn replace_current_process(invocation: &Invocation) -> ReloadError {
    use std::os::unix::process::CommandExt;

    let source = invocation.to_command().exec();
    ReloadError::RestartError {
        program: invocation.program.clone(),
        source,
    }
}

/// Replace the current process image with `invocation`.
///
/// Without `exec`, the replacement is spawned and awaited, and its exit code
/// becomes this process's exit code. Returns only if the spawn fails.
#[cfg(not(unix))]
pub fn replace_current_process(invocation: &Invocation) -> ReloadError {
    match invocation.to_command().status() {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(source) => ReloadError::RestartError {
            program: invocation.program.clone(),
            source,
        },
    }
}
