use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use statreload::errors::{ReloadError, Result};
use statreload::launch::{Invocation, ProcessLauncher, TargetExit};

/// What a [`FakeLauncher`] was asked to do.
#[derive(Debug, Default, Clone)]
pub struct LaunchRecord {
    pub spawned: Vec<Invocation>,
    pub restarted: Vec<Invocation>,
    pub stopped: usize,
}

/// A fake launcher that:
/// - records spawned and restarted invocations
/// - never starts a real process
/// - reports an exit only when the test sends one through [`ExitHandle`].
///
/// `restart` cannot replace the test process, so it records the request and
/// returns a `RestartError`, the same thing a failed `exec` returns.
pub struct FakeLauncher {
    record: Arc<Mutex<LaunchRecord>>,
    exits: mpsc::UnboundedReceiver<TargetExit>,
    fail_spawn: bool,
}

/// Sends scripted exits to a [`FakeLauncher`].
#[derive(Clone)]
pub struct ExitHandle {
    tx: mpsc::UnboundedSender<TargetExit>,
}

impl ExitHandle {
    /// Make the running target exit with `code` (`None` = killed by a signal).
    pub fn exit(&self, code: Option<i32>) {
        let _ = self.tx.send(TargetExit { code });
    }
}

impl FakeLauncher {
    pub fn new() -> (Self, ExitHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let launcher = Self {
            record: Arc::new(Mutex::new(LaunchRecord::default())),
            exits: rx,
            fail_spawn: false,
        };
        (launcher, ExitHandle { tx })
    }

    /// Launcher whose `spawn_target` fails like a missing executable.
    pub fn failing() -> Self {
        let (mut launcher, _handle) = Self::new();
        launcher.fail_spawn = true;
        launcher
    }

    /// Shared view of the record; stays valid after the launcher is moved.
    pub fn record(&self) -> Arc<Mutex<LaunchRecord>> {
        Arc::clone(&self.record)
    }

    pub fn snapshot(&self) -> LaunchRecord {
        self.record.lock().unwrap().clone()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn spawn_target(&mut self, invocation: &Invocation) -> Result<()> {
        if self.fail_spawn {
            return Err(ReloadError::LaunchError {
                program: invocation.program.clone(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        self.record.lock().unwrap().spawned.push(invocation.clone());
        Ok(())
    }

    fn wait_target(&mut self) -> Pin<Box<dyn Future<Output = Result<TargetExit>> + Send + '_>> {
        Box::pin(async move {
            match self.exits.recv().await {
                Some(exit) => Ok(exit),
                // All handles dropped: the target runs forever.
                None => std::future::pending().await,
            }
        })
    }

    fn stop_target(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.record.lock().unwrap().stopped += 1;
            Ok(())
        })
    }

    fn restart(&mut self, invocation: &Invocation) -> ReloadError {
        self.record.lock().unwrap().restarted.push(invocation.clone());
        ReloadError::RestartError {
            program: invocation.program.clone(),
            source: io::Error::new(io::ErrorKind::Unsupported, "fake launcher cannot exec"),
        }
    }
}
