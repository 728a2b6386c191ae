// src/lib.rs

pub mod cli;
pub mod collect;
pub mod config;
pub mod entry;
pub mod errors;
pub mod fs;
pub mod launch;
pub mod logging;
pub mod reload;
pub mod types;

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cli::CliArgs;
use crate::collect::WatchSet;
use crate::config::{load_with_overrides, ReloadSettings};
use crate::entry::{shutdown_signal, LiveReload};
use crate::errors::{ReloadError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::launch::{replace_current_process, Invocation, RealLauncher};
use crate::types::ProcessRole;

/// High-level entry point used by `main.rs`.
///
/// Returns the exit code for a clean stop. In the outer role this only
/// returns when stopped or on error; a detected change replaces the process.
/// In the inner role it replaces the process with the user's command.
pub async fn run(args: CliArgs) -> Result<i32> {
    let role = ProcessRole::from_env();
    let cfg = load_with_overrides(args.config.as_deref(), &args.overrides())?;
    let settings = ReloadSettings::from(&cfg);

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let entry_file = collect::find_entry_file(fs.as_ref(), &args.command);

    let invocation = Invocation::current()?;
    let mut live = LiveReload::new(role, settings.clone(), fs, RealLauncher::new(), invocation)
        .with_entry_file(entry_file);

    if args.dry_run {
        let watch_set = live.watch_set()?;
        print_dry_run(&settings, &watch_set);
        return Ok(0);
    }

    let command = args.command.clone();
    match live.run(shutdown_signal(), move || exec_command(&command)).await? {
        Some(err) => Err(err),
        None => Ok(0),
    }
}

/// Become the user's command. Only returns on failure.
fn exec_command(command: &[OsString]) -> ReloadError {
    let invocation = match Invocation::from_command(command) {
        Ok(inv) => inv.with_last_changed(&[]).with_role(ProcessRole::Outer),
        Err(e) => return e,
    };
    debug!(program = ?invocation.program, "replacing inner process with command");

    match replace_current_process(&invocation) {
        ReloadError::RestartError { program, source } => ReloadError::LaunchError { program, source },
        other => other,
    }
}

/// Print the effective settings and every watched path.
fn print_dry_run(settings: &ReloadSettings, watch_set: &WatchSet) {
    println!("statreload dry-run");
    println!("  interval = {:?}", settings.interval);
    if let Some(ref root) = settings.root {
        println!("  root = {}", root.display());
    }
    if settings.extensions.is_empty() {
        println!("  extensions = (all files)");
    } else {
        println!("  extensions = {}", settings.extensions.join(", "));
    }
    println!("  ignore_dirs = {}", settings.effective_ignore_dirs().join(", "));
    if !settings.ignore_patterns.is_empty() {
        println!("  ignore = {:?}", settings.ignore_patterns);
    }
    if !settings.track.is_empty() {
        let tracked: Vec<_> = settings.track.iter().map(|p| p.display().to_string()).collect();
        println!("  track = {tracked:?}");
    }
    println!();

    println!("watching ({}):", watch_set.len());
    for path in watch_set.iter() {
        println!("  {}", display_path(path));
    }

    debug!("dry-run complete (nothing started)");
}

fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(|p| p.display().to_string()))
        .unwrap_or_else(|| path.display().to_string())
}
