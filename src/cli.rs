// src/cli.rs

//! CLI argument parsing using `clap`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::CliOverrides;

/// Command-line arguments for `statreload`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "statreload",
    version,
    about = "Restart a program whenever its source files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML).
    ///
    /// Default: `Statreload.toml` in the current directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Extra file or directory to watch; bypasses ignore patterns.
    #[arg(short = 't', long = "track", value_name = "PATH")]
    pub track: Vec<PathBuf>,

    /// Glob (or `re:<regex>`) for files to ignore.
    #[arg(short = 'i', long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Directory name to skip at any depth.
    #[arg(short = 'd', long = "ignore-dir", value_name = "NAME")]
    pub ignore_dirs: Vec<String>,

    /// Seconds between polls.
    #[arg(short = 'n', long, value_name = "SECONDS")]
    pub interval: Option<f64>,

    /// Extensions picked up by the scan (comma separated).
    #[arg(short = 'e', long = "ext", value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Watch every file in the scan, whatever its extension.
    #[arg(long, conflicts_with = "extensions")]
    pub all_files: bool,

    /// Directory to scan instead of the entry file's directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Do not skip `.git`, `target`, `node_modules`, ... by default.
    #[arg(long)]
    pub no_default_ignores: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STATRELOAD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the settings and the watched files, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// The program to run and its arguments, after `--`.
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<OsString>,
}

impl CliArgs {
    pub fn overrides(&self) -> CliOverrides {
        let extensions = if self.all_files {
            Some(Vec::new())
        } else if self.extensions.is_empty() {
            None
        } else {
            Some(self.extensions.clone())
        };

        CliOverrides {
            track: self.track.clone(),
            ignore_patterns: self.ignore_patterns.clone(),
            ignore_dirs: self.ignore_dirs.clone(),
            interval: self.interval,
            extensions,
            no_default_ignores: self.no_default_ignores,
            root: self.root.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
