// src/collect/mod.rs

//! Watch-set construction.
//!
//! This module is responsible for:
//! - Compiling ignore patterns (globs and `re:` regexes).
//! - Walking the scan root while pruning ignored directory names.
//! - Merging in explicitly tracked paths.
//! - Working out the entry file and scan root for a command line.
//!
//! It only reads the filesystem; it knows nothing about polling or processes.

pub mod collector;
pub mod patterns;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use collector::{collect, PathCollector, WatchSet};
pub use patterns::{IgnoreMatcher, REGEX_PREFIX};

use crate::config::ReloadSettings;
use crate::errors::Result;
use crate::fs::FileSystem;

/// First command-line argument naming an existing file, made absolute.
///
/// For `python app.py --port 80` this is `app.py`; for `cargo run` it is
/// `None`. The program itself is considered too, so `./server.sh` is found.
pub fn find_entry_file(fs: &dyn FileSystem, command: &[OsString]) -> Option<PathBuf> {
    command
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.components().next().is_some())
        .find(|p| fs.is_file(p))
        .map(|p| std::path::absolute(&p).unwrap_or(p))
}

/// Directory the scan starts from.
///
/// An explicit `root` setting wins; otherwise the entry file's directory;
/// otherwise the current working directory.
pub fn scan_root(settings: &ReloadSettings, entry_file: Option<&Path>) -> Result<PathBuf> {
    if let Some(ref root) = settings.root {
        return Ok(root.clone());
    }
    if let Some(parent) = entry_file.and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            return Ok(parent.to_path_buf());
        }
    }
    Ok(std::env::current_dir()?)
}
