#![allow(dead_code)]

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use statreload::config::ReloadSettings;
use statreload::launch::Invocation;

/// Builder for `ReloadSettings` to simplify test setup.
///
/// Starts from the defaults with a fixed root so tests never scan the real
/// working directory.
pub struct ReloadSettingsBuilder {
    settings: ReloadSettings,
}

impl ReloadSettingsBuilder {
    pub fn new(root: &str) -> Self {
        Self {
            settings: ReloadSettings {
                root: Some(PathBuf::from(root)),
                ..ReloadSettings::default()
            },
        }
    }

    pub fn track(mut self, path: &str) -> Self {
        self.settings.track.push(PathBuf::from(path));
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.settings.ignore_patterns.push(pattern.to_string());
        self
    }

    pub fn ignore_dir(mut self, name: &str) -> Self {
        self.settings.ignore_dirs.push(name.to_string());
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.settings.interval = interval;
        self
    }

    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.settings.extensions = exts.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn all_files(self) -> Self {
        self.extensions(&[])
    }

    pub fn no_default_ignores(mut self) -> Self {
        self.settings.use_default_ignore_dirs = false;
        self
    }

    pub fn build(self) -> ReloadSettings {
        self.settings
    }
}

/// Invocation of a fake program with the given arguments and a small fixed
/// environment.
pub fn invocation(program: &str, args: &[&str]) -> Invocation {
    Invocation::new(
        program,
        args.iter().copied(),
        vec![
            (OsString::from("HOME"), OsString::from("/home/test")),
            (OsString::from("LANG"), OsString::from("C.UTF-8")),
        ],
    )
}
