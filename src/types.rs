// src/types.rs

use std::ffi::OsStr;
use std::time::Duration;

/// Environment variable the supervisor adds to the inner process.
///
/// Only the exact value [`INNER_ROLE_VALUE`] marks a process as inner, so a
/// user-set variable with any other value is ignored.
pub const ROLE_ENV_VAR: &str = "STATRELOAD_ROLE";

/// Value of [`ROLE_ENV_VAR`] identifying the inner process.
pub const INNER_ROLE_VALUE: &str = "inner";

/// Environment variable carrying the paths whose change caused the last
/// restart, joined like `PATH`. Read back so a crash right after a reload can
/// name the edit that preceded it.
pub const CHANGED_ENV_VAR: &str = "STATRELOAD_CHANGED";

/// Default poll interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Which side of the reload split the current process is on.
///
/// - `Outer`: supervisor; collects paths, polls, restarts. Never runs the
///   target itself.
/// - `Inner`: runs the target directly and never starts a reloader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    Outer,
    Inner,
}

impl ProcessRole {
    /// Determine the role from the process environment.
    ///
    /// Meant to be called once at process start; the result is passed
    /// explicitly to [`crate::entry::LiveReload`].
    pub fn from_env() -> Self {
        Self::from_marker(std::env::var_os(ROLE_ENV_VAR).as_deref())
    }

    /// Role for a given raw marker value (`None` = variable unset).
    pub fn from_marker(value: Option<&OsStr>) -> Self {
        match value {
            Some(v) if v == OsStr::new(INNER_ROLE_VALUE) => ProcessRole::Inner,
            _ => ProcessRole::Outer,
        }
    }

    pub fn is_inner(self) -> bool {
        self == ProcessRole::Inner
    }
}
