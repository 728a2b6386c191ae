// src/launch/mod.rs

//! Process launching and replacement.
//!
//! - [`invocation`] captures `argv` + environment byte-for-byte and adds the
//!   role marker.
//! - [`backend`] provides the `ProcessLauncher` trait and the production
//!   `RealLauncher`, which tests replace with a fake.
//! - [`banner`] formats the startup line.
//! - [`terminal`] restores terminal echo before each launch.

pub mod backend;
pub mod banner;
pub mod invocation;
pub mod terminal;

pub use backend::{replace_current_process, ProcessLauncher, RealLauncher, TargetExit};
pub use banner::startup_banner;
pub use invocation::Invocation;
pub use terminal::ensure_echo_on;
