// src/reload/mod.rs

//! Change detection and the restart loop.
//!
//! The pure core state machine lives in [`core`] (with the snapshot diff in
//! [`snapshot`]); the async shell that sleeps between ticks, watches the
//! inner process and listens for shutdown is in [`runtime`].

pub mod core;
pub mod runtime;
pub mod snapshot;

pub use core::{ReloaderCore, ReloaderState, WatchScope};
pub use runtime::{ReloadOutcome, Reloader};
pub use snapshot::{is_change, Snapshot, Stamp, TickReport};
