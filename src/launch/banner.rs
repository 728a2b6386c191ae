// src/launch/banner.rs

//! The one-line startup banner.
//!
//! The format is relied upon by log scrapers; keep it stable:
//!
//! ```text
//! Starting statreload v0.1.0 live reloading (/abs/entry) on Mon March 02, 2026 - 14:03:11, press CTRL+C to quit
//! ```

use std::fmt::Display;
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};

pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `strftime` format of the banner timestamp.
pub const TIMESTAMP_FORMAT: &str = "%a %B %d, %Y - %X";

/// Key combination that stops the reloader on this platform.
pub fn quit_hint() -> &'static str {
    if cfg!(windows) { "CTRL+BREAK" } else { "CTRL+C" }
}

pub fn format_banner<Tz>(entry: &Path, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "Starting {PROGRAM_NAME} v{VERSION} live reloading ({}) on {}, press {} to quit",
        entry.display(),
        at.format(TIMESTAMP_FORMAT),
        quit_hint()
    )
}

/// Banner for "now", in local time.
pub fn startup_banner(entry: &Path) -> String {
    format_banner(entry, &Local::now())
}
