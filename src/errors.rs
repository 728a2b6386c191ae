// src/errors.rs

//! Crate-wide error type and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReloadError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("failed to launch {program:?}: {source}")]
    LaunchError {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to restart {program:?}: {source}")]
    RestartError {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("target exited with code {0}")]
    TargetError(i32),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReloadError {
    /// Process exit code the binary should use for this error.
    ///
    /// - configuration problems: 2 (nothing was started)
    /// - target failures: the target's own code
    /// - a command that could not be launched: 127, as a shell would
    /// - everything else: 1
    pub fn exit_code(&self) -> i32 {
        match self {
            ReloadError::ConfigError(_)
            | ReloadError::InvalidPattern { .. }
            | ReloadError::TomlError(_) => 2,
            ReloadError::TargetError(code) => *code,
            ReloadError::LaunchError { .. } => 127,
            _ => 1,
        }
    }

    /// True for errors raised before any watch loop starts.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ReloadError::ConfigError(_)
                | ReloadError::InvalidPattern { .. }
                | ReloadError::TomlError(_)
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ReloadError>;
