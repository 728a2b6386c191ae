// src/config/validate.rs

use std::time::Duration;

use crate::collect::IgnoreMatcher;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ReloadError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ReloadError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.reload))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_interval(cfg)?;
    validate_ignore_dirs(cfg)?;
    validate_extensions(cfg)?;
    // Compile once here so a bad pattern fails before anything is scanned.
    IgnoreMatcher::new(&cfg.reload.ignore_patterns)?;
    Ok(())
}

fn validate_interval(cfg: &RawConfigFile) -> Result<()> {
    let interval = cfg.reload.interval;
    let duration = Duration::try_from_secs_f64(interval).map_err(|e| {
        ReloadError::ConfigError(format!(
            "[reload].interval must be a positive number of seconds (got {interval}): {e}"
        ))
    })?;
    if duration.is_zero() {
        return Err(ReloadError::ConfigError(format!(
            "[reload].interval must be a positive number of seconds (got {interval})"
        )));
    }
    Ok(())
}

fn validate_ignore_dirs(cfg: &RawConfigFile) -> Result<()> {
    for dir in cfg.reload.ignore_dirs.iter() {
        if dir.trim().is_empty() {
            return Err(ReloadError::ConfigError(
                "[reload].ignore_dirs entries must not be empty".to_string(),
            ));
        }
        if dir.contains('/') || dir.contains('\\') {
            return Err(ReloadError::ConfigError(format!(
                "[reload].ignore_dirs takes bare directory names, not paths (got '{dir}')"
            )));
        }
    }
    Ok(())
}

fn validate_extensions(cfg: &RawConfigFile) -> Result<()> {
    let Some(ref exts) = cfg.reload.extensions else {
        return Ok(());
    };
    for ext in exts {
        if ext.trim_start_matches('.').is_empty() {
            return Err(ReloadError::ConfigError(
                "[reload].extensions entries must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}
