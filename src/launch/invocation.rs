// src/launch/invocation.rs

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::errors::{ReloadError, Result};
use crate::types::{ProcessRole, CHANGED_ENV_VAR, INNER_ROLE_VALUE, ROLE_ENV_VAR};

/// A complete process invocation: what to run, with which `argv` and which
/// environment.
///
/// Arguments are kept as `OsString` so a relaunch reproduces them
/// byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable to run (absolute for the current process; may be a bare
    /// name resolved through `PATH` for user commands).
    pub program: PathBuf,
    /// `argv[0]` as originally seen by the process.
    pub arg0: OsString,
    /// `argv[1..]`.
    pub args: Vec<OsString>,
    /// Full environment, in the order it was captured.
    pub env: Vec<(OsString, OsString)>,
}

impl Invocation {
    /// Capture how the current process was started.
    pub fn current() -> Result<Self> {
        let program = std::env::current_exe()?;
        let mut argv = std::env::args_os();
        let arg0 = argv
            .next()
            .unwrap_or_else(|| program.clone().into_os_string());
        Ok(Self {
            program,
            arg0,
            args: argv.collect(),
            env: std::env::vars_os().collect(),
        })
    }

    /// Build an invocation from explicit parts.
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I, env: Vec<(OsString, OsString)>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let program = program.into();
        Self {
            arg0: program.clone().into_os_string(),
            program,
            args: args.into_iter().map(Into::into).collect(),
            env,
        }
    }

    /// Invocation of a user command line (`program arg...`) under the
    /// current environment.
    pub fn from_command(command: &[OsString]) -> Result<Self> {
        let Some((program, args)) = command.split_first() else {
            return Err(ReloadError::ConfigError(
                "no command given to run under the reloader".to_string(),
            ));
        };
        Ok(Self {
            program: PathBuf::from(program),
            arg0: program.clone(),
            args: args.to_vec(),
            env: std::env::vars_os().collect(),
        })
    }

    /// Same invocation with the role marker set for `role`.
    ///
    /// The marker is additive: every other variable is left untouched. For
    /// `Outer` the marker is removed.
    pub fn with_role(mut self, role: ProcessRole) -> Self {
        self.env.retain(|(k, _)| k != ROLE_ENV_VAR);
        if role.is_inner() {
            self.env
                .push((OsString::from(ROLE_ENV_VAR), OsString::from(INNER_ROLE_VALUE)));
        }
        self
    }

    /// Same invocation recording `paths` as the cause of the restart.
    ///
    /// An empty slice removes the record. Paths that cannot be joined (one
    /// contains the separator) are left out of the environment.
    pub fn with_last_changed(mut self, paths: &[PathBuf]) -> Self {
        self.env.retain(|(k, _)| k != CHANGED_ENV_VAR);
        if paths.is_empty() {
            return self;
        }
        match std::env::join_paths(paths) {
            Ok(joined) => self.env.push((OsString::from(CHANGED_ENV_VAR), joined)),
            Err(e) => debug!(error = %e, "not recording changed paths"),
        }
        self
    }

    /// Paths recorded by [`Invocation::with_last_changed`], if any.
    pub fn last_changed(&self) -> Vec<PathBuf> {
        self.env_var(CHANGED_ENV_VAR)
            .map(|v| {
                std::env::split_paths(v)
                    .filter(|p| p != Path::new(""))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Role a process started from this invocation will see.
    pub fn role(&self) -> ProcessRole {
        ProcessRole::from_marker(self.env_var(ROLE_ENV_VAR))
    }

    pub fn env_var(&self, key: &str) -> Option<&OsStr> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// `std::process::Command` reproducing this invocation exactly.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(&self.arg0);
        }
        cmd.args(&self.args);
        cmd.env_clear();
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Invocation {
        Invocation::new(
            "/usr/bin/prog",
            ["a", "b", "c"],
            vec![
                (OsString::from("HOME"), OsString::from("/home/dev")),
                (OsString::from("PATH"), OsString::from("/usr/bin")),
            ],
        )
    }

    #[test]
    fn role_marker_is_additive() {
        let inner = sample().with_role(ProcessRole::Inner);
        assert_eq!(inner.role(), ProcessRole::Inner);
        assert_eq!(inner.env_var("HOME"), Some(OsStr::new("/home/dev")));
        assert_eq!(inner.env.len(), 3);
        assert_eq!(inner.args, sample().args);
    }

    #[test]
    fn with_role_outer_drops_marker_only() {
        let outer = sample()
            .with_role(ProcessRole::Inner)
            .with_role(ProcessRole::Outer);
        assert_eq!(outer.role(), ProcessRole::Outer);
        assert_eq!(outer.env, sample().env);
    }

    #[test]
    fn command_carries_program_and_args() {
        let cmd = sample().to_command();
        assert_eq!(cmd.get_program(), OsStr::new("/usr/bin/prog"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(args, vec![OsStr::new("a"), OsStr::new("b"), OsStr::new("c")]);
    }

    #[test]
    fn last_changed_survives_the_environment() {
        let changed = vec![PathBuf::from("/proj/app.py"), PathBuf::from("/proj/lib/util.py")];
        let inv = sample().with_last_changed(&changed);
        assert_eq!(inv.last_changed(), changed);
        assert_eq!(inv.args, sample().args);

        // Replaced, not appended.
        let inv = inv.with_last_changed(&changed[..1]);
        assert_eq!(inv.last_changed(), changed[..1].to_vec());
        assert_eq!(inv.env.len(), sample().env.len() + 1);

        assert!(inv.with_last_changed(&[]).last_changed().is_empty());
        assert!(sample().last_changed().is_empty());
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(matches!(
            Invocation::from_command(&[]),
            Err(ReloadError::ConfigError(_))
        ));
    }
}
