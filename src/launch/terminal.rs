// src/launch/terminal.rs

//! Terminal state repair before a (re)start.
//!
//! Debuggers and REPLs turn input echo off while they run. If one is killed
//! mid-session the terminal stays silent for the next generation, so echo is
//! switched back on before every launch.

/// Re-enable `ECHO` on stdin if it is a terminal with echo turned off.
///
/// Failures are logged and otherwise ignored.
#[cfg(unix)]
pub fn ensure_echo_on() {
    use std::io::IsTerminal;
    use std::mem::MaybeUninit;

    use tracing::debug;

    if !std::io::stdin().is_terminal() {
        return;
    }

    let fd = libc::STDIN_FILENO;
    let mut attrs = MaybeUninit::<libc::termios>::uninit();
    // SAFETY: `fd` is an open terminal and `attrs` is only read after
    // `tcgetattr` reports that it filled it in.
    if unsafe { libc::tcgetattr(fd, attrs.as_mut_ptr()) } != 0 {
        debug!(error = %std::io::Error::last_os_error(), "tcgetattr failed");
        return;
    }
    let mut attrs = unsafe { attrs.assume_init() };

    let Some(lflag) = with_echo(attrs.c_lflag) else {
        return;
    };
    attrs.c_lflag = lflag;
    // SAFETY: `attrs` is a fully initialised `termios` read from the same fd.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &attrs) } != 0 {
        debug!(error = %std::io::Error::last_os_error(), "tcsetattr failed");
    } else {
        debug!("terminal echo re-enabled");
    }
}

#[cfg(not(unix))]
pub fn ensure_echo_on() {}

/// Local-mode flags with `ECHO` set, or `None` if it already is.
#[cfg(unix)]
fn with_echo(lflag: libc::tcflag_t) -> Option<libc::tcflag_t> {
    if lflag & libc::ECHO == 0 {
        Some(lflag | libc::ECHO)
    } else {
        None
    }
}
