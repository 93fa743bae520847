// src/supervisor/signal.rs

//! Terminate requests for supervised processes.
//!
//! On unix every supervised child leads its own process group, so signals
//! go to the whole group and reach the tools `npm` forks underneath it.

use std::io;

#[cfg(unix)]
use nix::sys::signal::{Signal, killpg};
#[cfg(unix)]
use nix::unistd::Pid;

/// Ask the process group led by `pid` to exit (SIGTERM).
#[cfg(unix)]
pub fn terminate(pid: u32) -> io::Result<()> {
    #[allow(clippy::cast_possible_wrap)]
    let target = Pid::from_raw(pid as i32);
    killpg(target, Signal::SIGTERM).map_err(io::Error::from)
}

/// Kill every process in the group led by `pid` (SIGKILL).
#[cfg(unix)]
pub fn kill_group(pid: u32) -> io::Result<()> {
    #[allow(clippy::cast_possible_wrap)]
    let target = Pid::from_raw(pid as i32);
    killpg(target, Signal::SIGKILL).map_err(io::Error::from)
}

#[cfg(not(unix))]
pub fn terminate(_pid: u32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "graceful termination is not available on this platform",
    ))
}

#[cfg(not(unix))]
pub fn kill_group(_pid: u32) -> io::Result<()> {
    Ok(())
}
