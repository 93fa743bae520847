// src/exec/mod.rs

//! Short-lived command execution.
//!
//! - [`command`] holds [`CommandRunner`], which runs one argv to completion
//!   and reports the outcome on the event bus.
//! - [`backend`] provides the [`CommandExecutor`] trait the workflow
//!   sequencer talks to, so tests can swap in a scripted fake.
//! - [`build_command`] is shared with the process supervisor.

pub mod backend;
pub mod command;

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::errors::CommandError;

pub use backend::CommandExecutor;
pub use command::{CapturedOutput, CommandRunner};

/// Build a `tokio::process::Command` from an argv list.
///
/// The program is resolved by the platform's process API; no shell is
/// involved, so arguments are passed through verbatim. stdout and stderr are
/// piped, stdin is closed.
pub fn build_command(argv: &[String], working_dir: Option<&Path>) -> Result<Command, CommandError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| CommandError::SpawnFailed("empty command".to_string()))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }
    Ok(cmd)
}

/// Render an argv list for log output.
pub fn display_argv(argv: &[String]) -> String {
    argv.join(" ")
}
