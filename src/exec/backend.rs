// src/exec/backend.rs

//! Pluggable command executor abstraction.
//!
//! The workflow sequencer runs its one-shot steps through a
//! `CommandExecutor` instead of a concrete runner. Production code uses
//! [`CommandRunner`](super::CommandRunner); tests provide an implementation
//! that records invocations and fails on demand without spawning anything.

use std::future::Future;
use std::pin::Pin;

use super::command::CommandRunner;

/// Runs a short-lived command to completion.
///
/// Implementations report everything through the event bus and signal the
/// outcome only through the returned bool; they never propagate errors.
pub trait CommandExecutor: Send + Sync {
    fn run<'a>(
        &'a self,
        argv: &'a [String],
        description: &'a str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}

impl CommandExecutor for CommandRunner {
    fn run<'a>(
        &'a self,
        argv: &'a [String],
        description: &'a str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(CommandRunner::run(self, argv, description))
    }
}
