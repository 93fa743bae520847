// src/errors.rs

//! Crate-wide error types.
//!
//! Each core component has its own small error enum so callers can match on
//! the exact failure; `DevConsoleError` is what configuration loading and the
//! top-level entry points return.

use std::path::PathBuf;

use thiserror::Error;

use crate::workflow::Workflow;

#[derive(Error, Debug)]
pub enum DevConsoleError {
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Missing required tools: {}", .0.join(", "))]
    MissingTools(Vec<String>),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

/// Failure of `ConfigModeSwitcher::apply`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment file {} not found", .0.display())]
    NotFound(PathBuf),

    #[error("failed to rewrite environment file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of `ProcessSupervisor::start`.
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("process '{0}' is already running")]
    AlreadyRunning(String),

    #[error("failed to spawn process '{name}': {reason}")]
    SpawnFailed { name: String, reason: String },
}

/// Failure of a single short-lived command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("command exited with code {code}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("failed to spawn command: {0}")]
    SpawnFailed(String),
}

/// Failure of a whole workflow invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("another operation is already in progress")]
    Busy,

    #[error("{workflow} aborted: step '{step}' failed")]
    StepFailed { workflow: Workflow, step: String },
}

pub type Result<T> = std::result::Result<T, DevConsoleError>;
