// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::workflow::Workflow;

/// Command-line arguments for `devconsole`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devconsole",
    version,
    about = "Drive the local development stack: containers, schema sync and dev servers.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Devconsole.toml` in the current working directory if it
    /// exists, built-in defaults otherwise.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVCONSOLE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the workflow plans, but don't execute anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Don't check for docker, docker-compose and npm on startup.
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Wipe and rebuild the containers, then sync the schema.
    FullStart,
    /// Start the existing containers.
    QuickStart,
    /// Stop the containers and delete their volumes.
    StopClean,
    /// Show container status.
    Status,
    /// Push the schema using local endpoints.
    DbPush,
    /// Start named processes and stream their output until Ctrl-C.
    Start {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// Interactive console (default).
    Console,
}

impl CliCommand {
    /// The workflow a one-shot subcommand runs, if any.
    pub fn workflow(&self) -> Option<Workflow> {
        match self {
            CliCommand::FullStart => Some(Workflow::FullStart),
            CliCommand::QuickStart => Some(Workflow::QuickStart),
            CliCommand::StopClean => Some(Workflow::StopAndClean),
            CliCommand::Status => Some(Workflow::StatusQuery),
            CliCommand::DbPush => Some(Workflow::SchemaSync),
            CliCommand::Start { .. } | CliCommand::Console => None,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
