// src/workflow/mod.rs

//! Multi-step operations.
//!
//! A workflow is a fixed, ordered list of [`WorkflowStep`]s built fresh for
//! every invocation by [`plan`]. The [`sequencer`] executes the steps one
//! by one and is the only place that interprets a step's [`Criticality`]:
//! a failed fatal step aborts the rest of the workflow, a failed advisory
//! step is logged and skipped over. Nothing is rolled back.
//!
//! While any workflow runs, the [`gate`] reports the console as busy so
//! the front end rejects overlapping triggers.

pub mod gate;
pub mod plan;
pub mod sequencer;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::types::EnvironmentMode;

pub use gate::{BusyGate, BusyGuard};
pub use plan::plan;
pub use sequencer::{WorkflowReport, WorkflowSequencer};

/// The user-triggerable operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workflow {
    /// Wipe, rebuild and start the containers, then sync the schema.
    FullStart,
    /// Start the existing containers without rebuilding.
    QuickStart,
    /// Stop the containers and wipe their volumes.
    StopAndClean,
    /// Show container status.
    StatusQuery,
    /// Push the schema against locally reachable endpoints.
    SchemaSync,
}

impl Workflow {
    pub const ALL: [Workflow; 5] = [
        Workflow::FullStart,
        Workflow::QuickStart,
        Workflow::StopAndClean,
        Workflow::StatusQuery,
        Workflow::SchemaSync,
    ];

    /// Name used on the command line and in the console.
    pub fn command_name(&self) -> &'static str {
        match self {
            Workflow::FullStart => "full-start",
            Workflow::QuickStart => "quick-start",
            Workflow::StopAndClean => "stop-clean",
            Workflow::StatusQuery => "status",
            Workflow::SchemaSync => "db-push",
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Workflow::FullStart => "Full start",
            Workflow::QuickStart => "Quick start",
            Workflow::StopAndClean => "Stop and clean",
            Workflow::StatusQuery => "Status",
            Workflow::SchemaSync => "Schema sync",
        };
        f.write_str(name)
    }
}

impl FromStr for Workflow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Workflow::ALL
            .into_iter()
            .find(|w| w.command_name() == wanted)
            .ok_or_else(|| format!("unknown workflow: {wanted}"))
    }
}

/// What happens when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    /// Abort the remaining steps.
    FatalOnFailure,
    /// Log the failure and carry on.
    Advisory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    RunCommand(Vec<String>),
    SwitchMode(EnvironmentMode),
    Wait(Duration),
    /// Switch to local endpoints, run `migrate`, switch back to
    /// containerized endpoints. Fails if the migration fails.
    SchemaSync { migrate: Vec<String> },
    /// Announce a successful start.
    Banner { app_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStep {
    pub action: StepAction,
    pub description: String,
    pub criticality: Criticality,
}

impl WorkflowStep {
    pub fn fatal(action: StepAction, description: impl Into<String>) -> Self {
        Self {
            action,
            description: description.into(),
            criticality: Criticality::FatalOnFailure,
        }
    }

    pub fn advisory(action: StepAction, description: impl Into<String>) -> Self {
        Self {
            action,
            description: description.into(),
            criticality: Criticality::Advisory,
        }
    }
}
