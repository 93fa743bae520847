// src/workflow/plan.rs

//! Pure step lists for each workflow.

use crate::config::ConsoleConfig;
use crate::types::EnvironmentMode;
use crate::workflow::{StepAction, Workflow, WorkflowStep};

/// Build the ordered steps for `workflow` from the configured commands.
pub fn plan(workflow: Workflow, cfg: &ConsoleConfig) -> Vec<WorkflowStep> {
    let commands = &cfg.commands;

    match workflow {
        Workflow::FullStart => vec![
            WorkflowStep::fatal(
                StepAction::RunCommand(commands.teardown.clone()),
                "Stopping and wiping old containers...",
            ),
            WorkflowStep::advisory(
                StepAction::SwitchMode(EnvironmentMode::Containerized),
                "Pointing the environment at the containers",
            ),
            WorkflowStep::fatal(
                StepAction::RunCommand(commands.build_up.clone()),
                "Building and starting containers...",
            ),
            WorkflowStep::advisory(
                StepAction::Wait(cfg.readiness_wait),
                format!(
                    "Waiting for the database to start ({}s)...",
                    cfg.readiness_wait.as_secs()
                ),
            ),
            WorkflowStep::fatal(
                StepAction::SchemaSync {
                    migrate: commands.migrate.clone(),
                },
                "Syncing the database schema...",
            ),
            WorkflowStep::advisory(
                StepAction::Banner {
                    app_url: cfg.app_url.clone(),
                },
                "Project started",
            ),
        ],
        Workflow::QuickStart => vec![
            WorkflowStep::advisory(
                StepAction::SwitchMode(EnvironmentMode::Containerized),
                "Pointing the environment at the containers",
            ),
            WorkflowStep::advisory(
                StepAction::RunCommand(commands.up.clone()),
                "Starting existing containers...",
            ),
        ],
        Workflow::StopAndClean => vec![WorkflowStep::fatal(
            StepAction::RunCommand(commands.teardown.clone()),
            "Stopping and wiping all containers...",
        )],
        Workflow::StatusQuery => vec![WorkflowStep::advisory(
            StepAction::RunCommand(commands.status.clone()),
            "Checking container status...",
        )],
        Workflow::SchemaSync => vec![WorkflowStep::fatal(
            StepAction::SchemaSync {
                migrate: commands.migrate.clone(),
            },
            "Syncing the database schema...",
        )],
    }
}
