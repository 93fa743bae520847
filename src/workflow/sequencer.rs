// src/workflow/sequencer.rs

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ConsoleConfig;
use crate::envfile::ConfigModeSwitcher;
use crate::errors::{ConfigError, WorkflowError};
use crate::events::EventBus;
use crate::exec::CommandExecutor;
use crate::types::{Channel, EnvironmentMode};
use crate::workflow::{BusyGate, BusyGuard, Criticality, StepAction, Workflow, WorkflowStep, plan};

/// Outcome of a workflow that ran to the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    pub workflow: Workflow,
    /// Descriptions of the steps that succeeded, in order.
    pub completed: Vec<String>,
    /// Descriptions of advisory steps that failed.
    pub advisory_failures: Vec<String>,
}

impl WorkflowReport {
    pub fn is_clean(&self) -> bool {
        self.advisory_failures.is_empty()
    }
}

/// Executes workflows step by step.
///
/// Cloning is cheap, so the front end can hand a clone to each spawned
/// operation. All clones share the same [`BusyGate`].
#[derive(Clone)]
pub struct WorkflowSequencer {
    executor: Arc<dyn CommandExecutor>,
    switcher: ConfigModeSwitcher,
    bus: EventBus,
    gate: BusyGate,
    config: Arc<ConsoleConfig>,
}

impl std::fmt::Debug for WorkflowSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowSequencer")
            .field("switcher", &self.switcher)
            .field("busy", &self.gate.is_busy())
            .finish_non_exhaustive()
    }
}

impl WorkflowSequencer {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        switcher: ConfigModeSwitcher,
        bus: EventBus,
        gate: BusyGate,
        config: Arc<ConsoleConfig>,
    ) -> Self {
        Self {
            executor,
            switcher,
            bus,
            gate,
            config,
        }
    }

    pub fn gate(&self) -> &BusyGate {
        &self.gate
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Claim the busy gate without running anything yet.
    ///
    /// Lets a caller mark the console busy before handing the workflow to
    /// another task, so no trigger slips in between.
    pub fn try_begin(&self) -> Option<BusyGuard> {
        self.gate.try_acquire()
    }

    /// Run one of the built-in workflows.
    pub async fn run(&self, workflow: Workflow) -> Result<WorkflowReport, WorkflowError> {
        let steps = plan(workflow, &self.config);
        self.run_plan(workflow, steps).await
    }

    /// Run a built-in workflow under a guard obtained from
    /// [`try_begin`](Self::try_begin). The gate is released when it returns.
    pub async fn run_guarded(
        &self,
        guard: BusyGuard,
        workflow: Workflow,
    ) -> Result<WorkflowReport, WorkflowError> {
        let steps = plan(workflow, &self.config);
        let report = self.execute_plan(workflow, steps).await;
        drop(guard);
        report
    }

    /// Run an explicit list of steps under the busy gate.
    ///
    /// A failing fatal step stops the workflow immediately and whatever the
    /// earlier steps changed stays as it is. A failing advisory step is
    /// recorded in the report.
    pub async fn run_plan(
        &self,
        workflow: Workflow,
        steps: Vec<WorkflowStep>,
    ) -> Result<WorkflowReport, WorkflowError> {
        let Some(guard) = self.try_begin() else {
            debug!(%workflow, "workflow rejected; another operation is running");
            self.bus.warning(
                Channel::Manager,
                format!("{workflow} ignored: another operation is in progress."),
            );
            return Err(WorkflowError::Busy);
        };

        let report = self.execute_plan(workflow, steps).await;
        drop(guard);
        report
    }

    async fn execute_plan(
        &self,
        workflow: Workflow,
        steps: Vec<WorkflowStep>,
    ) -> Result<WorkflowReport, WorkflowError> {
        info!(%workflow, steps = steps.len(), "workflow started");
        let mut report = WorkflowReport {
            workflow,
            completed: Vec::new(),
            advisory_failures: Vec::new(),
        };

        for step in steps {
            if self.execute(&step).await {
                report.completed.push(step.description);
                continue;
            }

            match step.criticality {
                Criticality::FatalOnFailure => {
                    warn!(%workflow, step = %step.description, "fatal step failed; aborting workflow");
                    self.bus
                        .warning(Channel::Manager, format!("{workflow} aborted."));
                    return Err(WorkflowError::StepFailed {
                        workflow,
                        step: step.description,
                    });
                }
                Criticality::Advisory => {
                    warn!(%workflow, step = %step.description, "advisory step failed; continuing");
                    report.advisory_failures.push(step.description);
                }
            }
        }

        info!(%workflow, advisory_failures = report.advisory_failures.len(), "workflow finished");
        Ok(report)
    }

    async fn execute(&self, step: &WorkflowStep) -> bool {
        match &step.action {
            StepAction::RunCommand(argv) => self.executor.run(argv, &step.description).await,
            StepAction::SwitchMode(mode) => self.switch_mode(*mode),
            StepAction::Wait(duration) => {
                self.bus.warning(Channel::Manager, step.description.as_str());
                tokio::time::sleep(*duration).await;
                true
            }
            StepAction::SchemaSync { migrate } => {
                self.schema_sync(migrate, &step.description).await
            }
            StepAction::Banner { app_url } => {
                self.bus
                    .success(Channel::Manager, "Project started successfully!");
                self.bus
                    .info(Channel::Manager, format!("Open {app_url} in your browser."));
                true
            }
        }
    }

    /// A missing environment file is not a failure: commands then run
    /// against whatever defaults the tools have.
    fn switch_mode(&self, mode: EnvironmentMode) -> bool {
        match self.switcher.apply(mode) {
            Ok(()) | Err(ConfigError::NotFound(_)) => true,
            Err(ConfigError::Io { .. }) => false,
        }
    }

    /// Migrations run from the host, so they need local endpoints; the
    /// containers need the containerized ones back afterwards, whether or
    /// not the migration worked.
    async fn schema_sync(&self, migrate: &[String], description: &str) -> bool {
        if !self.switch_mode(EnvironmentMode::Local) {
            return false;
        }
        let migrated = self.executor.run(migrate, description).await;
        let restored = self.switch_mode(EnvironmentMode::Containerized);
        migrated && restored
    }
}
