// src/console.rs

//! Interactive front end.
//!
//! Reads one command per line, turns it into a workflow run or a
//! supervisor call, and reports everything on the manager channel. Each
//! workflow runs on its own task, so the prompt keeps reading while it
//! works; while it runs, every trigger is rejected.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ConsoleConfig;
use crate::events::EventBus;
use crate::supervisor::ProcessSupervisor;
use crate::types::Channel;
use crate::workflow::{Workflow, WorkflowSequencer};

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Run(Workflow),
    Start(String),
    Stop(String),
    Processes,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let head = words.next().unwrap_or_default().to_lowercase();
        let arg = words.next().map(str::to_string);
        if words.next().is_some() {
            return Err(format!("too many arguments: '{}'", s.trim()));
        }

        match (head.as_str(), arg) {
            ("start", Some(name)) => Ok(ConsoleCommand::Start(name)),
            ("stop", Some(name)) => Ok(ConsoleCommand::Stop(name)),
            ("start" | "stop", None) => Err(format!("usage: {head} <process>")),
            ("ps", None) => Ok(ConsoleCommand::Processes),
            ("help" | "?", None) => Ok(ConsoleCommand::Help),
            ("quit" | "exit" | "q", None) => Ok(ConsoleCommand::Quit),
            (_, None) => head
                .parse::<Workflow>()
                .map(ConsoleCommand::Run)
                .map_err(|_| format!("unknown command '{head}'; type 'help'")),
            (_, Some(_)) => Err(format!("'{head}' takes no arguments")),
        }
    }
}

/// What [`Console::dispatch`] did with a command.
#[derive(Debug)]
pub enum Dispatch {
    Handled,
    /// A workflow was started on this task.
    Spawned(JoinHandle<()>),
    Quit,
}

#[derive(Debug, Clone)]
pub struct Console {
    sequencer: WorkflowSequencer,
    supervisor: ProcessSupervisor,
    config: Arc<ConsoleConfig>,
    bus: EventBus,
    /// `false` when required tools are missing.
    enabled: bool,
}

impl Console {
    pub fn new(
        sequencer: WorkflowSequencer,
        supervisor: ProcessSupervisor,
        config: Arc<ConsoleConfig>,
        bus: EventBus,
        enabled: bool,
    ) -> Self {
        Self {
            sequencer,
            supervisor,
            config,
            bus,
            enabled,
        }
    }

    pub fn dispatch(&self, command: ConsoleCommand) -> Dispatch {
        debug!(?command, "console command");
        match command {
            ConsoleCommand::Quit => Dispatch::Quit,
            ConsoleCommand::Help => {
                self.print_help();
                Dispatch::Handled
            }
            ConsoleCommand::Processes => {
                self.print_processes();
                Dispatch::Handled
            }
            trigger => {
                if !self.accepts_triggers() {
                    return Dispatch::Handled;
                }
                self.trigger(trigger)
            }
        }
    }

    fn accepts_triggers(&self) -> bool {
        if !self.enabled {
            self.bus.error(
                Channel::Manager,
                "Operations are disabled until the missing dependencies are installed.",
            );
            return false;
        }
        if self.sequencer.is_busy() {
            self.bus.warning(
                Channel::Manager,
                "An operation is in progress. Wait for it to finish.",
            );
            return false;
        }
        true
    }

    fn trigger(&self, command: ConsoleCommand) -> Dispatch {
        match command {
            ConsoleCommand::Run(workflow) => {
                // The gate is claimed here so the console is busy before
                // the task is first polled.
                let Some(guard) = self.sequencer.try_begin() else {
                    self.bus.warning(
                        Channel::Manager,
                        "An operation is in progress. Wait for it to finish.",
                    );
                    return Dispatch::Handled;
                };
                let sequencer = self.sequencer.clone();
                let handle = tokio::spawn(async move {
                    if let Err(e) = sequencer.run_guarded(guard, workflow).await {
                        debug!(%workflow, error = %e, "workflow did not complete");
                    }
                });
                Dispatch::Spawned(handle)
            }
            ConsoleCommand::Start(name) => {
                match self.config.process(&name) {
                    Some(spec) => {
                        // Failures are already reported on the bus.
                        let _ = self.supervisor.start_process(spec);
                    }
                    None => self.bus.error(
                        Channel::Manager,
                        format!(
                            "Unknown process '{name}'. Known processes: {}.",
                            self.known_processes()
                        ),
                    ),
                }
                Dispatch::Handled
            }
            ConsoleCommand::Stop(name) => {
                self.supervisor.stop(&name);
                Dispatch::Handled
            }
            ConsoleCommand::Processes | ConsoleCommand::Help | ConsoleCommand::Quit => {
                Dispatch::Handled
            }
        }
    }

    fn known_processes(&self) -> String {
        self.config
            .processes
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn print_help(&self) {
        let bus = &self.bus;
        bus.info(Channel::Manager, "Commands:");
        for workflow in Workflow::ALL {
            bus.info(
                Channel::Manager,
                format!("  {:<14} {workflow}", workflow.command_name()),
            );
        }
        bus.info(Channel::Manager, "  start <name>   Start a process");
        bus.info(Channel::Manager, "  stop <name>    Stop a process");
        bus.info(Channel::Manager, "  ps             List processes");
        bus.info(Channel::Manager, "  quit           Stop all processes and exit");
        bus.info(
            Channel::Manager,
            format!("Processes: {}", self.known_processes()),
        );
    }

    fn print_processes(&self) {
        for spec in self.config.processes.values() {
            let state = self.supervisor.state(&spec.name);
            self.bus.info(
                Channel::Manager,
                format!("  {:<8} {:<10} {}", spec.name, format!("{state:?}"), spec.label),
            );
        }
    }

    /// Read commands from `input` until `quit`, end of input or `shutdown`
    /// resolves.
    pub async fn run<R, F>(&self, input: R, shutdown: F) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        let mut lines = input.lines();
        tokio::pin!(shutdown);

        self.bus
            .info(Channel::Manager, "Type 'help' for the list of commands.");

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = &mut shutdown => {
                    info!("console interrupted");
                    break;
                }
            };

            let Some(line) = line else {
                debug!("console input closed");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<ConsoleCommand>() {
                Ok(command) => {
                    if let Dispatch::Quit = self.dispatch(command) {
                        break;
                    }
                }
                Err(msg) => self.bus.warning(Channel::Manager, msg),
            }
        }
        Ok(())
    }
}
