// src/lib.rs

pub mod cli;
pub mod config;
pub mod console;
pub mod envfile;
pub mod errors;
pub mod events;
pub mod exec;
pub mod logging;
pub mod preflight;
pub mod supervisor;
pub mod types;
pub mod workflow;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand};
use crate::config::{ConsoleConfig, load_or_default};
use crate::console::Console;
use crate::envfile::{ConfigModeSwitcher, ensure_docker_env};
use crate::errors::DevConsoleError;
use crate::events::render::DEFAULT_POLL_INTERVAL;
use crate::events::{EventBus, TerminalRenderer, spawn_consumer};
use crate::exec::{CommandRunner, display_argv};
use crate::preflight::check_dependencies;
use crate::supervisor::{ProcessSupervisor, SupervisorOptions};
use crate::types::Channel;
use crate::workflow::{BusyGate, StepAction, Workflow, WorkflowSequencer, plan};

/// Extra time granted on exit beyond the configured stop timeout, so a
/// forced kill has a chance to be observed.
const SHUTDOWN_SLACK: Duration = Duration::from_secs(2);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - event bus + terminal consumer
/// - environment bootstrap and dependency check
/// - mode switcher, command runner, supervisor, sequencer
/// - the selected front end (one-shot workflow, `start`, or the console)
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref()).context("failed to load configuration")?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let cfg = Arc::new(cfg);
    let bus = EventBus::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = spawn_consumer(
        bus.clone(),
        TerminalRenderer::stdout(),
        DEFAULT_POLL_INTERVAL,
        shutdown_rx,
    );

    let outcome = drive(&args, Arc::clone(&cfg), &bus).await;

    // Flush whatever is still queued before returning.
    let _ = shutdown_tx.send(true);
    if let Err(e) = consumer.await {
        debug!(error = %e, "event consumer ended abnormally");
    }
    outcome
}

async fn drive(args: &CliArgs, cfg: Arc<ConsoleConfig>, bus: &EventBus) -> Result<()> {
    bus.step(Channel::Manager, "--- devconsole ---");
    ensure_docker_env(&cfg.env, bus);

    let missing = if args.skip_preflight {
        debug!("dependency check skipped");
        Vec::new()
    } else {
        check_dependencies(&cfg.tools, bus)
    };
    let enabled = missing.is_empty();

    let switcher = ConfigModeSwitcher::new(cfg.env.file.clone(), cfg.endpoints.clone(), bus.clone());
    let runner = CommandRunner::new(bus.clone(), cfg.working_dir.clone());
    let supervisor = ProcessSupervisor::new(
        bus.clone(),
        switcher.clone(),
        SupervisorOptions::from_config(&cfg),
    );
    let sequencer = WorkflowSequencer::new(
        Arc::new(runner),
        switcher,
        bus.clone(),
        BusyGate::new(),
        Arc::clone(&cfg),
    );

    let command = args.command.clone().unwrap_or(CliCommand::Console);
    info!(?command, enabled, "devconsole starting");

    let outcome = match command {
        CliCommand::Start { names } => {
            if enabled {
                start_and_follow(&supervisor, &cfg, &names).await
            } else {
                Err(DevConsoleError::MissingTools(missing).into())
            }
        }
        CliCommand::Console => {
            let console = Console::new(sequencer, supervisor.clone(), Arc::clone(&cfg), bus.clone(), enabled);
            let stdin = BufReader::new(tokio::io::stdin());
            console
                .run(stdin, interrupted())
                .await
                .context("failed to read console input")
        }
        other => match other.workflow() {
            Some(workflow) if enabled => run_workflow(&sequencer, workflow).await,
            Some(_) => Err(DevConsoleError::MissingTools(missing).into()),
            None => Ok(()),
        },
    };

    if !supervisor.active().is_empty() {
        bus.warning(Channel::Manager, "Stopping all processes...");
    }
    supervisor
        .shutdown(cfg.stop_timeout.saturating_add(SHUTDOWN_SLACK))
        .await;
    outcome
}

async fn run_workflow(sequencer: &WorkflowSequencer, workflow: Workflow) -> Result<()> {
    let report = sequencer.run(workflow).await.map_err(DevConsoleError::from)?;
    if !report.is_clean() {
        debug!(failures = ?report.advisory_failures, "workflow finished with advisory failures");
    }
    Ok(())
}

/// Start the named processes and stream their output until they have all
/// exited or the user interrupts.
async fn start_and_follow(
    supervisor: &ProcessSupervisor,
    cfg: &ConsoleConfig,
    names: &[String],
) -> Result<()> {
    for name in names {
        let spec = cfg.process(name).ok_or_else(|| {
            DevConsoleError::InvalidConfig(format!("unknown process '{name}'"))
        })?;
        supervisor.start_process(spec)?;
    }

    tokio::select! {
        _ = supervisor.all_idle() => debug!("all processes exited"),
        _ = interrupted() => info!("interrupted; stopping processes"),
    }
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never resolves.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Dry-run output: print the resolved configuration and every workflow plan.
fn print_dry_run(cfg: &ConsoleConfig) {
    println!("devconsole dry-run");
    println!("  env.file = {}", cfg.env.file.display());
    println!("  env.docker_file = {}", cfg.env.docker_file.display());
    println!("  endpoints.local = {:?}", cfg.endpoints.local);
    println!("  endpoints.containerized = {:?}", cfg.endpoints.containerized);
    println!("  preflight.tools = {:?}", cfg.tools);
    println!();

    for workflow in Workflow::ALL {
        println!("{workflow} ({}):", workflow.command_name());
        for step in plan(workflow, cfg) {
            let action = match &step.action {
                StepAction::RunCommand(argv) => format!("run `{}`", display_argv(argv)),
                StepAction::SwitchMode(mode) => format!("switch env to {mode}"),
                StepAction::Wait(d) => format!("wait {}s", d.as_secs_f32()),
                StepAction::SchemaSync { migrate } => {
                    format!("schema sync `{}`", display_argv(migrate))
                }
                StepAction::Banner { app_url } => format!("banner {app_url}"),
            };
            println!("  - [{:?}] {action}", step.criticality);
        }
    }
    println!();

    println!("processes ({}):", cfg.processes.len());
    for spec in cfg.processes.values() {
        println!("  - {} [{}] {}", spec.name, spec.channel, spec.label);
        println!("      cmd: {}", display_argv(&spec.argv));
    }

    debug!("dry-run complete (no execution)");
}
