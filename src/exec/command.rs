// src/exec/command.rs

use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::errors::CommandError;
use crate::events::EventBus;
use crate::exec::{build_command, display_argv};
use crate::types::Channel;

/// stdout and stderr of a command that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs one-shot infrastructure commands (teardown, bring-up, migration,
/// status) and narrates them on the manager channel.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    bus: EventBus,
    working_dir: Option<PathBuf>,
}

impl CommandRunner {
    pub fn new(bus: EventBus, working_dir: Option<PathBuf>) -> Self {
        Self { bus, working_dir }
    }

    /// Run `argv` to completion.
    ///
    /// On exit code 0, stdout is published as info, stderr (if any) as a
    /// warning, followed by a success event. On a nonzero exit or spawn
    /// failure a single error event carries the code and captured stderr.
    pub async fn run(&self, argv: &[String], description: &str) -> bool {
        let channel = Channel::Manager;
        let rendered = display_argv(argv);
        self.bus.step(channel, description);
        self.bus.command(channel, format!("Running: {rendered}"));
        info!(cmd = %rendered, %description, "running command");

        match self.execute(argv).await {
            Ok(output) => {
                let stdout = output.stdout.trim();
                let stderr = output.stderr.trim();
                if !stdout.is_empty() {
                    self.bus.info(channel, stdout);
                }
                if !stderr.is_empty() {
                    self.bus.warning(channel, stderr);
                }
                self.bus.success(channel, "Completed successfully.");
                debug!(cmd = %rendered, "command succeeded");
                true
            }
            Err(CommandError::NonZeroExit { code, stderr }) => {
                error!(cmd = %rendered, exit_code = code, "command failed");
                let stderr = stderr.trim();
                let text = if stderr.is_empty() {
                    format!("Command failed (code {code}).")
                } else {
                    format!("Command failed (code {code}):\n{stderr}")
                };
                self.bus.error(channel, text);
                false
            }
            Err(CommandError::SpawnFailed(reason)) => {
                error!(cmd = %rendered, %reason, "command could not be started");
                self.bus
                    .error(channel, format!("Command could not be started: {reason}"));
                false
            }
        }
    }

    /// Spawn `argv`, wait for it and capture both output streams.
    pub async fn execute(&self, argv: &[String]) -> Result<CapturedOutput, CommandError> {
        let mut cmd = build_command(argv, self.working_dir.as_deref())?;
        let output = cmd
            .output()
            .await
            .map_err(|e| CommandError::SpawnFailed(format!("{}: {e}", display_argv(argv))))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok(CapturedOutput { stdout, stderr })
        } else {
            Err(CommandError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr,
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn success_publishes_output_then_success() {
        let bus = EventBus::new();
        let runner = CommandRunner::new(bus.clone(), None);

        assert!(runner.run(&sh("echo out; echo err >&2"), "Testing").await);

        let events = bus.drain();
        let severities: Vec<_> = events.iter().map(|e| e.severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Step,
                Severity::Command,
                Severity::Info,
                Severity::Warning,
                Severity::Success
            ]
        );
        assert_eq!(events[2].text, "out");
        assert_eq!(events[3].text, "err");
    }

    #[tokio::test]
    async fn nonzero_exit_publishes_one_error_with_code_and_stderr() {
        let bus = EventBus::new();
        let runner = CommandRunner::new(bus.clone(), None);

        assert!(!runner.run(&sh("echo boom >&2; exit 7"), "Failing").await);

        let errors: Vec<_> = bus
            .drain()
            .into_iter()
            .filter(|e| e.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].text.contains("code 7"));
        assert!(errors[0].text.contains("boom"));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_failure() {
        let runner = CommandRunner::new(EventBus::new(), None);
        let err = runner
            .execute(&["definitely-not-a-real-binary-4242".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::SpawnFailed(_)));

        let empty = runner.execute(&[]).await.unwrap_err();
        assert!(matches!(empty, CommandError::SpawnFailed(_)));
    }

    #[tokio::test]
    async fn missing_program_publishes_one_error_and_fails() {
        let bus = EventBus::new();
        let runner = CommandRunner::new(bus.clone(), None);

        let argv = vec!["devconsole-no-such-binary".to_string()];
        assert!(!runner.run(&argv, "Missing tool").await);

        let events = bus.drain();
        let errors: Vec<_> = events
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].channel, Channel::Manager);
        assert!(errors[0].text.contains("could not be started"));
        assert!(errors[0].text.contains("devconsole-no-such-binary"));
        assert!(!events.iter().any(|e| e.severity == Severity::Success));
    }
}
