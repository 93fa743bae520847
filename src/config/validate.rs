// src/config/validate.rs

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    ConsoleConfig, EndpointSet, EnvSection, ProcessSpec, RawConsoleConfig,
};
use crate::errors::{DevConsoleError, Result};
use crate::types::Channel;

impl TryFrom<RawConsoleConfig> for ConsoleConfig {
    type Error = DevConsoleError;

    fn try_from(raw: RawConsoleConfig) -> std::result::Result<Self, Self::Error> {
        validate_commands(&raw)?;
        validate_endpoints("local", &raw.endpoints.local)?;
        validate_endpoints("containerized", &raw.endpoints.containerized)?;
        let processes = resolve_processes(&raw)?;

        let readiness_wait = bounded_duration("[workflow].readiness_wait", &raw.workflow.readiness_wait)?;
        let stop_timeout = bounded_duration("[supervisor].stop_timeout", &raw.supervisor.stop_timeout)?;

        let env = match &raw.supervisor.working_dir {
            Some(dir) => rebase_env_paths(raw.env, dir),
            None => raw.env,
        };

        Ok(ConsoleConfig {
            env,
            endpoints: raw.endpoints,
            commands: raw.commands,
            readiness_wait,
            app_url: raw.workflow.app_url,
            stop_timeout,
            working_dir: raw.supervisor.working_dir,
            tools: raw.preflight.tools,
            processes,
        })
    }
}

/// Longest accepted wait or timeout.
pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

fn bounded_duration(field: &str, value: &str) -> Result<Duration> {
    let duration =
        parse_duration(value).map_err(|e| DevConsoleError::InvalidConfig(format!("{field}: {e}")))?;
    if duration > MAX_DURATION {
        return Err(DevConsoleError::InvalidConfig(format!(
            "{field}: '{value}' exceeds the 24h maximum"
        )));
    }
    Ok(duration)
}

/// Relative env file paths name files in the directory the tools run in.
fn rebase_env_paths(env: EnvSection, dir: &std::path::Path) -> EnvSection {
    EnvSection {
        file: dir.join(env.file),
        docker_file: dir.join(env.docker_file),
        example_file: dir.join(env.example_file),
        auto_create_docker_env: env.auto_create_docker_env,
    }
}

fn ensure_argv(field: &str, argv: &[String]) -> Result<()> {
    match argv.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(DevConsoleError::InvalidConfig(format!(
            "{field} must be a non-empty command list"
        ))),
    }
}

fn validate_commands(cfg: &RawConsoleConfig) -> Result<()> {
    let commands = &cfg.commands;
    ensure_argv("[commands].teardown", &commands.teardown)?;
    ensure_argv("[commands].build_up", &commands.build_up)?;
    ensure_argv("[commands].up", &commands.up)?;
    ensure_argv("[commands].status", &commands.status)?;
    ensure_argv("[commands].migrate", &commands.migrate)?;
    Ok(())
}

fn validate_endpoints(mode: &str, set: &EndpointSet) -> Result<()> {
    if set.database_url.trim().is_empty() {
        return Err(DevConsoleError::InvalidConfig(format!(
            "[endpoints.{mode}].database_url must not be empty"
        )));
    }
    if set.redis_url.trim().is_empty() {
        return Err(DevConsoleError::InvalidConfig(format!(
            "[endpoints.{mode}].redis_url must not be empty"
        )));
    }
    Ok(())
}

fn resolve_processes(cfg: &RawConsoleConfig) -> Result<BTreeMap<String, ProcessSpec>> {
    let mut resolved = BTreeMap::new();

    for (name, process) in cfg.process.iter() {
        ensure_argv(&format!("[process.{name}].cmd"), &process.cmd)?;

        let channel = match process.channel {
            Some(channel) => channel,
            None => name.parse::<Channel>().map_err(|_| {
                DevConsoleError::InvalidConfig(format!(
                    "[process.{name}] needs a `channel` (server, worker or studio)"
                ))
            })?,
        };
        if channel == Channel::Manager {
            return Err(DevConsoleError::InvalidConfig(format!(
                "[process.{name}] cannot write to the manager channel"
            )));
        }

        resolved.insert(
            name.clone(),
            ProcessSpec {
                name: name.clone(),
                label: process.label.clone().unwrap_or_else(|| name.clone()),
                channel,
                argv: process.cmd.clone(),
            },
        );
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn parse(toml_src: &str) -> Result<ConsoleConfig> {
        let raw: RawConsoleConfig = toml::from_str(toml_src)?;
        ConsoleConfig::try_from(raw)
    }

    #[test]
    fn empty_file_yields_stock_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.readiness_wait, Duration::from_secs(10));
        assert_eq!(cfg.stop_timeout, Duration::from_secs(5));
        assert_eq!(cfg.commands.teardown, vec!["docker-compose", "down", "-v"]);
        assert_eq!(
            cfg.processes.keys().collect::<Vec<_>>(),
            vec!["server", "studio", "worker"]
        );
        assert_eq!(cfg.process("studio").unwrap().channel, Channel::Studio);
    }

    #[test]
    fn process_channel_defaults_to_key() {
        let cfg = parse(
            r#"
            [process.worker]
            cmd = ["cargo", "run", "--bin", "worker"]
            "#,
        )
        .unwrap();
        let worker = cfg.process("worker").unwrap();
        assert_eq!(worker.channel, Channel::Worker);
        assert_eq!(worker.label, "worker");
        assert!(cfg.process("server").is_none());
    }

    #[test]
    fn unknown_process_name_without_channel_is_rejected() {
        let err = parse(
            r#"
            [process.mailer]
            cmd = ["npm", "run", "mailer"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("[process.mailer]"));
    }

    #[test]
    fn manager_channel_is_reserved() {
        let err = parse(
            r#"
            [process.server]
            cmd = ["npm", "run", "dev"]
            channel = "manager"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("manager channel"));
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = parse(
            r#"
            [commands]
            migrate = []
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("[commands].migrate"));
    }

    #[test]
    fn oversized_durations_are_rejected_not_panicking() {
        let err = parse(
            r#"
            [workflow]
            readiness_wait = "999999999999999999h"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let err = parse(
            r#"
            [supervisor]
            stop_timeout = "25h"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("[supervisor].stop_timeout"));
    }

    #[test]
    fn env_paths_follow_working_dir() {
        let cfg = parse(
            r#"
            [supervisor]
            working_dir = "/srv/app"

            [env]
            example_file = "/templates/.env.example"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.env.file, std::path::Path::new("/srv/app/.env"));
        assert_eq!(cfg.env.docker_file, std::path::Path::new("/srv/app/.env.docker"));
        assert_eq!(
            cfg.env.example_file,
            std::path::Path::new("/templates/.env.example")
        );

        let cfg = parse("").unwrap();
        assert_eq!(cfg.env.file, std::path::Path::new(".env"));
    }

    #[test]
    fn bad_duration_is_rejected() {
        let err = parse(
            r#"
            [workflow]
            readiness_wait = "ten seconds"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("readiness_wait"));
    }

    #[test]
    fn blank_endpoint_is_rejected() {
        let err = parse(
            r#"
            [endpoints.containerized]
            database_url = ""
            redis_url = "redis://redis:6379"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("[endpoints.containerized].database_url"));
    }
}
