// src/envfile/bootstrap.rs

use std::fs;

use tracing::{info, warn};

use crate::config::EnvSection;
use crate::events::EventBus;
use crate::types::Channel;

/// What [`ensure_docker_env`] found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The compose env file already exists.
    Present,
    /// It was copied from the example file.
    Created,
    /// It is missing and the example exists, but creation was not requested.
    Missing,
    /// Neither the compose env file nor its example exist.
    NoTemplate,
    /// Copying the example failed.
    Failed,
}

/// Make sure the env file read by the compose stack exists.
///
/// When it is missing and `auto_create_docker_env` is set, the example file
/// is copied into place; otherwise the user is told how to create it.
pub fn ensure_docker_env(env: &EnvSection, bus: &EventBus) -> BootstrapOutcome {
    let target = &env.docker_file;
    if target.exists() {
        return BootstrapOutcome::Present;
    }

    bus.warning(
        Channel::Manager,
        format!("File '{}' not found.", target.display()),
    );

    if !env.example_file.exists() {
        warn!(
            target = %target.display(),
            example = %env.example_file.display(),
            "no compose env file and no example to copy"
        );
        bus.error(
            Channel::Manager,
            format!(
                "Example file '{}' not found either. Create '{}' manually.",
                env.example_file.display(),
                target.display()
            ),
        );
        return BootstrapOutcome::NoTemplate;
    }

    if !env.auto_create_docker_env {
        bus.info(
            Channel::Manager,
            format!(
                "Copy '{}' to '{}' or set [env].auto_create_docker_env = true.",
                env.example_file.display(),
                target.display()
            ),
        );
        return BootstrapOutcome::Missing;
    }

    match fs::copy(&env.example_file, target) {
        Ok(_) => {
            info!(target = %target.display(), "created compose env file from example");
            bus.success(
                Channel::Manager,
                format!("Created '{}'.", target.display()),
            );
            BootstrapOutcome::Created
        }
        Err(e) => {
            warn!(target = %target.display(), error = %e, "failed to create compose env file");
            bus.error(
                Channel::Manager,
                format!("Failed to create '{}': {e}", target.display()),
            );
            BootstrapOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(dir: &tempfile::TempDir, auto: bool) -> EnvSection {
        EnvSection {
            file: dir.path().join(".env"),
            docker_file: dir.path().join(".env.docker"),
            example_file: dir.path().join(".env.example"),
            auto_create_docker_env: auto,
        }
    }

    #[test]
    fn existing_file_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let env = section(&dir, true);
        fs::write(&env.docker_file, "A=1\n").unwrap();
        let bus = EventBus::new();

        assert_eq!(ensure_docker_env(&env, &bus), BootstrapOutcome::Present);
        assert!(bus.is_empty());
    }

    #[test]
    fn example_is_copied_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let env = section(&dir, true);
        fs::write(&env.example_file, "DATABASE_URL=x\n").unwrap();
        let bus = EventBus::new();

        assert_eq!(ensure_docker_env(&env, &bus), BootstrapOutcome::Created);
        assert_eq!(fs::read_to_string(&env.docker_file).unwrap(), "DATABASE_URL=x\n");
    }

    #[test]
    fn example_is_not_copied_without_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let env = section(&dir, false);
        fs::write(&env.example_file, "DATABASE_URL=x\n").unwrap();
        let bus = EventBus::new();

        assert_eq!(ensure_docker_env(&env, &bus), BootstrapOutcome::Missing);
        assert!(!env.docker_file.exists());
    }

    #[test]
    fn missing_template_is_an_error_event() {
        let dir = tempfile::tempdir().unwrap();
        let env = section(&dir, true);
        let bus = EventBus::new();

        assert_eq!(ensure_docker_env(&env, &bus), BootstrapOutcome::NoTemplate);
        let events = bus.drain();
        assert_eq!(events.last().unwrap().severity, crate::types::Severity::Error);
    }
}
