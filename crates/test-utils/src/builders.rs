#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use devconsole::config::{ConsoleConfig, ProcessConfig, RawConsoleConfig};
use devconsole::types::Channel;

/// Environment file with both endpoint entries pointing at stale values.
pub const STALE_ENV: &str = "DATABASE_URL=old\nREDIS_URL=old\nOTHER=keep\n";

/// Builder for `ConsoleConfig` to simplify test setup.
///
/// Starts from the built-in defaults, with no readiness wait and no
/// configured processes.
pub struct ConsoleConfigBuilder {
    config: RawConsoleConfig,
}

impl ConsoleConfigBuilder {
    pub fn new() -> Self {
        let mut config = RawConsoleConfig::default();
        config.workflow.readiness_wait = "0s".to_string();
        config.process.clear();
        Self { config }
    }

    /// Point every env file path into `dir`.
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.config.env.file = dir.join(".env");
        self.config.env.docker_file = dir.join(".env.docker");
        self.config.env.example_file = dir.join(".env.example");
        self
    }

    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.env.file = path.into();
        self
    }

    pub fn teardown(mut self, argv: &[&str]) -> Self {
        self.config.commands.teardown = to_argv(argv);
        self
    }

    pub fn build_up(mut self, argv: &[&str]) -> Self {
        self.config.commands.build_up = to_argv(argv);
        self
    }

    pub fn up(mut self, argv: &[&str]) -> Self {
        self.config.commands.up = to_argv(argv);
        self
    }

    pub fn migrate(mut self, argv: &[&str]) -> Self {
        self.config.commands.migrate = to_argv(argv);
        self
    }

    pub fn readiness_wait(mut self, wait: &str) -> Self {
        self.config.workflow.readiness_wait = wait.to_string();
        self
    }

    pub fn stop_timeout(mut self, timeout: &str) -> Self {
        self.config.supervisor.stop_timeout = timeout.to_string();
        self
    }

    pub fn with_process(mut self, name: &str, channel: Channel, argv: &[&str]) -> Self {
        self.config.process.insert(
            name.to_string(),
            ProcessConfig {
                cmd: to_argv(argv),
                label: None,
                channel: Some(channel),
            },
        );
        self
    }

    pub fn raw(self) -> RawConsoleConfig {
        self.config
    }

    pub fn build(self) -> ConsoleConfig {
        ConsoleConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConsoleConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn to_argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// `sh -c <script>` as an argv list.
pub fn sh(script: &str) -> Vec<String> {
    to_argv(&["sh", "-c", script])
}

/// Write `contents` to `.env` inside `dir` and return its path.
pub fn write_env_file(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join(".env");
    fs::write(&path, contents).expect("failed to write env file");
    path
}
