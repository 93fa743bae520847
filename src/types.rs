use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which infrastructure endpoints the environment file points at.
///
/// - `Local`: services reachable from the host (`localhost`).
/// - `Containerized`: service names on the compose network (`db`, `redis`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentMode {
    Local,
    Containerized,
}

impl EnvironmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentMode::Local => "local",
            EnvironmentMode::Containerized => "containerized",
        }
    }
}

impl fmt::Display for EnvironmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(EnvironmentMode::Local),
            "containerized" | "docker" => Ok(EnvironmentMode::Containerized),
            other => Err(format!(
                "invalid environment mode: {other} (expected \"local\" or \"containerized\")"
            )),
        }
    }
}

/// Log destination. The manager channel carries everything that is not the
/// output of a supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Manager,
    Server,
    Worker,
    Studio,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Manager,
        Channel::Server,
        Channel::Worker,
        Channel::Studio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Manager => "manager",
            Channel::Server => "server",
            Channel::Worker => "worker",
            Channel::Studio => "studio",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manager" => Ok(Channel::Manager),
            "server" | "dev" => Ok(Channel::Server),
            "worker" => Ok(Channel::Worker),
            "studio" => Ok(Channel::Studio),
            other => Err(format!(
                "unknown channel: {other} (expected manager, server, worker or studio)"
            )),
        }
    }
}

/// How a log line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    /// Start of a named step in an operation.
    Step,
    /// The argv about to be executed.
    Command,
}

impl Severity {
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Info => " ",
            Severity::Success => "✔",
            Severity::Warning => "!",
            Severity::Error => "✘",
            Severity::Step => "▶",
            Severity::Command => "$",
        }
    }
}
