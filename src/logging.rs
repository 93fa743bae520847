// src/logging.rs

//! Internal tracing output.
//!
//! What the user sees comes from the event bus on stdout. This module only
//! sets up the developer-facing trace on stderr, which stays quiet (`warn`)
//! unless `--log-level` or `DEVCONSOLE_LOG` asks for more. The flag wins
//! over the variable.

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "DEVCONSOLE_LOG";

const QUIET: Level = Level::WARN;

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Install the stderr subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let from_env = std::env::var(LOG_ENV_VAR).ok();
    let level = effective_level(cli_level, from_env.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("tracing subscriber already set: {e}"))
}

/// An unrecognised variable value is ignored rather than rejected.
fn effective_level(cli_level: Option<LogLevel>, from_env: Option<&str>) -> Level {
    cli_level
        .map(Level::from)
        .or_else(|| from_env.and_then(level_named))
        .unwrap_or(QUIET)
}

fn level_named(name: &str) -> Option<Level> {
    let level = match name.trim().to_ascii_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => return None,
    };
    Some(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_variable() {
        assert_eq!(effective_level(Some(LogLevel::Error), Some("trace")), Level::ERROR);
        assert_eq!(effective_level(None, Some(" DEBUG ")), Level::DEBUG);
    }

    #[test]
    fn unknown_or_missing_variable_stays_quiet() {
        assert_eq!(effective_level(None, Some("loud")), Level::WARN);
        assert_eq!(effective_level(None, None), Level::WARN);
        assert_eq!(level_named("warning"), Some(Level::WARN));
    }
}
