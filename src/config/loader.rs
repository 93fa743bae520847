// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConsoleConfig, RawConsoleConfig};
use crate::errors::Result;

/// Load a configuration file and return the raw `RawConsoleConfig`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// a usable [`ConsoleConfig`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConsoleConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConsoleConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConsoleConfig> {
    let raw_config = load_from_path(&path)?;
    let config = ConsoleConfig::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for a run.
///
/// - An explicit path must exist and validate.
/// - Without one, `Devconsole.toml` in the working directory is used when
///   present; otherwise the built-in defaults apply.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConsoleConfig> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        debug!(path = %default_path.display(), "loading default config file");
        load_and_validate(&default_path)
    } else {
        debug!("no config file found; using built-in defaults");
        ConsoleConfig::try_from(RawConsoleConfig::default())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("Devconsole.toml")
}
