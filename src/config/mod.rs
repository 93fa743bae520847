// src/config/mod.rs

//! Configuration loading and validation for devconsole.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate command lists, URLs, durations and process entries
//!   (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    CommandsSection, ConsoleConfig, EndpointSet, EndpointsSection, EnvSection, PreflightSection,
    ProcessConfig, ProcessSpec, RawConsoleConfig, SupervisorSection, WorkflowSection,
};
