// src/envfile/mod.rs

//! Environment file handling.
//!
//! - [`switcher`] rewrites the endpoint entries for a given mode.
//! - [`lock`] hands out one mutex per environment file path so every writer
//!   in the process serializes on the same lock.
//! - [`bootstrap`] creates the compose env file from its template at
//!   startup.

pub mod bootstrap;
pub mod lock;
pub mod switcher;

pub use bootstrap::{BootstrapOutcome, ensure_docker_env};
pub use switcher::{ConfigModeSwitcher, DATABASE_KEY, REDIS_KEY, rewrite_entries};
