// src/preflight.rs

//! Startup check for the external tools the workflows shell out to.

use tracing::{debug, warn};

use crate::events::EventBus;
use crate::types::Channel;

/// Look up every tool on `PATH` and report each result on the manager
/// channel. Returns the tools that could not be found.
pub fn check_dependencies(tools: &[String], bus: &EventBus) -> Vec<String> {
    bus.step(Channel::Manager, "Checking dependencies...");

    let mut missing = Vec::new();
    for tool in tools {
        match which::which(tool) {
            Ok(path) => {
                debug!(%tool, path = %path.display(), "tool found");
                bus.success(Channel::Manager, format!("{tool} found."));
            }
            Err(e) => {
                warn!(%tool, error = %e, "tool not found on PATH");
                bus.error(
                    Channel::Manager,
                    format!("{tool} not found. Install it and make sure it is on PATH."),
                );
                missing.push(tool.clone());
            }
        }
    }

    if missing.is_empty() {
        bus.success(Channel::Manager, "All dependencies are available.");
    } else {
        bus.error(
            Channel::Manager,
            format!("Missing dependencies: {}. Operations are disabled.", missing.join(", ")),
        );
    }
    missing
}
