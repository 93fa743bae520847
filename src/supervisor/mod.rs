// src/supervisor/mod.rs

//! Supervision of long-running development processes.
//!
//! - [`manager`] owns the slot table and exposes `start` / `stop` /
//!   `shutdown`.
//! - [`slot`] defines the per-name state machine.
//! - [`runner`] is the supervision task spawned for every live process: it
//!   forwards output, waits for exit and frees the slot.
//! - [`signal`] wraps the platform-specific terminate/kill calls.

pub mod manager;
pub mod runner;
pub mod signal;
pub mod slot;

pub use manager::{ProcessSupervisor, SupervisorOptions};
pub use slot::SlotState;
