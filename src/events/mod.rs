// src/events/mod.rs

//! Log event pipeline.
//!
//! Every component reports what it is doing by publishing [`LogEvent`]s on
//! the shared [`EventBus`]. Producers never render anything themselves; a
//! single consumer loop (see [`render`]) drains the bus on a fixed interval
//! and owns all presentation state.
//!
//! - [`bus`] holds the queue itself.
//! - [`render`] contains the [`Renderer`] trait, the terminal renderer and
//!   the polling consumer loop.

pub mod bus;
pub mod render;

use crate::types::{Channel, Severity};

pub use bus::EventBus;
pub use render::{Renderer, TerminalRenderer, spawn_consumer};

/// One line of output destined for a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub channel: Channel,
    pub text: String,
    pub severity: Severity,
}

impl LogEvent {
    pub fn new(channel: Channel, severity: Severity, text: impl Into<String>) -> Self {
        Self {
            channel,
            text: text.into(),
            severity,
        }
    }
}
