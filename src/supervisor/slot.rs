// src/supervisor/slot.rs

use tokio::sync::oneshot;

use crate::types::Channel;

/// Lifecycle of one named process slot.
///
/// `Idle -> Starting -> Running -> {Stopping -> Idle | Exited -> Idle}`.
/// `Idle` is never stored: a name without an entry in the table is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Starting,
    Running,
    Stopping,
    Exited,
}

impl SlotState {
    /// Whether a process for this slot may still be alive.
    pub fn is_active(&self) -> bool {
        !matches!(self, SlotState::Idle)
    }
}

/// Control side of an occupied slot. The child itself lives in the
/// supervision task.
#[derive(Debug)]
pub(crate) struct Slot {
    pub state: SlotState,
    /// Distinguishes successive processes started under the same name, so a
    /// late timer or exit for an old process never touches a new one.
    pub generation: u64,
    pub channel: Channel,
    pub label: String,
    pub pid: Option<u32>,
    /// `stop()` arrived while the process was still being spawned.
    pub stop_requested: bool,
    /// Asks the supervision task to force-kill the child.
    pub kill_tx: Option<oneshot::Sender<()>>,
}

impl Slot {
    pub fn starting(generation: u64, channel: Channel, label: String) -> Self {
        Self {
            state: SlotState::Starting,
            generation,
            channel,
            label,
            pid: None,
            stop_requested: false,
            kill_tx: None,
        }
    }
}
