// src/workflow/gate.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "an operation is in progress" flag.
///
/// The front end checks [`is_busy`](Self::is_busy) before accepting any
/// trigger; the sequencer holds a [`BusyGuard`] for the whole workflow.
#[derive(Debug, Clone, Default)]
pub struct BusyGate {
    busy: Arc<AtomicBool>,
}

impl BusyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the gate. Returns `None` if it is already held.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Releases the gate when dropped, including on early return or panic.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
