// src/events/bus.rs

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::LogEvent;
use crate::types::{Channel, Severity};

/// Unbounded, ordered queue of [`LogEvent`]s.
///
/// Cloning is cheap and every clone shares the same queue, so each producer
/// (command runner, process readers, workflows) holds its own handle.
/// `publish` only takes the lock long enough to push; `drain` swaps the whole
/// queue out in one go.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    queue: Arc<Mutex<VecDeque<LogEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, event: LogEvent) {
        self.lock().push_back(event);
    }

    /// Take every queued event in publish order, leaving the queue empty.
    pub fn drain(&self) -> Vec<LogEvent> {
        let mut queue = self.lock();
        std::mem::take(&mut *queue).into()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn info(&self, channel: Channel, text: impl Into<String>) {
        self.publish(LogEvent::new(channel, Severity::Info, text));
    }

    pub fn success(&self, channel: Channel, text: impl Into<String>) {
        self.publish(LogEvent::new(channel, Severity::Success, text));
    }

    pub fn warning(&self, channel: Channel, text: impl Into<String>) {
        self.publish(LogEvent::new(channel, Severity::Warning, text));
    }

    pub fn error(&self, channel: Channel, text: impl Into<String>) {
        self.publish(LogEvent::new(channel, Severity::Error, text));
    }

    pub fn step(&self, channel: Channel, text: impl Into<String>) {
        self.publish(LogEvent::new(channel, Severity::Step, text));
    }

    pub fn command(&self, channel: Channel, text: impl Into<String>) {
        self.publish(LogEvent::new(channel, Severity::Command, text));
    }

    // A producer that panicked mid-push cannot leave the deque half-written,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEvent>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
