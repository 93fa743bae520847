// src/supervisor/manager.rs

//! Process supervisor for the long-running development tools.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{ConsoleConfig, ProcessSpec};
use crate::envfile::ConfigModeSwitcher;
use crate::errors::SupervisorError;
use crate::events::EventBus;
use crate::exec::{build_command, display_argv};
use crate::supervisor::runner::supervise;
use crate::supervisor::signal;
use crate::supervisor::slot::{Slot, SlotState};
use crate::types::{Channel, EnvironmentMode};

#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    /// Grace period between the terminate request and a forced kill.
    pub stop_timeout: Duration,
    pub working_dir: Option<PathBuf>,
}

impl SupervisorOptions {
    pub fn from_config(cfg: &ConsoleConfig) -> Self {
        Self {
            stop_timeout: cfg.stop_timeout,
            working_dir: cfg.working_dir.clone(),
        }
    }
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            stop_timeout: Duration::from_secs(5),
            working_dir: None,
        }
    }
}

enum StopAction {
    NotRunning,
    Deferred(String),
    AlreadyStopping,
    Terminate {
        label: String,
        pid: Option<u32>,
        generation: u64,
    },
}

/// Shared state behind a [`ProcessSupervisor`].
#[derive(Debug)]
pub(crate) struct Inner {
    slots: Mutex<HashMap<String, Slot>>,
    next_generation: AtomicU64,
    released: Notify,
    pub(crate) bus: EventBus,
    switcher: ConfigModeSwitcher,
    options: SupervisorOptions,
}

impl Inner {
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the slot as exited. Returns `false` if the slot now belongs to a
    /// different process.
    pub(crate) fn mark_exited(&self, name: &str, generation: u64) -> bool {
        match self.slots().get_mut(name) {
            Some(slot) if slot.generation == generation => {
                slot.state = SlotState::Exited;
                slot.kill_tx = None;
                true
            }
            _ => false,
        }
    }

    /// Free the slot. Only the supervision task calls this, so a slot is
    /// removed exactly once.
    pub(crate) fn release(&self, name: &str, generation: u64) {
        {
            let mut slots = self.slots();
            if slots.get(name).is_some_and(|s| s.generation == generation) {
                slots.remove(name);
                debug!(process = %name, generation, "slot released");
            }
        }
        self.released.notify_waiters();
    }

    /// Take the force-kill sender if `generation` is still the live process.
    fn take_kill(&self, name: &str, generation: u64) -> Option<oneshot::Sender<()>> {
        self.slots()
            .get_mut(name)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.kill_tx.take())
    }
}

/// Owns the set of running named processes.
///
/// Cloning is cheap; all clones share one slot table. At most one process
/// runs per name. Slots are only ever removed by the supervision task that
/// observed the process exit, whether it exited on its own or after
/// [`stop`](Self::stop).
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    inner: Arc<Inner>,
}

impl ProcessSupervisor {
    pub fn new(bus: EventBus, switcher: ConfigModeSwitcher, options: SupervisorOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
                released: Notify::new(),
                bus,
                switcher,
                options,
            }),
        }
    }

    /// Start a configured process.
    pub fn start_process(&self, spec: &ProcessSpec) -> Result<(), SupervisorError> {
        self.launch(&spec.name, &spec.label, spec.channel, &spec.argv)
    }

    /// Start `argv` under `name`, streaming its output to `channel`.
    ///
    /// The environment file is switched to local endpoints before the spawn;
    /// a missing file only produces a warning.
    pub fn start(&self, name: &str, channel: Channel, argv: &[String]) -> Result<(), SupervisorError> {
        self.launch(name, name, channel, argv)
    }

    fn launch(
        &self,
        name: &str,
        label: &str,
        channel: Channel,
        argv: &[String],
    ) -> Result<(), SupervisorError> {
        let bus = &self.inner.bus;

        let generation = {
            let mut slots = self.inner.slots();
            if slots.contains_key(name) {
                drop(slots);
                debug!(process = %name, "start requested while already running");
                bus.warning(Channel::Manager, format!("Process '{label}' is already running."));
                return Err(SupervisorError::AlreadyRunning(name.to_string()));
            }
            let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
            slots.insert(
                name.to_string(),
                Slot::starting(generation, channel, label.to_string()),
            );
            generation
        };

        // Dev tools always talk to locally reachable infrastructure. The
        // switcher reports its own outcome; a missing file is not fatal.
        if let Err(e) = self.inner.switcher.apply(EnvironmentMode::Local) {
            debug!(process = %name, error = %e, "continuing without environment rewrite");
        }

        let rendered = display_argv(argv);
        bus.step(Channel::Manager, format!("Starting {label}..."));
        bus.command(Channel::Manager, format!("Running: {rendered}"));
        info!(process = %name, cmd = %rendered, generation, "starting supervised process");

        let spawned = build_command(argv, self.inner.options.working_dir.as_deref())
            .map_err(|e| e.to_string())
            .and_then(|mut cmd| {
                #[cfg(unix)]
                cmd.process_group(0);
                cmd.spawn().map_err(|e| format!("{rendered}: {e}"))
            });

        let child = match spawned {
            Ok(child) => child,
            Err(reason) => {
                warn!(process = %name, %reason, "failed to spawn supervised process");
                self.inner.release(name, generation);
                bus.error(channel, format!("Failed to start '{label}': {reason}"));
                return Err(SupervisorError::SpawnFailed {
                    name: name.to_string(),
                    reason,
                });
            }
        };

        let pid = child.id();
        let (kill_tx, kill_rx) = oneshot::channel();
        let stop_pending = {
            let mut slots = self.inner.slots();
            match slots.get_mut(name) {
                Some(slot) if slot.generation == generation => {
                    slot.state = SlotState::Running;
                    slot.pid = pid;
                    slot.kill_tx = Some(kill_tx);
                    slot.stop_requested
                }
                _ => false,
            }
        };

        tokio::spawn(supervise(
            Arc::clone(&self.inner),
            name.to_string(),
            label.to_string(),
            generation,
            channel,
            child,
            kill_rx,
        ));

        if stop_pending {
            debug!(process = %name, "delivering stop requested during startup");
            self.stop(name);
        }

        Ok(())
    }

    /// Ask the process running under `name` to exit.
    ///
    /// The slot moves to `Stopping` and the process group receives a
    /// graceful terminate request. If it is still alive after
    /// `stop_timeout`, it is killed. The slot itself is freed by the
    /// supervision task once the process is gone.
    pub fn stop(&self, name: &str) {
        let bus = &self.inner.bus;

        let action = {
            let mut slots = self.inner.slots();
            match slots.get_mut(name) {
                None => StopAction::NotRunning,
                Some(slot) => match slot.state {
                    SlotState::Starting => {
                        slot.stop_requested = true;
                        StopAction::Deferred(slot.label.clone())
                    }
                    SlotState::Running => {
                        slot.state = SlotState::Stopping;
                        StopAction::Terminate {
                            label: slot.label.clone(),
                            pid: slot.pid,
                            generation: slot.generation,
                        }
                    }
                    SlotState::Stopping | SlotState::Exited | SlotState::Idle => {
                        StopAction::AlreadyStopping
                    }
                },
            }
        };

        let (label, pid, generation) = match action {
            StopAction::NotRunning => {
                bus.info(Channel::Manager, format!("Process '{name}' is not running."));
                return;
            }
            StopAction::Deferred(label) => {
                bus.warning(
                    Channel::Manager,
                    format!("Stopping '{label}' once it has started..."),
                );
                return;
            }
            StopAction::AlreadyStopping => {
                debug!(process = %name, "stop ignored; already stopping");
                return;
            }
            StopAction::Terminate {
                label,
                pid,
                generation,
            } => (label, pid, generation),
        };

        info!(process = %name, ?pid, "stopping supervised process");
        bus.warning(Channel::Manager, format!("Stopping '{label}'..."));

        let terminated = match pid {
            Some(pid) => signal::terminate(pid),
            None => Err(std::io::Error::other("process id unavailable")),
        };
        if let Err(e) = terminated {
            debug!(process = %name, error = %e, "graceful terminate unavailable; killing");
            if let Some(kill) = self.inner.take_kill(name, generation) {
                let _ = kill.send(());
            }
            return;
        }

        self.spawn_kill_escalation(name.to_string(), label, generation);
    }

    fn spawn_kill_escalation(&self, name: String, label: String, generation: u64) {
        let inner = Arc::clone(&self.inner);
        let timeout = inner.options.stop_timeout;

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            let still_stopping = inner
                .slots()
                .get(&name)
                .is_some_and(|s| s.generation == generation && s.state == SlotState::Stopping);
            if !still_stopping {
                return;
            }

            if let Some(kill) = inner.take_kill(&name, generation) {
                warn!(process = %name, ?timeout, "process ignored terminate request; killing");
                inner.bus.warning(
                    Channel::Manager,
                    format!(
                        "'{label}' did not exit within {}s; killing it.",
                        timeout.as_secs_f32()
                    ),
                );
                let _ = kill.send(());
            }
        });
    }

    /// Current state of the slot for `name`.
    pub fn state(&self, name: &str) -> SlotState {
        self.inner
            .slots()
            .get(name)
            .map(|s| s.state)
            .unwrap_or(SlotState::Idle)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.state(name).is_active()
    }

    /// Names of all non-idle slots, sorted.
    pub fn active(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.slots().keys().cloned().collect();
        names.sort();
        names
    }

    /// Wait until `name` is idle. Returns `false` on timeout.
    pub async fn wait_idle(&self, name: &str, timeout: Duration) -> bool {
        self.wait_until(timeout, || !self.is_running(name)).await
    }

    /// Wait, without a deadline, until no process is active.
    pub async fn all_idle(&self) {
        loop {
            let released = self.inner.released.notified();
            if self.inner.slots().is_empty() {
                return;
            }
            released.await;
        }
    }

    /// Stop every active process and wait for all slots to become idle.
    ///
    /// Returns `false` if some process was still alive after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        let active = self.active();
        if active.is_empty() {
            return true;
        }

        info!(processes = ?active, "stopping all supervised processes");
        for name in &active {
            self.stop(name);
        }

        let clean = self
            .wait_until(timeout, || self.inner.slots().is_empty())
            .await;
        if !clean {
            warn!(remaining = ?self.active(), "processes still running after shutdown timeout");
        }
        clean
    }

    async fn wait_until(&self, timeout: Duration, done: impl Fn() -> bool) -> bool {
        // A timeout past the clock's range means "no deadline".
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let released = self.inner.released.notified();
            if done() {
                return true;
            }
            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, released).await.is_err() {
                        return done();
                    }
                }
                None => released.await,
            }
        }
    }
}
