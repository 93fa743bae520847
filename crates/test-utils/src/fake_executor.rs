use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use devconsole::events::EventBus;
use devconsole::exec::{CommandExecutor, display_argv};
use devconsole::types::Channel;

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    /// Contents of the watched env file at the time of the call.
    pub env_snapshot: Option<String>,
}

/// A fake executor that:
/// - records every argv it is asked to run
/// - fails the commands registered with [`fail_on`](Self::fail_on)
/// - narrates on the bus the way the real runner does, including exactly
///   one error event per failure.
#[derive(Clone)]
pub struct ScriptedExecutor {
    bus: EventBus,
    failing: Vec<Vec<String>>,
    delay: Option<Duration>,
    watch_file: Option<PathBuf>,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl ScriptedExecutor {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            failing: Vec::new(),
            delay: None,
            watch_file: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn fail_on(mut self, argv: Vec<String>) -> Self {
        self.failing.push(argv);
        self
    }

    /// Make every command take `delay` before it "exits".
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Snapshot this file on every call.
    pub fn watching(mut self, path: impl Into<PathBuf>) -> Self {
        self.watch_file = Some(path.into());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|c| c.argv).collect()
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn run<'a>(
        &'a self,
        argv: &'a [String],
        description: &'a str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            let env_snapshot = self
                .watch_file
                .as_ref()
                .and_then(|p| std::fs::read_to_string(p).ok());
            self.calls.lock().unwrap().push(Invocation {
                argv: argv.to_vec(),
                env_snapshot,
            });

            self.bus.step(Channel::Manager, description);
            self.bus
                .command(Channel::Manager, format!("Running: {}", display_argv(argv)));

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if self.failing.iter().any(|f| f.as_slice() == argv) {
                self.bus.error(Channel::Manager, "Command failed (code 1).");
                false
            } else {
                self.bus.success(Channel::Manager, "Completed successfully.");
                true
            }
        })
    }
}
