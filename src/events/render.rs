// src/events/render.rs

//! The single consumer side of the event pipeline.

use std::io::Write;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::{EventBus, LogEvent};

/// How often the consumer drains the bus.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something that presents drained events. Only the consumer loop calls it,
/// so implementations can own mutable state without any locking.
pub trait Renderer: Send + 'static {
    fn render(&mut self, event: &LogEvent);

    fn flush(&mut self) {}
}

/// Writes each event as `[channel] <symbol> text`, one line per text line.
#[derive(Debug)]
pub struct TerminalRenderer<W: Write + Send + 'static> {
    out: W,
}

impl<W: Write + Send + 'static> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + 'static> Renderer for TerminalRenderer<W> {
    fn render(&mut self, event: &LogEvent) {
        let prefix = format!("[{:<7}] {}", event.channel.as_str(), event.severity.symbol());
        let mut lines = event.text.lines().peekable();
        if lines.peek().is_none() {
            let _ = writeln!(self.out, "{prefix}");
            return;
        }
        for line in lines {
            if let Err(e) = writeln!(self.out, "{prefix} {line}") {
                warn!(error = %e, "failed to write log line");
                return;
            }
        }
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}

/// Spawn the consumer loop.
///
/// Every `interval` the loop drains the bus and hands the events to
/// `renderer` in publish order. When `shutdown` flips to `true` it performs
/// one last drain and returns the renderer.
pub fn spawn_consumer<R: Renderer>(
    bus: EventBus,
    mut renderer: R,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<R> {
    tokio::spawn(async move {
        debug!(?interval, "event consumer started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    render_batch(&bus, &mut renderer);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        render_batch(&bus, &mut renderer);
        debug!("event consumer finished");
        renderer
    })
}

fn render_batch<R: Renderer>(bus: &EventBus, renderer: &mut R) {
    let batch = bus.drain();
    if batch.is_empty() {
        return;
    }
    for event in &batch {
        renderer.render(event);
    }
    renderer.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channel, Severity};

    #[test]
    fn terminal_renderer_prefixes_every_line() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render(&LogEvent::new(Channel::Worker, Severity::Error, "first\nsecond"));
        renderer.render(&LogEvent::new(Channel::Manager, Severity::Step, "Building"));

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(
            out,
            "[worker ] ✘ first\n[worker ] ✘ second\n[manager] ▶ Building\n"
        );
    }

    #[derive(Default)]
    struct Collect(Vec<LogEvent>);

    impl Renderer for Collect {
        fn render(&mut self, event: &LogEvent) {
            self.0.push(event.clone());
        }
    }

    #[tokio::test]
    async fn consumer_renders_everything_published_before_shutdown() {
        let bus = EventBus::new();
        let (tx, rx) = watch::channel(false);
        let handle = spawn_consumer(bus.clone(), Collect::default(), Duration::from_millis(5), rx);

        bus.info(Channel::Server, "a");
        tokio::time::sleep(Duration::from_millis(20)).await;
        bus.info(Channel::Server, "b");
        tx.send(true).unwrap();

        let collected = handle.await.unwrap();
        let texts: Vec<_> = collected.0.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }
}
