// src/supervisor/runner.rs

//! Supervision task for a single long-running process.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::events::EventBus;
use crate::supervisor::manager::Inner;
use crate::supervisor::signal;
use crate::types::Channel;

/// How long output readers may keep draining after the process exited.
/// Grandchildren that inherited the pipes can keep them open indefinitely.
const READER_DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Forward the child's output, wait for it to exit (or kill it when asked),
/// report the outcome and free the slot.
///
/// The slot is released only after both readers are finished, so no output
/// event for this process is published once its slot is idle.
pub(crate) async fn supervise(
    inner: Arc<Inner>,
    name: String,
    label: String,
    generation: u64,
    channel: Channel,
    mut child: Child,
    mut kill_rx: oneshot::Receiver<()>,
) {
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_line_forwarder(stdout, channel, inner.bus.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_line_forwarder(stderr, channel, inner.bus.clone()));
    }

    let status = tokio::select! {
        status = child.wait() => status,
        Ok(()) = &mut kill_rx => {
            info!(process = %name, generation, "force-killing supervised process");
            if let Some(pid) = child.id() {
                if let Err(e) = signal::kill_group(pid) {
                    debug!(process = %name, error = %e, "process group kill failed");
                }
            }
            if let Err(e) = child.start_kill() {
                warn!(process = %name, error = %e, "failed to kill supervised process");
            }
            child.wait().await
        }
    };

    for reader in readers {
        finish_reader(reader).await;
    }

    inner.mark_exited(&name, generation);

    match status {
        Ok(status) => match status.code() {
            Some(0) | None => {
                info!(process = %name, generation, ?status, "supervised process finished");
                inner
                    .bus
                    .success(channel, format!("Process '{label}' finished."));
            }
            Some(code) => {
                info!(process = %name, generation, exit_code = code, "supervised process failed");
                inner.bus.error(
                    channel,
                    format!("Process '{label}' exited with error code {code}."),
                );
            }
        },
        Err(e) => {
            warn!(process = %name, generation, error = %e, "lost track of supervised process");
            inner
                .bus
                .error(channel, format!("Lost track of process '{label}': {e}"));
        }
    }

    inner.release(&name, generation);
}

fn spawn_line_forwarder<R>(stream: R, channel: Channel, bus: EventBus) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    bus.info(channel, line.trim_end_matches(['\r', '\n']));
                }
                Err(e) => {
                    debug!(%channel, error = %e, "output stream read failed");
                    break;
                }
            }
        }
    })
}

async fn finish_reader(mut reader: JoinHandle<()>) {
    if tokio::time::timeout(READER_DRAIN_GRACE, &mut reader)
        .await
        .is_err()
    {
        debug!("output reader still open after exit; aborting");
        reader.abort();
        let _ = reader.await;
    }
}
