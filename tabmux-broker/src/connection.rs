//! Tab connection handling
//!
//! Accepts Unix-socket connections from tabs and runs one task per
//! connection: the tab's port is registered with the broker before any
//! of its frames are read, queued replies are drained to the socket by
//! a writer task, and decoded commands are forwarded to the broker loop
//! in the order the tab sent them.

use std::path::PathBuf;

use futures::{SinkExt, StreamExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc};
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

use tabmux_protocol::{BrokerCodec, CodecError};
use tabmux_utils::{ensure_dir, Result, TabmuxError};

use crate::router::BrokerHandle;

/// Run the Unix-socket accept loop
///
/// Binds at `path` (replacing a stale socket from a previous run) and
/// spawns a tab handler per connection until a shutdown signal arrives.
pub async fn run_accept_loop(
    path: PathBuf,
    handle: BrokerHandle,
    reply_queue_depth: usize,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    if let Some(dir) = path.parent() {
        ensure_dir(&dir.to_path_buf())?;
    }
    if path.exists() {
        std::fs::remove_file(&path)?;
    }

    let listener = UnixListener::bind(&path).map_err(|e| {
        TabmuxError::connection(format!("Failed to bind {}: {}", path.display(), e))
    })?;

    info!("Broker listening on {}", path.display());

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        debug!("New tab connection");
                        let handle = handle.clone();
                        tokio::spawn(async move {
                            handle_tab(stream, handle, reply_queue_depth).await;
                        });
                    }
                    Err(e) => {
                        error!("Accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received, stopping accept loop");
                break;
            }
        }
    }

    let _ = std::fs::remove_file(&path);
    Ok(())
}

/// Serve one tab connection until its transport closes
async fn handle_tab(stream: UnixStream, broker: BrokerHandle, reply_queue_depth: usize) {
    let framed = Framed::new(stream, BrokerCodec::new());
    let (mut sink, mut frames) = framed.split();

    let (reply_tx, mut reply_rx) = mpsc::channel(reply_queue_depth);
    let port = match broker.connect(reply_tx).await {
        Ok(port) => port,
        Err(e) => {
            warn!("Failed to register tab: {}", e);
            return;
        }
    };
    let port_id = port.id();
    info!("{} connected", port_id);

    // Drain queued replies to the socket
    let writer = tokio::spawn(async move {
        while let Some(reply) = reply_rx.recv().await {
            if let Err(e) = sink.send(reply).await {
                debug!("{} write failed: {}", port_id, e);
                break;
            }
        }
    });

    while let Some(frame) = frames.next().await {
        match frame {
            Ok(command) => {
                if broker.send(&port, command).await.is_err() {
                    // Broker loop is gone; nothing left to serve
                    break;
                }
            }
            Err(CodecError::Json(e)) => {
                // Unknown cmd or malformed data: ignore the frame and keep going
                warn!("{} sent an unrecognized message, ignoring: {}", port_id, e);
            }
            Err(e) => {
                warn!("{} transport error: {}", port_id, e);
                break;
            }
        }
    }

    // The port stays registered unless the tab sent DELETE-PORT; the
    // registry does no liveness detection.
    info!("{} disconnected", port_id);
    writer.abort();
}
