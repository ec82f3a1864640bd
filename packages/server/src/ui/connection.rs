//! Per-connection read loop.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_util::{
    codec::{Framed, LinesCodec, LinesCodecError},
    sync::CancellationToken,
};

use super::{
    listener::ConnectionContext,
    state::{ConnectionId, PeerGuard},
};

/// Sent to a controller that was replaced by a newer connection.
const REPLACED_MESSAGE: &str = "ERROR: controller replaced by a new connection";

/// Upper bound on delivering [`REPLACED_MESSAGE`] to a peer that may be gone.
const REPLACED_NOTICE_TIMEOUT: Duration = Duration::from_secs(1);

/// Serve one controller until it disconnects, errors out, is replaced or the
/// server stops.
///
/// Each newline-terminated line is one command: it is recorded as the last
/// command, dispatched, then acknowledged. A trailing command without a
/// newline is still delivered when the peer closes its side.
///
/// `cancel` fires on server shutdown and when a newer controller takes over.
/// Every read and write is raced against it, so a peer that stops reading
/// cannot hold the task open.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer: PeerGuard,
    mut outbound: mpsc::UnboundedReceiver<String>,
    ctx: ConnectionContext,
    cancel: CancellationToken,
) {
    let id = peer.id();
    let addr = peer.addr();
    let mut framed = Framed::new(
        stream,
        LinesCodec::new_with_max_length(ctx.max_line_length),
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            frame = framed.next() => match frame {
                Some(Ok(line)) => {
                    if line.is_empty() {
                        continue;
                    }
                    if !on_command(&mut framed, &ctx, &line, id, &cancel).await {
                        break;
                    }
                }
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    // Framed stops yielding frames after a decode error.
                    tracing::warn!(
                        "Closing controller {} ({}): command longer than {} bytes",
                        id,
                        addr,
                        ctx.max_line_length
                    );
                    break;
                }
                Some(Err(LinesCodecError::Io(e))) => {
                    tracing::warn!("Receive error from controller {} ({}): {}", id, addr, e);
                    break;
                }
                None => {
                    tracing::info!("Controller {} ({}) closed the connection", id, addr);
                    break;
                }
            },
            Some(text) = outbound.recv() => {
                match send_line(&mut framed, &text, &cancel).await {
                    Some(Ok(())) => tracing::debug!("Sent {:?} to controller {}", text, id),
                    Some(Err(e)) => {
                        tracing::warn!("Failed to send {:?} to controller {}: {}", text, id, e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    if cancel.is_cancelled() {
        if peer.is_replaced() {
            tracing::info!("Controller {} ({}) replaced by a new connection", id, addr);
            notify_replaced(&mut framed, id).await;
        } else {
            tracing::debug!("Closing controller {} on shutdown", id);
        }
    }

    drop(framed);
    drop(peer);
    tracing::debug!("Connection {} closed", id);
}

/// Record, dispatch and acknowledge one command.
///
/// Returns `false` when the connection should close.
async fn on_command(
    framed: &mut Framed<TcpStream, LinesCodec>,
    ctx: &ConnectionContext,
    command: &str,
    id: ConnectionId,
    cancel: &CancellationToken,
) -> bool {
    tracing::info!("Received command {:?} from controller {}", command, id);

    ctx.state.record_command(command);
    ctx.dispatcher.dispatch(command);

    // Acknowledgement is best-effort; a failed write surfaces on the next read.
    let ack = format!("{} {}", ctx.ack_prefix, command);
    match send_line(framed, &ack, cancel).await {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            tracing::warn!("Failed to acknowledge {:?} to controller {}: {}", command, id, e);
        }
        None => return false,
    }
    !cancel.is_cancelled()
}

/// Write one line, or `None` if `cancel` fires while the write is blocked.
///
/// A write that completes without blocking still goes out after
/// cancellation, so the ack of a command that stopped the server is sent.
async fn send_line(
    framed: &mut Framed<TcpStream, LinesCodec>,
    line: &str,
    cancel: &CancellationToken,
) -> Option<Result<(), LinesCodecError>> {
    tokio::select! {
        biased;
        sent = framed.send(line) => Some(sent),
        _ = cancel.cancelled() => None,
    }
}

async fn notify_replaced(framed: &mut Framed<TcpStream, LinesCodec>, id: ConnectionId) {
    match tokio::time::timeout(REPLACED_NOTICE_TIMEOUT, framed.send(REPLACED_MESSAGE)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!("Failed to notify replaced controller {}: {}", id, e),
        Err(_) => tracing::debug!("Timed out notifying replaced controller {}", id),
    }
}
