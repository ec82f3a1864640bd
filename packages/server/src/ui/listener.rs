//! Accept loop.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;

use crate::usecase::Dispatcher;

use super::{connection::handle_connection, state::ChannelState};

/// Pause after a failed `accept` so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Everything a connection task needs besides its socket.
#[derive(Clone)]
pub(crate) struct ConnectionContext {
    pub state: Arc<ChannelState>,
    pub dispatcher: Arc<Dispatcher>,
    pub max_line_length: usize,
    pub ack_prefix: Arc<str>,
}

/// Accept controllers until `cancel` fires.
///
/// Owns the listening socket and every connection task it spawns; it returns
/// only after the socket is closed and all of those tasks have finished.
pub(crate) async fn accept_loop(
    listener: TcpListener,
    ctx: ConnectionContext,
    cancel: CancellationToken,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            Some(joined) = connections.join_next() => {
                if let Err(e) = joined
                    && e.is_panic()
                {
                    tracing::error!("Connection task panicked: {}", e);
                }
            }
            accepted = listener.accept() => {
                if cancel.is_cancelled() {
                    break;
                }
                match accepted {
                    Ok((stream, addr)) => {
                        accept_connection(stream, addr, &ctx, &cancel, &mut connections);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                }
            }
        }
    }

    drop(listener);
    ctx.state.set_running(false);
    tracing::info!("Command server stopped accepting connections");

    while let Some(joined) = connections.join_next().await {
        if let Err(e) = joined
            && e.is_panic()
        {
            tracing::error!("Connection task panicked: {}", e);
        }
    }
    tracing::info!("Command server shutdown complete");
}

fn accept_connection(
    stream: TcpStream,
    addr: SocketAddr,
    ctx: &ConnectionContext,
    cancel: &CancellationToken,
    connections: &mut JoinSet<()>,
) {
    // A controller that vanished without closing its socket would otherwise
    // hold the kiosk forever, so the newest connection always wins.
    let connection_cancel = cancel.child_token();
    let (tx, rx) = mpsc::unbounded_channel();
    let (peer, replaced) = ctx.state.attach_peer(addr, tx, connection_cancel.clone());
    if let Some(previous) = replaced {
        tracing::warn!(
            "Controller {} from {} replaces controller {} ({})",
            peer.id(),
            addr,
            previous.id,
            previous.addr
        );
    } else {
        tracing::info!("Controller {} connected from {}", peer.id(), addr);
    }

    connections.spawn(handle_connection(
        stream,
        peer,
        rx,
        ctx.clone(),
        connection_cancel,
    ));
}
