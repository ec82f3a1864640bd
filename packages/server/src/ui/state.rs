//! State shared between the listener, the connection tasks and the
//! [`ClientFacade`](super::ClientFacade).
//!
//! The last command, the connection flag and the active peer are the only
//! values written by more than one task. Locks are never held across an
//! `.await`.

use std::{
    fmt,
    net::SocketAddr,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, RwLock,
        atomic::{AtomicBool, Ordering},
    },
};

use kiosk_shared::time::{Clock, timestamp_to_rfc3339};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::ChannelError;

/// Lifecycle of a command server.
///
/// `Stopped → Listening → Connected ⇄ Listening → Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Stopped,
    Listening,
    Connected,
}

/// Identifies one accepted controller connection in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The controller currently attached to the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: ConnectionId,
    pub addr: SocketAddr,
    /// Unix timestamp when accepted (UTC, milliseconds)
    pub connected_at: i64,
}

impl PeerInfo {
    pub fn connected_at_rfc3339(&self) -> Option<String> {
        timestamp_to_rfc3339(self.connected_at)
    }
}

struct ActivePeer {
    info: PeerInfo,
    outbound: mpsc::UnboundedSender<String>,
    /// Closes this peer's connection task when a newer controller arrives.
    cancel: CancellationToken,
}

pub(crate) struct ChannelState {
    started: AtomicBool,
    running: AtomicBool,
    connected: AtomicBool,
    last_command: RwLock<Option<String>>,
    peer: Mutex<Option<ActivePeer>>,
    clock: Arc<dyn Clock>,
}

impl ChannelState {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            started: AtomicBool::new(false),
            running: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            last_command: RwLock::new(None),
            peer: Mutex::new(None),
            clock,
        }
    }

    /// Claim the one-time transition out of the initial `Stopped` state.
    pub(crate) fn try_mark_started(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Undo [`try_mark_started`](Self::try_mark_started) after a failed bind.
    pub(crate) fn clear_started(&self) {
        self.started.store(false, Ordering::Release);
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub(crate) fn status(&self) -> ChannelStatus {
        if !self.is_running() {
            ChannelStatus::Stopped
        } else if self.is_connected() {
            ChannelStatus::Connected
        } else {
            ChannelStatus::Listening
        }
    }

    /// Overwrite the last command. There is no queue: a command not yet
    /// observed by the poller is simply replaced.
    pub(crate) fn record_command(&self, command: &str) {
        let mut last = self
            .last_command
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *last = Some(command.to_string());
    }

    pub(crate) fn last_command(&self) -> Option<String> {
        self.last_command
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make `addr` the active peer. The returned guard detaches it on drop.
    ///
    /// A previously active peer is replaced: its `cancel` token fires and its
    /// info is returned.
    pub(crate) fn attach_peer(
        self: &Arc<Self>,
        addr: SocketAddr,
        outbound: mpsc::UnboundedSender<String>,
        cancel: CancellationToken,
    ) -> (PeerGuard, Option<PeerInfo>) {
        let info = PeerInfo {
            id: ConnectionId::new(),
            addr,
            connected_at: self.clock.now_millis(),
        };
        let id = info.id;

        let previous = {
            let mut peer = self.lock_peer();
            let previous = peer.replace(ActivePeer {
                info,
                outbound,
                cancel,
            });
            self.connected.store(true, Ordering::Release);
            previous
        };
        let replaced = previous.map(|active| {
            active.cancel.cancel();
            active.info
        });

        let guard = PeerGuard {
            state: Arc::clone(self),
            id,
            addr,
        };
        (guard, replaced)
    }

    fn is_active_peer(&self, id: ConnectionId) -> bool {
        self.lock_peer()
            .as_ref()
            .is_some_and(|active| active.info.id == id)
    }

    fn detach_peer(&self, id: ConnectionId) {
        let mut peer = self.lock_peer();
        if peer.as_ref().is_some_and(|active| active.info.id == id) {
            *peer = None;
            self.connected.store(false, Ordering::Release);
        }
    }

    pub(crate) fn peer_info(&self) -> Option<PeerInfo> {
        self.lock_peer().as_ref().map(|active| active.info.clone())
    }

    /// Queue `text` for the active peer's connection task.
    pub(crate) fn send(&self, text: &str) -> Result<(), ChannelError> {
        let peer = self.lock_peer();
        let active = peer.as_ref().ok_or(ChannelError::NotConnected)?;
        active
            .outbound
            .send(text.to_string())
            .map_err(|e| ChannelError::SendFailed(e.to_string()))
    }

    fn lock_peer(&self) -> MutexGuard<'_, Option<ActivePeer>> {
        self.peer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a connection registered as the active peer while alive.
///
/// Dropping it (normal exit, error or panic in the connection task) clears
/// the connection-established flag.
pub(crate) struct PeerGuard {
    state: Arc<ChannelState>,
    id: ConnectionId,
    addr: SocketAddr,
}

impl PeerGuard {
    pub(crate) fn id(&self) -> ConnectionId {
        self.id
    }

    pub(crate) fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Whether a newer connection has taken over as the active peer.
    pub(crate) fn is_replaced(&self) -> bool {
        !self.state.is_active_peer(self.id)
    }
}

impl Drop for PeerGuard {
    fn drop(&mut self) {
        self.state.detach_peer(self.id);
    }
}
