//! Client Facade
//!
//! The only view of the command channel the frame loop uses. Every method is
//! a short read or a channel push; none of them wait on the network.

use std::sync::Arc;

use super::{
    ChannelError,
    state::{ChannelState, ChannelStatus, PeerInfo},
};

#[derive(Clone)]
pub struct ClientFacade {
    state: Arc<ChannelState>,
}

impl ClientFacade {
    pub(crate) fn new(state: Arc<ChannelState>) -> Self {
        Self { state }
    }

    /// Most recently received command, or `None` before the first one.
    pub fn last_command(&self) -> Option<String> {
        self.state.last_command()
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn status(&self) -> ChannelStatus {
        self.state.status()
    }

    /// The controller currently attached, if any.
    pub fn peer(&self) -> Option<PeerInfo> {
        self.state.peer_info()
    }

    /// Send `text` as one line to the connected controller.
    ///
    /// # Errors
    ///
    /// [`ChannelError::NotConnected`] when no controller is attached.
    pub fn send_command(&self, text: &str) -> Result<(), ChannelError> {
        self.state.send(text)
    }
}
