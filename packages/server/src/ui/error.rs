//! Error types for the command channel.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// The listening socket could not be bound
    #[error("failed to bind command channel to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// `start` was called on a server that is already running
    #[error("command server has already been started")]
    AlreadyStarted,

    /// `start` was called after `stop`
    #[error("command server has been stopped")]
    Stopped,

    /// No controller is connected
    #[error("no controller connected")]
    NotConnected,

    /// The connection went away while the command was being queued
    #[error("failed to queue outbound command: {0}")]
    SendFailed(String),
}
