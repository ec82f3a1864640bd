//! Domain error types.

use thiserror::Error;

/// Error returned by a command handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("handler failed: {0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors raised by a [`StateStore`](super::StateStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("state store I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The backing file does not hold a valid state document
    #[error("state store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
