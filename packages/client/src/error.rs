//! Error types for the controller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    /// The kiosk closed the session with an error (another controller took over)
    #[error("Kiosk closed the session: {0}")]
    Rejected(String),

    /// Connecting failed or the connection dropped
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
