//! Controller execution logic with reconnection support.

use std::time::Duration;

use crate::{
    error::ControllerError,
    input::spawn_readline,
    session::{SessionEnd, run_controller_session},
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the controller with reconnection logic
pub async fn run_controller(addr: String) -> Result<(), ControllerError> {
    let mut input = spawn_readline("kiosk> ".to_string());
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            addr,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_controller_session(&addr, &mut input).await {
            Ok(SessionEnd::InputClosed) => {
                tracing::info!("Controller session ended normally");
                return Ok(());
            }
            Ok(SessionEnd::KioskShutdown) => {
                tracing::info!("Kiosk shut down, exiting");
                return Ok(());
            }
            Err(e @ ControllerError::Rejected(_)) => {
                // Another controller took over; reconnecting would take it back.
                return Err(e);
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}
