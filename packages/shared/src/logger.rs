//! Logging setup utilities for the kiosk binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Both the library crates and the binary log at `default_log_level` unless
/// the `RUST_LOG` environment variable overrides it.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "kiosk_server", "kiosk_controller")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use kiosk_shared::logger::setup_logger;
///
/// setup_logger("kiosk_server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let binary_target = binary_name.replace('-', "_");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "kiosk_server={level},kiosk_controller={level},kiosk_shared={level},{binary}={level}",
                    level = default_log_level,
                    binary = binary_target,
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
