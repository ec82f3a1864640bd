//! Interactive controller for the kiosk.
//!
//! Connects to the kiosk command channel and sends each line typed at the
//! `kiosk>` prompt as one command. Reconnects on disconnection (max 5
//! attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kiosk-controller
//! cargo run --bin kiosk-controller -- --addr 192.168.0.20:9999
//! ```

use clap::Parser;
use kiosk_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kiosk-controller")]
#[command(about = "Send commands to a kiosk over its TCP command channel", long_about = None)]
struct Args {
    /// Kiosk command channel address
    #[arg(short = 'a', long, env = "KIOSK_ADDR", default_value = "127.0.0.1:9999")]
    addr: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = kiosk_controller::run_controller(args.addr).await {
        tracing::error!("Controller error: {}", e);
        std::process::exit(1);
    }
}
