//! Kiosk display server.
//!
//! Listens for a controller on TCP and switches the display between the
//! advertising loop and the slot machine on its commands.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kiosk-server
//! cargo run --bin kiosk-server -- --host 127.0.0.1 --port 9999
//! PORT=9000 COUNTER=12 cargo run --bin kiosk-server
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use kiosk_server::{
    config::{
        AppConfig, DEFAULT_ACK_PREFIX, DEFAULT_FPS, DEFAULT_HOST, DEFAULT_MAX_LINE_LENGTH,
        DEFAULT_PORT, DEFAULT_STATE_PATH, ServerConfig,
    },
    domain::{Command, SharedState},
    infrastructure::{JsonFileStateStore, LogRenderer},
    ui::{CommandServer, FrameLoopOptions, ShutdownHandle, run_frame_loop, signal::shutdown_signal},
    usecase::Dispatcher,
};
use kiosk_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kiosk-server")]
#[command(about = "Kiosk display driven by a TCP command channel", long_about = None)]
struct Args {
    /// Host address to bind the command channel to
    #[arg(short = 'H', long, env = "IP_ADDRESS", default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the command channel to
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Spins played so far
    #[arg(short = 'c', long, env = "COUNTER", default_value_t = 0)]
    counter: u64,

    /// Path of the shared state file
    #[arg(short = 's', long, env = "KIOSK_STATE_PATH", default_value = DEFAULT_STATE_PATH)]
    state_path: PathBuf,

    /// Display refresh rate
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Longest command accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    max_line_length: usize,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        Self {
            server: ServerConfig {
                host: args.host,
                port: args.port,
                max_line_length: args.max_line_length,
                ack_prefix: DEFAULT_ACK_PREFIX.to_string(),
            },
            counter: args.counter,
            state_path: args.state_path,
            fps: args.fps,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = AppConfig::from(Args::parse());
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize dependencies in order:
    // 1. Shared state store
    // 2. Command server and its handlers
    // 3. Frame loop

    // 1. Open the shared state table once for the whole run
    let store = Arc::new(JsonFileStateStore::open(&config.state_path).await?);
    let shared = SharedState::new(store);

    // 2. Start the command channel; a bind failure aborts startup
    let server = CommandServer::new(config.server.clone());
    let dispatcher = build_dispatcher(server.shutdown_handle());
    server.start(dispatcher).await?;

    // 3. Render until "salir" or a signal stops the channel
    let client = server.client();
    let shutdown = server.shutdown_handle();
    let mut renderer = LogRenderer::new();
    let options = FrameLoopOptions {
        fps: config.fps,
        spin_count: config.counter,
    };

    tokio::select! {
        _ = run_frame_loop(client, &mut renderer, shared, options) => {}
        _ = shutdown_signal() => shutdown.stop(),
    }

    server.stop();
    server.wait().await;

    Ok(())
}

/// Handlers for the kiosk vocabulary.
///
/// View switching itself happens in the frame loop, which reads the last
/// command; the handlers only log the request.
fn build_dispatcher(shutdown: ShutdownHandle) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();

    dispatcher.register_command(Command::Draw, || {
        tracing::info!("Controller requested the slot machine");
        Ok(())
    });
    dispatcher.register_command(Command::Advertise, || {
        tracing::info!("Controller requested the advertising loop");
        Ok(())
    });
    dispatcher.register_command(Command::Button, || {
        tracing::debug!("Button command received (reserved)");
        Ok(())
    });
    dispatcher.register_command(Command::Exit, move || {
        tracing::info!("Controller requested shutdown");
        shutdown.stop();
        Ok(())
    });

    dispatcher
}
