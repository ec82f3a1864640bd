//! TCP command channel and the kiosk frame loop.
//!
//! ```text
//! controller ──TCP──▶ listener ──spawn──▶ connection ──▶ Dispatcher
//!                                              │
//!                                              ▼
//!                      frame loop ◀── ClientFacade ◀── ChannelState
//! ```

mod client;
mod connection;
mod error;
mod frame_loop;
mod listener;
mod server;
pub mod signal;
mod state;

pub use client::ClientFacade;
pub use error::ChannelError;
pub use frame_loop::{FrameLoopOptions, run_frame_loop};
pub use server::{CommandServer, ShutdownHandle};
pub use state::{ChannelStatus, ConnectionId, PeerInfo};
