//! Interactive controller for the kiosk command channel.
//!
//! Reads commands from the terminal, sends one per line and prints the
//! kiosk's acknowledgements.

pub mod error;
pub mod formatter;
mod input;
pub mod runner;
pub mod session;

pub use runner::run_controller;
