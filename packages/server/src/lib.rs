//! Kiosk command channel library.
//!
//! A kiosk switches between a slot machine and an advertising loop on
//! commands sent by an external controller over TCP. This crate holds the
//! command server, the dispatcher, the shared state table and the frame
//! loop that ties them to the display.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
