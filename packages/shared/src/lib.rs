//! Utilities shared by the kiosk server and the controller CLI.

pub mod logger;
pub mod time;
