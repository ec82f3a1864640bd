//! UseCase layer: command dispatch and interface switching.

pub mod dispatch_command;
pub mod switch_interface;

pub use dispatch_command::{CommandHandler, DispatchOutcome, Dispatcher, FnHandler};
pub use switch_interface::InterfaceManager;
