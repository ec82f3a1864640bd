//! Domain layer: the command vocabulary, the kiosk interfaces and the
//! interfaces (traits) the outer layers implement.

pub mod command;
pub mod error;
pub mod interface;
pub mod renderer;
pub mod state_store;

pub use command::Command;
pub use error::{HandlerError, StoreError};
pub use interface::{Frame, Interface};
pub use renderer::Renderer;
#[cfg(test)]
pub use renderer::MockRenderer;
pub use state_store::{GamePhase, SharedState, StateStore, StateTable};
