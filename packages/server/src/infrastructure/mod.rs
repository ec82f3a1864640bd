//! Infrastructure layer: concrete implementations of the domain traits.

pub mod renderer;
pub mod store;

pub use renderer::LogRenderer;
pub use store::{InMemoryStateStore, JsonFileStateStore};
