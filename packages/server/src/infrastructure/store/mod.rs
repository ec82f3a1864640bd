//! StateStore implementations
//!
//! - `inmemory`: process-local tables, used by tests and ephemeral runs
//! - `json_file`: durable tables backed by a single JSON document

pub mod inmemory;
pub mod json_file;

pub use inmemory::InMemoryStateStore;
pub use json_file::JsonFileStateStore;
