//! Renderer trait
//!
//! Drawing, audio and video playback live outside this crate. The frame loop
//! only talks to them through this trait.

use super::{Frame, Interface};

#[cfg_attr(test, mockall::automock)]
pub trait Renderer: Send {
    /// Tear down the current view and bring up `interface`.
    fn switch_to(&mut self, interface: Interface);

    /// Draw one frame.
    fn render(&mut self, frame: &Frame);
}
