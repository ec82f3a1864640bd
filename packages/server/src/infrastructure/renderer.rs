//! Renderer that reports frames through tracing.
//!
//! Stands in for the graphical front end when the kiosk runs headless.

use crate::domain::{Frame, Interface, Renderer};

/// Logs interface switches at info level and frame changes at debug level.
#[derive(Debug, Default)]
pub struct LogRenderer {
    last_frame: Option<Frame>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for LogRenderer {
    fn switch_to(&mut self, interface: Interface) {
        tracing::info!("Switching to {}", interface);
        self.last_frame = None;
    }

    fn render(&mut self, frame: &Frame) {
        // Only log when something visible changed; frames tick at the display rate.
        if self.last_frame.as_ref() == Some(frame) {
            return;
        }
        tracing::debug!(
            "Rendering {} (spin enabled: {}, phase: {}, spins: {})",
            frame.interface,
            frame.spin_enabled,
            frame
                .phase
                .as_ref()
                .map(|phase| phase.label())
                .unwrap_or("-"),
            frame.spin_count
        );
        self.last_frame = Some(frame.clone());
    }
}
