//! Kiosk interfaces and the per-frame snapshot handed to the renderer.

use std::fmt;

use super::GamePhase;

/// The view the kiosk is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interface {
    /// Advertising video loop (shown at startup)
    #[default]
    Advertising,
    /// Slot machine game
    SlotMachine,
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interface::Advertising => f.write_str("advertising"),
            Interface::SlotMachine => f.write_str("slot machine"),
        }
    }
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub interface: Interface,
    /// Whether a spin is currently permitted (`state["active_button"]`)
    pub spin_enabled: bool,
    /// Current game phase label (`game_state["state"]`)
    pub phase: Option<GamePhase>,
    /// Spins played so far
    pub spin_count: u64,
}

impl Frame {
    pub fn new(interface: Interface, spin_count: u64) -> Self {
        Self {
            interface,
            spin_enabled: false,
            phase: None,
            spin_count,
        }
    }
}
