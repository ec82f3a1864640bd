//! Kiosk frame loop
//!
//! Single-task, cooperative loop ticking at the display rate. Each tick it
//! polls the [`ClientFacade`] once, switches the interface if the latest
//! command asks for it, and hands a [`Frame`] to the renderer. A controller
//! disconnect changes nothing: the last interface keeps rendering.

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::{
    domain::{Frame, Interface, Renderer, SharedState},
    usecase::InterfaceManager,
};

use super::{ChannelStatus, ClientFacade};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLoopOptions {
    /// Ticks per second
    pub fps: u32,
    /// Spins played before this run
    pub spin_count: u64,
}

impl Default for FrameLoopOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            spin_count: 0,
        }
    }
}

/// Run until the command channel reports [`ChannelStatus::Stopped`].
///
/// Must be started after the server, which is `Stopped` before `start`.
/// Returns the interface that was showing when the loop ended.
pub async fn run_frame_loop<R: Renderer>(
    client: ClientFacade,
    renderer: &mut R,
    shared: SharedState,
    options: FrameLoopOptions,
) -> Interface {
    let mut manager = InterfaceManager::new();
    let mut ticker = tokio::time::interval(frame_period(options.fps));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    renderer.switch_to(manager.current());

    loop {
        ticker.tick().await;

        if client.status() == ChannelStatus::Stopped {
            break;
        }

        if let Some(command) = client.last_command()
            && let Some(next) = manager.apply_text(&command)
        {
            renderer.switch_to(next);
        }

        let frame = build_frame(manager.current(), &shared, options.spin_count).await;
        renderer.render(&frame);
    }

    tracing::info!("Frame loop stopped on {}", manager.current());
    manager.current()
}

fn frame_period(fps: u32) -> Duration {
    Duration::from_secs(1) / fps.max(1)
}

async fn build_frame(interface: Interface, shared: &SharedState, spin_count: u64) -> Frame {
    let mut frame = Frame::new(interface, spin_count);
    if interface != Interface::SlotMachine {
        return frame;
    }

    // A store failure must not freeze the display; render with defaults.
    match shared.active_button().await {
        Ok(active) => frame.spin_enabled = active,
        Err(e) => tracing::warn!("Failed to read button state: {}", e),
    }
    match shared.game_phase().await {
        Ok(phase) => frame.phase = phase,
        Err(e) => tracing::warn!("Failed to read game phase: {}", e),
    }
    frame
}
