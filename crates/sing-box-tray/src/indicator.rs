//! Tray-backed implementation of the core's status indicator contract.

use crate::{TrayCommand, TrayIconState};

use notify_rust::Notification;
use sing_box_tray_core::StatusIndicator;
use tao::event_loop::EventLoopProxy;
use tracing::warn;

/// Pushes appearance changes to the main-thread tray via user events and
/// surfaces start/stop failures as desktop notifications.
///
/// `TrayIcon` is `!Send`, so the coordinator never touches it directly;
/// this adapter is the write-only path from the async side.
pub struct TrayIndicator {
    proxy: EventLoopProxy<TrayCommand>,
}

impl TrayIndicator {
    /// Create an indicator sending through the given event-loop proxy.
    pub fn new(proxy: EventLoopProxy<TrayCommand>) -> Self {
        Self { proxy }
    }
}

impl StatusIndicator for TrayIndicator {
    fn set_appearance(&mut self, running: bool) {
        let state = if running {
            TrayIconState::On
        } else {
            TrayIconState::Off
        };

        // Fails only once the event loop is gone, at which point appearance
        // no longer matters.
        let _ = self.proxy.send_event(TrayCommand::SetState(state));
    }

    fn notify_error(&mut self, message: &str) {
        if let Err(e) = Notification::new().summary("Error").body(message).show() {
            warn!(error = %e, message, "Failed to show notification");
        }
    }
}
