use crate::{
    AppResult, ToggleRequest, TrayCommand, TrayIndicator, tray_manager::MenuTargets,
};

use std::{path::PathBuf, time::Duration};

use sing_box_tray_core::{ProcessSupervisor, ShutdownOutcome, ToggleCoordinator};
use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, mpsc::error::TrySendError, watch};
use tracing::{debug, error, info, instrument};
use tray_icon::menu::MenuEvent;

/// Whether the select loop keeps running after a menu event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Main application state.
///
/// Runs on the async runtime thread and is the single consumer of toggle
/// requests, so every state-machine transition is serialized through its
/// loop. Tray updates flow back to the main thread via `tray_proxy`
/// because `TrayIcon` is `!Send` and must remain on the UI thread.
pub struct App {
    pub(crate) coordinator: ToggleCoordinator<ProcessSupervisor, TrayIndicator>,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) toggle_tx: mpsc::Sender<ToggleRequest>,
    pub(crate) toggle_rx: mpsc::Receiver<ToggleRequest>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) menu: MenuTargets,
    pub(crate) dashboard_url: Option<String>,
    pub(crate) workdir: PathBuf,
    pub(crate) settings_path: PathBuf,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("sing-box-tray starting");

        // Tray event forwarding via single persistent blocking task.
        //
        // MenuEvent::receiver() returns a crossbeam_channel::Receiver which
        // HAS blocking recv() -- zero polling, instant response, one thread.
        //
        // Shutdown: when tray_event_rx is dropped (main loop breaks),
        // tray_event_tx.blocking_send() fails, breaking the blocking loop.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    if self.handle_menu_event(event) == Flow::Exit {
                        break;
                    }
                }

                Some(request) = self.toggle_rx.recv() => {
                    self.handle_toggle(request);
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(tray_event_rx);

        // The managed process is confirmed stopped by now, so tear down the
        // tray's event loop first, then the hotkey listener.
        let _ = self.tray_proxy.send_event(TrayCommand::Shutdown);
        let _ = self.shutdown_tx.send(true);

        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        info!("sing-box-tray shut down successfully");

        Ok(())
    }

    /// Apply one serialized toggle request.
    #[instrument(skip(self))]
    fn handle_toggle(&mut self, request: ToggleRequest) {
        let applied = self.coordinator.toggle();

        debug!(
            ?request,
            applied,
            running = self.coordinator.is_running(),
            "Toggle request handled"
        );
    }

    /// Handle tray menu events.
    #[instrument(skip(self))]
    fn handle_menu_event(&mut self, event: MenuEvent) -> Flow {
        let event_id = &event.id;

        if *event_id == self.menu.toggle {
            // Funnel menu clicks through the same bounded queue as hotkey
            // presses; a click while a request is pending coalesces into it.
            match self.toggle_tx.try_send(ToggleRequest::Menu) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    debug!("Toggle request already pending, ignoring menu click");
                }
                Err(TrySendError::Closed(_)) => {
                    error!("Toggle queue closed");
                }
            }
        } else if Some(event_id) == self.menu.dashboard.as_ref() {
            if let Some(url) = &self.dashboard_url {
                let _ = open::that(url);
                info!(url = %url, "Opened dashboard");
            }
        } else if *event_id == self.menu.workdir {
            let _ = open::that(&self.workdir);
            info!(workdir = ?self.workdir, "Opened working directory");
        } else if *event_id == self.menu.settings {
            let _ = open::that(&self.settings_path);
            info!(settings = ?self.settings_path, "Opened settings");
        } else if *event_id == self.menu.exit {
            info!("Exit requested from tray menu");
            match self.coordinator.shutdown() {
                ShutdownOutcome::Completed => return Flow::Exit,
                // The process may still be alive; keep every loop running
                // so the user can retry.
                ShutdownOutcome::Aborted => {}
            }
        }

        Flow::Continue
    }
}
