//! Global hotkey listener feeding the toggle funnel.
//!
//! Registers the configured key combination and forwards each press as a
//! toggle request into the single-consumer queue the app drains.

use crate::{AppError, AppResult, ToggleRequest};

use std::{panic::Location, str::FromStr, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState, hotkey::HotKey};
use tokio::sync::{mpsc, mpsc::error::TrySendError, watch};
use tracing::{debug, info, instrument, warn};

/// Global hotkey listener for the configured toggle combination.
pub struct HotkeyHandler {
    hotkey_id: u32,
    toggle_tx: mpsc::Sender<ToggleRequest>,
}

impl HotkeyHandler {
    /// Register the configured combination as a global hotkey.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey(combo: &str) -> AppResult<(GlobalHotKeyManager, u32)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let hotkey = Self::parse_combo(combo)?;

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register {combo}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = combo, "Global hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Parse a config combo string such as `"ctrl+shift+KeyS"`.
    #[track_caller]
    pub(crate) fn parse_combo(combo: &str) -> AppResult<HotKey> {
        HotKey::from_str(combo).map_err(|e| AppError::HotkeyRegistrationFailed {
            reason: format!("Failed to parse {combo:?}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Create a handler for a previously registered hotkey.
    ///
    /// The `hotkey_id` should come from [`Self::register_hotkey`]. This
    /// struct is `Send` and can live on any thread -- it only listens on
    /// the global [`GlobalHotKeyEvent`] channel.
    pub fn new(hotkey_id: u32, toggle_tx: mpsc::Sender<ToggleRequest>) -> Self {
        Self {
            hotkey_id,
            toggle_tx,
        }
    }

    /// Run the hotkey listener loop.
    ///
    /// Blocks until the shutdown signal flips. Each qualifying key press
    /// enqueues one toggle request, dropped when one is already pending so
    /// simultaneous requests coalesce into a single transition.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Single persistent blocking task that forwards hotkey events.
        // GlobalHotKeyEvent::receiver() returns a crossbeam_channel::Receiver
        // which has blocking recv() -- zero polling, instant response, one thread.
        //
        // Shutdown: when event_rx is dropped (loop breaks), the next
        // event_tx.blocking_send() fails, breaking the blocking loop.
        // The JoinHandle is awaited with a timeout after the main loop exits.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey listener shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if event.id == self.hotkey_id && event.state == HotKeyState::Pressed {
                        self.enqueue_toggle()?;
                    }
                }
            }
        }

        // Drop event_rx to unblock the blocking task's next blocking_send().
        // The task will break out of its loop when blocking_send returns Err.
        drop(event_rx);

        // Best-effort join: the blocking task may be stuck in recv() if no
        // hotkey event arrives after shutdown. Use a timeout to avoid hanging.
        // The task is cleaned up by the runtime on process exit regardless.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    #[track_caller]
    fn enqueue_toggle(&self) -> AppResult<()> {
        match self.toggle_tx.try_send(ToggleRequest::Hotkey) {
            Ok(()) => Ok(()),
            // A request is already pending; this press coalesces into it.
            Err(TrySendError::Full(_)) => {
                debug!("Toggle request already pending, ignoring hotkey press");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(AppError::ChannelSendFailed {
                message: "Toggle queue closed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
