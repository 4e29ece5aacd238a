#![cfg_attr(windows, windows_subsystem = "windows")]

//! Sing-box-tray: toggle a local sing-box proxy from the system tray, with
//! an optional global hotkey.

mod app;
mod config;
mod error;
mod hotkey_handler;
mod icon;
mod indicator;
mod privilege;
#[cfg(test)]
mod tests;
mod toggle_request;
mod tray_command;
mod tray_icon_state;
mod tray_manager;

pub(crate) use {
    app::App,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    indicator::TrayIndicator,
    toggle_request::ToggleRequest,
    tray_command::TrayCommand,
    tray_icon_state::TrayIconState,
    tray_manager::TrayManager,
};

use crate::config::Config;

use global_hotkey::GlobalHotKeyManager;
use sing_box_tray_core::{ProcessSupervisor, ToggleCoordinator};
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;

/// Application entry point.
fn main() {
    let _log_guard = init_logging();

    if let Err(e) = privilege::ensure_elevated() {
        error!("Privilege check failed: {:?}", e);
        std::process::exit(1);
    }

    let base_dir = match config::exe_dir() {
        Ok(dir) => dir,
        Err(e) => {
            error!("Failed to locate executable directory: {:?}", e);
            std::process::exit(1);
        }
    };

    let config = match Config::load_from(&base_dir) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new(&config) {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Persists across event loop iterations -- dropping it unregisters the hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    // Consumed by the Init event below.
    let mut bootstrap = Some((config, base_dir));

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                match cmd {
                    TrayCommand::SetState(state) => {
                        if let Err(e) = tray_manager.update_state(state) {
                            error!(error = ?e, "Failed to update tray icon");
                        }
                    }
                    TrayCommand::Shutdown => {
                        *control_flow = ControlFlow::ExitWithCode(0);
                    }
                }
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let Some((config, base_dir)) = bootstrap.take() else {
                    return;
                };

                let launch_spec = match config.launch_spec(&base_dir) {
                    Ok(spec) => spec,
                    Err(e) => {
                        error!("Failed to resolve launch parameters: {:?}", e);
                        std::process::exit(1);
                    }
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Register the hotkey on the main thread -- tao's event loop
                // pumps the Windows messages needed for WM_HOTKEY delivery.
                // hotkey_manager is stored in the closure's captured state so
                // it lives for the entire app lifetime.
                let hotkey_id = match config.keybind() {
                    Some(combo) => match HotkeyHandler::register_hotkey(combo) {
                        Ok((manager, id)) => {
                            hotkey_manager = Some(manager);
                            Some(id)
                        }
                        Err(e) => {
                            error!("Failed to register hotkey: {:?}", e);
                            std::process::exit(1);
                        }
                    },
                    None => None,
                };

                // Capacity 1: a request arriving while one is pending is
                // dropped, so simultaneous menu and hotkey requests coalesce
                // into a single transition.
                let (toggle_tx, toggle_rx) = mpsc::channel(1);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);

                let supervisor = ProcessSupervisor::new(launch_spec.clone());
                let coordinator =
                    ToggleCoordinator::new(supervisor, TrayIndicator::new(tray_proxy.clone()));

                let app = App {
                    coordinator,
                    tray_proxy: tray_proxy.clone(),
                    toggle_tx: toggle_tx.clone(),
                    toggle_rx,
                    shutdown_tx,
                    menu: tray_manager.targets(),
                    dashboard_url: config.dashboard_url().map(str::to_string),
                    workdir: launch_spec.workdir,
                    settings_path: base_dir.join(config::CONFIG_FILE_NAME),
                };

                let hotkey_handler = hotkey_id.map(|id| HotkeyHandler::new(id, toggle_tx));

                // Spawn tokio runtime on separate thread.
                // TrayManager and hotkey_manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        match hotkey_handler {
                            Some(handler) => {
                                tokio::join!(
                                    async {
                                        if let Err(e) = handler.run(shutdown_rx).await {
                                            error!(error = ?e, "Hotkey listener error");
                                        }
                                    },
                                    async {
                                        if let Err(e) = app.run().await {
                                            error!(error = ?e, "App error");
                                        }
                                    }
                                );
                            }
                            None => {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        }
                    });
                });
            }
            _ => {}
        }

        // Keep hotkey_manager alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
    });
}

/// Initialize tracing with a rolling file appender when a platform data
/// directory is available, falling back to stderr.
///
/// The returned guard must be held for the program's lifetime or buffered
/// log lines are lost. File logging matters on Windows, where the
/// `windows_subsystem` build has no console to inherit.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    const DEFAULT_FILTER: &str = "sing_box_tray=debug,sing_box_tray_core=debug";

    let log_dir = directories::ProjectDirs::from("com", "sing-box-tray", "sing-box-tray")
        .map(|dirs| dirs.data_local_dir().join("logs"));

    match log_dir {
        Some(dir) if std::fs::create_dir_all(&dir).is_ok() => {
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
                dir,
                "sing-box-tray.log",
            ));
            tracing_subscriber::fmt()
                .with_env_filter(DEFAULT_FILTER)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(DEFAULT_FILTER)
                .init();
            None
        }
    }
}
