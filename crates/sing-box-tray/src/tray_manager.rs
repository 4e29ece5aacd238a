//! System tray icon with state-based updates.
//!
//! Owns the tray icon, its menu, and the pair of recolored icons. Lives on
//! the main thread because `TrayIcon` is `!Send`; the async side reaches it
//! only through `TrayCommand` user events.

use crate::{AppError, AppResult, TrayIconState, config::Config, icon};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument};
use tray_icon::menu::{CheckMenuItem, IsMenuItem, Menu, MenuId, MenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// Menu item ids the async side needs for event dispatch.
#[derive(Debug, Clone)]
pub struct MenuTargets {
    /// The Toggle check item.
    pub toggle: MenuId,
    /// The dashboard entry, present only when a URL is configured.
    pub dashboard: Option<MenuId>,
    /// The working-directory entry.
    pub workdir: MenuId,
    /// The settings entry (opens the tray's own config file).
    pub settings: MenuId,
    /// The exit entry.
    pub exit: MenuId,
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    toggle_item: CheckMenuItem,
    icon_on: Icon,
    icon_off: Icon,
    targets: MenuTargets,
}

impl TrayManager {
    /// Create the tray icon with the off appearance and the full menu.
    #[track_caller]
    #[instrument(skip(config))]
    pub fn new(config: &Config) -> AppResult<Self> {
        let base = image::load_from_memory(include_bytes!("../resources/icons/base.png"))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to decode embedded icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .into_rgba8();

        let icon_on = to_tray_icon(icon::recolor(&base, config.icon_on_rgba))?;
        let icon_off = to_tray_icon(icon::recolor(&base, config.icon_off_rgba))?;

        let toggle_label = match config.keybind() {
            Some(combo) => format!("Toggle ({combo})"),
            None => "Toggle".to_string(),
        };
        let toggle_item = CheckMenuItem::new(toggle_label, true, false, None);
        let dashboard_item = config
            .dashboard_url()
            .map(|_| MenuItem::new("Open clash dashboard", true, None));
        let workdir_item = MenuItem::new("Open working directory", true, None);
        let settings_item = MenuItem::new("Open settings", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let menu = Menu::new();
        append(&menu, &toggle_item)?;
        if let Some(item) = &dashboard_item {
            append(&menu, item)?;
        }
        append(&menu, &workdir_item)?;
        append(&menu, &settings_item)?;
        append(&menu, &exit_item)?;

        let targets = MenuTargets {
            toggle: toggle_item.id().clone(),
            dashboard: dashboard_item.as_ref().map(|item| item.id().clone()),
            workdir: workdir_item.id().clone(),
            settings: settings_item.id().clone(),
            exit: exit_item.id().clone(),
        };

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(TrayIconState::Off.title())
            .with_menu(Box::new(menu))
            .with_icon(icon_off.clone())
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            toggle_item,
            icon_on,
            icon_off,
            targets,
        })
    }

    /// Menu ids for event dispatch on the async side.
    pub fn targets(&self) -> MenuTargets {
        self.targets.clone()
    }

    /// Update icon, tooltip and check mark for a new state.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: TrayIconState) -> AppResult<()> {
        let icon = match state {
            TrayIconState::On => self.icon_on.clone(),
            TrayIconState::Off => self.icon_off.clone(),
        };

        self.tray_icon
            .set_icon(Some(icon))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(state.title()))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.toggle_item.set_checked(state == TrayIconState::On);

        Ok(())
    }
}

#[track_caller]
fn append(menu: &Menu, item: &dyn IsMenuItem) -> AppResult<()> {
    menu.append(item).map_err(|e| AppError::TrayError {
        reason: format!("Failed to append menu item: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn to_tray_icon(image: image::RgbaImage) -> AppResult<Icon> {
    let (width, height) = (image.width(), image.height());

    Icon::from_rgba(image.into_raw(), width, height).map_err(|e| AppError::TrayError {
        reason: format!("Failed to create icon from RGBA: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}
