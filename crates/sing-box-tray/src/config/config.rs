//! Configuration management for sing-box-tray.
//!
//! Loads the flat JSON config colocated with the executable, seeding a
//! template on first run, and resolves absent or empty fields to their
//! defaults.

use crate::{
    AppError, AppResult,
    config::{CONFIG_FILE_NAME, DEFAULT_CORE_COMMAND, DEFAULT_CORE_CONFIG, DEFAULT_WORKDIR},
};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use sing_box_tray_core::LaunchSpec;
use tracing::{debug, info, instrument, warn};

/// Main configuration struct, a faithful image of the JSON object on disk.
///
/// String fields treat empty the same as absent; resolution to concrete
/// values happens in the accessors. The icon offset arrays have no default
/// and must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the sing-box executable; empty resolves the bare command
    /// name through the OS search path.
    #[serde(default)]
    pub sing_box_path: String,
    /// Path to the proxy's own config file; empty means one colocated
    /// with this program.
    #[serde(default)]
    pub sing_box_config_path: String,
    /// Working directory handed to the proxy; empty means a subdirectory
    /// next to this program, created if missing.
    #[serde(default)]
    pub sing_box_workdir: String,
    /// Dashboard URL; empty hides the dashboard menu entry.
    #[serde(default)]
    pub clash_dashboard_url: String,
    /// Global hotkey combination; empty disables the hotkey listener.
    #[serde(default)]
    pub keybind: String,
    /// Per-channel RGBA offsets for the "on" icon.
    pub icon_on_rgba: [i16; 4],
    /// Per-channel RGBA offsets for the "off" icon.
    pub icon_off_rgba: [i16; 4],
}

impl Config {
    /// Load configuration from `dir`, materializing a template if missing.
    ///
    /// A missing file is fatal: the template is written and the returned
    /// error instructs the user to edit it and run again.
    #[track_caller]
    #[instrument]
    pub fn load_from(dir: &Path) -> AppResult<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            Self::write_template(&config_path)?;
            warn!(config_path = ?config_path, "No config found, template written");
            return Err(AppError::ConfigMissing {
                path: config_path,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let contents = fs::read_to_string(&config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Path of the proxy executable, or the bare default command name.
    pub fn core_program(&self) -> PathBuf {
        if self.sing_box_path.is_empty() {
            PathBuf::from(DEFAULT_CORE_COMMAND)
        } else {
            PathBuf::from(&self.sing_box_path)
        }
    }

    /// Dashboard URL, when one is configured.
    pub fn dashboard_url(&self) -> Option<&str> {
        optional(&self.clash_dashboard_url)
    }

    /// Hotkey combination, when one is configured.
    pub fn keybind(&self) -> Option<&str> {
        optional(&self.keybind)
    }

    /// Resolve the launch parameters, creating the default working
    /// directory when none is configured.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn launch_spec(&self, base_dir: &Path) -> AppResult<LaunchSpec> {
        let config_path = if self.sing_box_config_path.is_empty() {
            base_dir.join(DEFAULT_CORE_CONFIG)
        } else {
            PathBuf::from(&self.sing_box_config_path)
        };

        let workdir = if self.sing_box_workdir.is_empty() {
            let dir = base_dir.join(DEFAULT_WORKDIR);
            if !dir.exists() {
                fs::create_dir_all(&dir)?;
                debug!(workdir = ?dir, "Created default working directory");
            }
            dir
        } else {
            PathBuf::from(&self.sing_box_workdir)
        };

        Ok(LaunchSpec {
            program: self.core_program(),
            config_path,
            workdir,
        })
    }

    #[track_caller]
    fn write_template(config_path: &Path) -> AppResult<()> {
        let template = Config {
            sing_box_path: String::new(),
            sing_box_config_path: String::new(),
            sing_box_workdir: String::new(),
            clash_dashboard_url: String::new(),
            keybind: String::new(),
            icon_on_rgba: [0, 64, 0, 0],
            icon_off_rgba: [0, 0, 0, 0],
        };

        let contents =
            serde_json::to_string_pretty(&template).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to serialize config template: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        fs::write(config_path, contents)?;

        Ok(())
    }
}

/// Directory of the running executable; the config file and the default
/// proxy paths live next to it.
#[track_caller]
pub fn exe_dir() -> AppResult<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| AppError::ConfigError {
        reason: "Executable has no parent directory".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;
    Ok(dir.to_path_buf())
}

fn optional(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}
