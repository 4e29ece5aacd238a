#[allow(clippy::module_inception)]
mod config;

pub(crate) use config::{Config, exe_dir};

/// File name of the tray's own configuration, colocated with the executable.
pub(crate) const CONFIG_FILE_NAME: &str = "sb_tray_config.json";

/// Bare command name used when no executable path is configured.
pub(crate) const DEFAULT_CORE_COMMAND: &str = "sing-box";

/// Proxy config file name used when no path is configured.
pub(crate) const DEFAULT_CORE_CONFIG: &str = "config.json";

/// Working-directory name used when none is configured.
pub(crate) const DEFAULT_WORKDIR: &str = "sing-box";
