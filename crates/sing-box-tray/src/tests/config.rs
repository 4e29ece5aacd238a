use crate::{
    AppError,
    config::{CONFIG_FILE_NAME, Config},
};

use std::{fs, path::PathBuf};

/// WHAT: A missing config file materializes a template and fails startup
/// WHY: The user must get an editable file and a clear instruction instead
/// of a tray running against nothing
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_config_when_loading_then_template_written_and_error() {
    // Given: An empty directory
    let dir = tempfile::tempdir().unwrap();

    // When: Loading
    let result = Config::load_from(dir.path());

    // Then: ConfigMissing, with the template on disk
    assert!(matches!(result, Err(AppError::ConfigMissing { .. })));
    assert!(dir.path().join(CONFIG_FILE_NAME).exists());

    // And: The template itself parses on the next run
    let config = Config::load_from(dir.path()).unwrap();
    assert!(config.keybind().is_none());
    assert!(config.dashboard_url().is_none());
}

/// WHAT: Empty fields resolve to executable-relative defaults
/// WHY: The bare command name, colocated proxy config and created workdir
/// are the documented fallbacks
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_fields_when_resolving_then_defaults_apply() {
    // Given: A config carrying only the required icon offsets
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"icon_on_rgba":[0,64,0,0],"icon_off_rgba":[0,0,0,0]}"#,
    )
    .unwrap();

    // When: Loading and resolving
    let config = Config::load_from(dir.path()).unwrap();
    let spec = config.launch_spec(dir.path()).unwrap();

    // Then: Defaults apply and the working directory exists
    assert_eq!(config.core_program(), PathBuf::from("sing-box"));
    assert_eq!(spec.config_path, dir.path().join("config.json"));
    assert_eq!(spec.workdir, dir.path().join("sing-box"));
    assert!(spec.workdir.is_dir());
    assert!(config.dashboard_url().is_none());
    assert!(config.keybind().is_none());
}

/// WHAT: Explicit fields are honored verbatim
/// WHY: Configured paths must not be second-guessed or rebased
#[test]
#[allow(clippy::unwrap_used)]
fn given_explicit_fields_when_resolving_then_values_used() {
    // Given: A fully specified config
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{
            "sing_box_path": "/opt/sing-box/sing-box",
            "sing_box_config_path": "/etc/sing-box/config.json",
            "sing_box_workdir": "/var/lib/sing-box",
            "clash_dashboard_url": "http://127.0.0.1:9090/ui",
            "keybind": "ctrl+shift+KeyS",
            "icon_on_rgba": [0, 64, 0, 0],
            "icon_off_rgba": [0, 0, 0, -20]
        }"#,
    )
    .unwrap();

    // When: Loading and resolving
    let config = Config::load_from(dir.path()).unwrap();
    let spec = config.launch_spec(dir.path()).unwrap();

    // Then: Every value is used as written
    assert_eq!(spec.program, PathBuf::from("/opt/sing-box/sing-box"));
    assert_eq!(spec.config_path, PathBuf::from("/etc/sing-box/config.json"));
    assert_eq!(spec.workdir, PathBuf::from("/var/lib/sing-box"));
    assert_eq!(config.dashboard_url(), Some("http://127.0.0.1:9090/ui"));
    assert_eq!(config.keybind(), Some("ctrl+shift+KeyS"));
    assert_eq!(config.icon_off_rgba, [0, 0, 0, -20]);
}

/// WHAT: A config without the icon offset arrays is rejected
/// WHY: The offsets are required fields with no default
#[test]
#[allow(clippy::unwrap_used)]
fn given_config_without_icon_offsets_when_loading_then_error() {
    // Given: A config missing both offset arrays
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"sing_box_path": "sing-box"}"#,
    )
    .unwrap();

    // When: Loading
    let result = Config::load_from(dir.path());

    // Then: Parse failure
    assert!(matches!(result, Err(AppError::ConfigError { .. })));
}
