//! Startup privilege gate.
//!
//! The proxy needs elevated rights for its TUN device, so the tray fails
//! fast when launched without them.

use crate::{AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;

/// Fail unless the process runs with the privileges the proxy needs.
#[cfg(windows)]
#[track_caller]
pub(crate) fn ensure_elevated() -> AppResult<()> {
    // SAFETY: IsUserAnAdmin takes no arguments and only inspects the
    // calling process's token.
    let is_admin = unsafe { windows_sys::Win32::UI::Shell::IsUserAnAdmin() } != 0;

    if is_admin {
        Ok(())
    } else {
        Err(AppError::PrivilegeError {
            reason: "Run the program with administrator privileges".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Fail unless the process runs with the privileges the proxy needs.
#[cfg(unix)]
#[track_caller]
pub(crate) fn ensure_elevated() -> AppResult<()> {
    if nix::unistd::Uid::effective().is_root() {
        Ok(())
    } else {
        Err(AppError::PrivilegeError {
            reason: "Run the program as root".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
