use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

/// Process lifecycle errors with source location tracking.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The managed process could not be spawned, or it exited before the
    /// launch probe observed it alive. Nothing is recorded as running.
    #[error("Start failure: {reason} {location}")]
    StartFailure {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Termination could not be requested, or the exit of the managed
    /// process could not be confirmed. The handle is retained for a retry.
    #[error("Stop failure: {reason} {location}")]
    StopFailure {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

/// Result type alias using [`ProcessError`].
pub type Result<T> = StdResult<T, ProcessError>;
