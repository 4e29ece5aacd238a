//! Sing-box-tray Core Library
//!
//! Process-lifecycle and state-synchronization core for the tray toggler:
//! a supervisor owning the single managed child process, and a coordinator
//! owning the `running` flag with every transition funneled through one
//! toggle operation.
//!
//! # Example
//!
//! ```no_run
//! use sing_box_tray_core::{
//!     LaunchSpec, ProcessSupervisor, StatusIndicator, ToggleCoordinator,
//! };
//!
//! use std::path::PathBuf;
//!
//! struct StdoutIndicator;
//!
//! impl StatusIndicator for StdoutIndicator {
//!     fn set_appearance(&mut self, running: bool) {
//!         println!("running: {running}");
//!     }
//!
//!     fn notify_error(&mut self, message: &str) {
//!         eprintln!("{message}");
//!     }
//! }
//!
//! fn main() {
//!     let spec = LaunchSpec {
//!         program: PathBuf::from("sing-box"),
//!         config_path: PathBuf::from("config.json"),
//!         workdir: PathBuf::from("sing-box"),
//!     };
//!     let supervisor = ProcessSupervisor::new(spec);
//!     let mut coordinator = ToggleCoordinator::new(supervisor, StdoutIndicator);
//!
//!     coordinator.toggle();
//!     coordinator.toggle();
//! }
//! ```

mod coordinator;
mod error;
mod supervisor;

pub use {
    coordinator::{
        ProcessControl, START_FAILURE_NOTICE, STOP_FAILURE_NOTICE, ShutdownOutcome,
        StatusIndicator, ToggleCoordinator,
    },
    error::{ProcessError, Result as CoreResult},
    supervisor::{LaunchSpec, ProcessSupervisor},
};

#[cfg(test)]
mod tests;
