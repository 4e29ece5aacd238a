//! Toggle state machine coordinating the supervisor and the indicator.

use crate::CoreResult;

use tracing::{debug, info, instrument, warn};

/// Notification shown when the managed process could not be started.
pub const START_FAILURE_NOTICE: &str = "sing-box wasn't turned on";

/// Notification shown when the managed process could not be stopped.
pub const STOP_FAILURE_NOTICE: &str = "sing-box wasn't turned off";

/// Lifecycle control over the single managed process.
pub trait ProcessControl {
    /// Start the managed process. Must not report success if the process
    /// has already exited by the time it is probed.
    fn start(&mut self) -> CoreResult<()>;

    /// Stop the managed process and confirm its exit; succeeds as a no-op
    /// when nothing is tracked. On failure the process stays tracked.
    fn stop(&mut self) -> CoreResult<()>;
}

/// Write-only visual surface reflecting running state to the user.
pub trait StatusIndicator {
    /// Flip the indicator to the on or off appearance.
    fn set_appearance(&mut self, running: bool);

    /// Surface a start/stop failure to the user.
    fn notify_error(&mut self, message: &str);
}

/// Result of a shutdown attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The managed process is confirmed stopped; event loops may be
    /// torn down.
    Completed,
    /// The stop could not be confirmed. Everything must stay alive so the
    /// user can retry -- exiting now would orphan the child.
    Aborted,
}

/// Owns the `running` flag and applies every transition.
///
/// Every toggle request, whatever its input source, must reach this type
/// through a single consumer: `toggle()` takes `&mut self`, so exclusive
/// ownership of the coordinator is the mutual exclusion. The flag is
/// flipped only after the supervisor confirms the outcome, which keeps it
/// coherent with actual process state across failed transitions.
pub struct ToggleCoordinator<P, I> {
    supervisor: P,
    indicator: I,
    running: bool,
}

impl<P: ProcessControl, I: StatusIndicator> ToggleCoordinator<P, I> {
    /// Create a coordinator in the stopped state.
    pub fn new(supervisor: P, indicator: I) -> Self {
        Self {
            supervisor,
            indicator,
            running: false,
        }
    }

    /// Whether the managed process is currently considered running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Read-only access to the supervised process collaborator.
    pub fn supervisor(&self) -> &P {
        &self.supervisor
    }

    /// Flip the managed process between running and stopped.
    ///
    /// Returns whether a transition was applied. A failed start or stop
    /// surfaces a notification and leaves both the flag and the indicator
    /// untouched; every retry is user-initiated.
    #[instrument(skip(self), fields(running = self.running))]
    pub fn toggle(&mut self) -> bool {
        if self.running {
            match self.supervisor.stop() {
                Ok(()) => {
                    self.running = false;
                    self.indicator.set_appearance(false);
                    info!("managed process toggled off");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "stop failed, still running");
                    self.indicator.notify_error(STOP_FAILURE_NOTICE);
                    false
                }
            }
        } else {
            match self.supervisor.start() {
                Ok(()) => {
                    self.running = true;
                    self.indicator.set_appearance(true);
                    info!("managed process toggled on");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "start failed, still stopped");
                    self.indicator.notify_error(START_FAILURE_NOTICE);
                    false
                }
            }
        }
    }

    /// Stop the managed process ahead of program exit.
    ///
    /// Returns [`ShutdownOutcome::Aborted`] when a running process could
    /// not be confirmed stopped; the caller must keep the UI and hotkey
    /// loops alive in that case. Once completed, calling this again
    /// performs no further process operations.
    #[instrument(skip(self), fields(running = self.running))]
    pub fn shutdown(&mut self) -> ShutdownOutcome {
        if self.running {
            match self.supervisor.stop() {
                Ok(()) => {
                    self.running = false;
                    info!("managed process stopped for shutdown");
                }
                Err(e) => {
                    warn!(error = %e, "stop failed, aborting shutdown");
                    self.indicator.notify_error(STOP_FAILURE_NOTICE);
                    return ShutdownOutcome::Aborted;
                }
            }
        } else {
            debug!("already stopped, nothing to do");
        }

        ShutdownOutcome::Completed
    }
}
