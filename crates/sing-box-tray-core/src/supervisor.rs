//! Lifecycle control for the single managed child process.

use crate::{CoreResult, ProcessError, coordinator::ProcessControl};

use std::{
    panic::Location,
    path::PathBuf,
    process::{Child, Command, Stdio},
    thread,
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Keeps the child from opening a console window of its own.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Grace period between spawning the process and probing whether it is
/// still alive. A process that dies faster than this is reported as a
/// start failure instead of being recorded as running.
const LAUNCH_PROBE_DELAY: Duration = Duration::from_millis(100);

/// How to launch the managed process:
/// `<program> run -c <config_path> -D <workdir>`.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Path to the sing-box executable, or a bare command name resolved
    /// through the OS search path.
    pub program: PathBuf,
    /// Path handed to the process as its `-c` configuration file.
    pub config_path: PathBuf,
    /// Directory handed to the process as its `-D` working directory.
    pub workdir: PathBuf,
}

impl LaunchSpec {
    /// Build the launch command. The child gets no stdin and its output
    /// streams are discarded; this program never consumes them.
    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("run")
            .arg("-c")
            .arg(&self.config_path)
            .arg("-D")
            .arg(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        command
    }
}

/// Owns and controls the lifecycle of exactly one child process.
///
/// The handle is held until a stop is confirmed: a failed stop leaves it
/// in place so the caller can retry, and dropping the supervisor reaps
/// whatever is still tracked.
pub struct ProcessSupervisor {
    spec: LaunchSpec,
    child: Option<Child>,
}

impl ProcessSupervisor {
    /// Create a supervisor that launches processes per `spec`.
    pub fn new(spec: LaunchSpec) -> Self {
        Self { spec, child: None }
    }

    /// Whether a child process handle is currently tracked.
    pub fn is_tracking(&self) -> bool {
        self.child.is_some()
    }

    /// Launch the managed process and probe that it survived startup.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::StartFailure`] if the spawn fails, if the
    /// process has already exited at probe time, or if a process is
    /// already tracked. No handle is recorded on failure.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<()> {
        if self.child.is_some() {
            return Err(ProcessError::StartFailure {
                reason: "a managed process is already tracked".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut child = self
            .spec
            .command()
            .spawn()
            .map_err(|e| ProcessError::StartFailure {
                reason: format!("failed to spawn {}: {e}", self.spec.program.display()),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // Fast-failing launches (bad proxy config, missing data files) exit
        // within this window; they must fail the start, not be recorded as
        // running.
        thread::sleep(LAUNCH_PROBE_DELAY);

        match child.try_wait() {
            Ok(None) => {
                info!(pid = child.id(), "managed process started");
                self.child = Some(child);
                Ok(())
            }
            Ok(Some(status)) => Err(ProcessError::StartFailure {
                reason: format!("process exited during launch: {status}"),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(e) => {
                // Liveness unknown: reap rather than leak the handle.
                let _ = child.kill();
                let _ = child.wait();
                Err(ProcessError::StartFailure {
                    reason: format!("failed to probe launched process: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Stop the managed process and block until its exit is confirmed.
    ///
    /// Succeeds as a no-op when nothing is tracked. The handle is cleared
    /// only once the exit is read back; on failure it is retained so a
    /// later attempt can retry.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::StopFailure`] if termination cannot be
    /// requested or the exit cannot be confirmed.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<()> {
        let Some(child) = self.child.as_mut() else {
            debug!("no managed process tracked, nothing to stop");
            return Ok(());
        };

        let pid = child.id();

        request_termination(child).map_err(|e| ProcessError::StopFailure {
            reason: format!("failed to request termination of pid {pid}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Deliberate blocking wait -- the caller's state update must
        // reflect a settled outcome, not a termination still in flight.
        match child.wait() {
            Ok(status) => {
                info!(pid, %status, "managed process stopped");
                self.child = None;
                Ok(())
            }
            Err(e) => Err(ProcessError::StopFailure {
                reason: format!("exit of pid {pid} could not be confirmed: {e}"),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl ProcessControl for ProcessSupervisor {
    fn start(&mut self) -> CoreResult<()> {
        ProcessSupervisor::start(self)
    }

    fn stop(&mut self) -> CoreResult<()> {
        ProcessSupervisor::stop(self)
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        // Last-resort cleanup for abnormal exit paths; a normal shutdown
        // has already stopped and reaped the child.
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Ask the child to terminate: SIGTERM on unix so the proxy can tear down
/// its tunnels, `TerminateProcess` (via [`Child::kill`]) on Windows.
#[cfg(unix)]
fn request_termination(child: &mut Child) -> std::io::Result<()> {
    use nix::{
        sys::signal::{self, Signal},
        unistd::Pid,
    };

    signal::kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM)
        .map_err(|errno| std::io::Error::from_raw_os_error(errno as i32))
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child) -> std::io::Result<()> {
    child.kill()
}
