use crate::{LaunchSpec, ProcessError, ProcessSupervisor};

use std::path::{Path, PathBuf};

fn spec_for(program: &str, dir: &Path) -> LaunchSpec {
    LaunchSpec {
        program: PathBuf::from(program),
        config_path: dir.join("config.json"),
        workdir: dir.to_path_buf(),
    }
}

/// WHAT: Starting a nonexistent program fails without recording a handle
/// WHY: A failed spawn must never be reported as a running process
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_program_when_start_then_start_failure() {
    // Given: A spec pointing at a program that does not exist
    let workdir = tempfile::tempdir().unwrap();
    let mut supervisor =
        ProcessSupervisor::new(spec_for("/nonexistent/sing-box-test-binary", workdir.path()));

    // When: Starting
    let result = supervisor.start();

    // Then: Start failure, nothing tracked
    assert!(matches!(result, Err(ProcessError::StartFailure { .. })));
    assert!(!supervisor.is_tracking());
}

/// WHAT: A process that exits during launch is reported as a start failure
/// WHY: The launch probe must catch fast-failing processes instead of
/// silently recording them as running
#[cfg(unix)]
#[test]
#[allow(clippy::unwrap_used)]
fn given_program_that_exits_immediately_when_start_then_start_failure() {
    // Given: A program that exits with a nonzero code right away
    let workdir = tempfile::tempdir().unwrap();
    let mut supervisor = ProcessSupervisor::new(spec_for("false", workdir.path()));

    // When: Starting
    let result = supervisor.start();

    // Then: Start failure, nothing tracked
    assert!(matches!(result, Err(ProcessError::StartFailure { .. })));
    assert!(!supervisor.is_tracking());
}

/// WHAT: Start then stop of a long-running program clears the handle
/// WHY: A confirmed stop must reap the child and release the handle
#[cfg(unix)]
#[test]
#[allow(clippy::unwrap_used)]
fn given_long_running_program_when_started_then_stopped_then_handle_cleared() {
    // Given: A program that ignores its arguments and runs until terminated
    let workdir = tempfile::tempdir().unwrap();
    let mut supervisor = ProcessSupervisor::new(spec_for("yes", workdir.path()));

    // When: Starting
    supervisor.start().unwrap();

    // Then: The handle is tracked
    assert!(supervisor.is_tracking());

    // When: Stopping
    supervisor.stop().unwrap();

    // Then: The handle is cleared
    assert!(!supervisor.is_tracking());
}

/// WHAT: Stop with no tracked process succeeds as a no-op
/// WHY: Shutdown from the stopped state must not fail or act on anything
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_tracked_process_when_stop_then_succeeds_as_noop() {
    // Given: A supervisor that never started anything
    let workdir = tempfile::tempdir().unwrap();
    let mut supervisor = ProcessSupervisor::new(spec_for("sing-box", workdir.path()));

    // When: Stopping
    let result = supervisor.stop();

    // Then: Success with nothing tracked
    assert!(result.is_ok());
    assert!(!supervisor.is_tracking());
}

/// WHAT: Starting while a process is tracked is refused
/// WHY: The supervisor owns exactly one child at a time; a second start
/// would leak the first handle
#[cfg(unix)]
#[test]
#[allow(clippy::unwrap_used)]
fn given_tracked_process_when_start_again_then_start_failure() {
    // Given: A supervisor with a running child
    let workdir = tempfile::tempdir().unwrap();
    let mut supervisor = ProcessSupervisor::new(spec_for("yes", workdir.path()));
    supervisor.start().unwrap();

    // When: Starting again
    let result = supervisor.start();

    // Then: Refused, original handle still tracked
    assert!(matches!(result, Err(ProcessError::StartFailure { .. })));
    assert!(supervisor.is_tracking());

    supervisor.stop().unwrap();
}
