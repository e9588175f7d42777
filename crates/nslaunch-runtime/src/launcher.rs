//! Parent-side launcher.
//!
//! Clones a child directly into the profile's namespaces, then blocks on a
//! single `waitpid(2)` until it terminates.

use nix::errno::Errno;
use nix::sched::clone;
use nix::unistd::Pid;
use nslaunch_common::config::LaunchConfig;
use nslaunch_common::error::{LaunchError, Result};
use nslaunch_common::types::{ChildExecutionContext, ExitOutcome, IsolationProfile};
use nslaunch_core::namespace::{clone_flags, namespace_id};

use crate::bootstrap::child_main;
use crate::stack::ChildStack;

/// Runs `ctx` in a new child isolated according to `config` and waits for it.
///
/// # Errors
///
/// Returns [`LaunchError::ProcessCreation`] if the child cannot be cloned
/// (no wait is attempted), or [`LaunchError::Wait`] if its termination
/// cannot be observed. Failures inside the child only show up as its
/// [`ExitOutcome`].
#[allow(unsafe_code)]
pub fn launch(config: &LaunchConfig, ctx: &ChildExecutionContext) -> Result<ExitOutcome> {
    let actions = config.setup_actions();
    let mut stack = ChildStack::new(config.stack_size);

    tracing::info!(
        profile = %config.profile,
        program = ctx.program(),
        steps = actions.len(),
        "launching isolated child"
    );

    let callback = Box::new(|| child_main(&actions, ctx));
    // SAFETY: without CLONE_VM the child runs on a copy-on-write image of this
    // single-threaded process, so the closure's borrows stay valid in it. The
    // stack outlives the child because it is only dropped after the wait.
    let pid = unsafe {
        clone(
            callback,
            stack.as_mut_slice(),
            clone_flags(config.profile),
            Some(libc::SIGCHLD),
        )
    }
    .map_err(|e| LaunchError::ProcessCreation { source: e.into() })?;

    tracing::debug!(pid = pid.as_raw(), "child created");
    log_namespaces(pid, config.profile);

    let status = wait_raw(pid)?;
    let outcome = outcome_from_status(status).ok_or_else(|| LaunchError::Wait {
        pid: pid.as_raw(),
        source: std::io::Error::other(format!("unexpected wait status {status:#x}")),
    })?;

    if outcome.is_success() {
        tracing::info!(pid = pid.as_raw(), %outcome, "isolated child finished");
    } else {
        tracing::warn!(pid = pid.as_raw(), %outcome, "isolated child failed");
    }
    drop(stack);
    Ok(outcome)
}

// nix decodes the signal number into its `Signal` enum and fails with
// EINVAL for real-time signals, after the child has already been reaped.
// Waiting through libc keeps the raw status so every signal survives.
#[allow(unsafe_code)]
fn wait_raw(pid: Pid) -> Result<libc::c_int> {
    let mut status: libc::c_int = 0;
    // SAFETY: `status` is a valid, writable c_int for the duration of the call.
    let ret = unsafe { libc::waitpid(pid.as_raw(), &raw mut status, 0) };
    if ret == -1 {
        return Err(LaunchError::Wait {
            pid: pid.as_raw(),
            source: Errno::last().into(),
        });
    }
    Ok(status)
}

/// Translates a raw `waitpid(2)` status into an [`ExitOutcome`].
///
/// Returns `None` for statuses that do not mean the child is gone.
#[must_use]
pub const fn outcome_from_status(status: libc::c_int) -> Option<ExitOutcome> {
    if libc::WIFEXITED(status) {
        Some(ExitOutcome::Exited(libc::WEXITSTATUS(status)))
    } else if libc::WIFSIGNALED(status) {
        Some(ExitOutcome::Signaled(libc::WTERMSIG(status)))
    } else {
        None
    }
}

// Best effort: the child may already have exec'd or exited.
fn log_namespaces(pid: Pid, profile: IsolationProfile) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    for kind in profile.kinds() {
        match (namespace_id(None, kind), namespace_id(Some(pid), kind)) {
            (Ok(host), Ok(child)) => {
                tracing::debug!(%kind, %host, %child, "namespace identity");
            }
            (_, Err(e)) | (Err(e), _) => {
                tracing::debug!(%kind, error = %e, "namespace identity unavailable");
            }
        }
    }
}
