//! Child-side isolation bootstrap.
//!
//! The first code the cloned child runs. It applies the profile's setup
//! actions strictly in order and execs the target program only if every
//! one of them succeeded. Nothing is rolled back on failure: every change
//! is local to the child's namespaces and dies with it.

use std::convert::Infallible;
use std::path::Path;

use nslaunch_common::error::{LaunchError, Result};
use nslaunch_common::types::{BootstrapStage, ChildExecutionContext, SetupAction};

/// Privileged operations the bootstrap needs from the system.
pub trait IsolationHost {
    /// Stops mount events from propagating out of the child's mount namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the propagation change fails.
    fn make_mounts_private(&mut self) -> Result<()>;

    /// Mounts an empty tmpfs over `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mount fails.
    fn mount_tmpfs(&mut self, target: &Path) -> Result<()>;

    /// Detaches the inherited `/proc`.
    ///
    /// # Errors
    ///
    /// Returns an error if the unmount fails.
    fn unmount_proc(&mut self) -> Result<()>;

    /// Mounts a `/proc` for the current PID namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the mount fails.
    fn mount_proc(&mut self) -> Result<()>;

    /// Sets the UTS hostname.
    ///
    /// # Errors
    ///
    /// Returns an error if the hostname cannot be set.
    fn set_hostname(&mut self, hostname: &str) -> Result<()>;

    /// Replaces the process image. Only returns on failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be executed.
    fn exec(&mut self, ctx: &ChildExecutionContext) -> Result<Infallible>;
}

/// The real host, backed by `nslaunch-core` and [`crate::exec`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxHost;

impl IsolationHost for LinuxHost {
    fn make_mounts_private(&mut self) -> Result<()> {
        nslaunch_core::filesystem::mount::make_mounts_private()
    }

    fn mount_tmpfs(&mut self, target: &Path) -> Result<()> {
        nslaunch_core::filesystem::mount::mount_tmpfs(target)
    }

    fn unmount_proc(&mut self) -> Result<()> {
        nslaunch_core::filesystem::mount::unmount_proc()
    }

    fn mount_proc(&mut self) -> Result<()> {
        nslaunch_core::filesystem::mount::mount_proc()
    }

    fn set_hostname(&mut self, hostname: &str) -> Result<()> {
        nslaunch_core::namespace::uts::set_hostname(hostname)
    }

    fn exec(&mut self, ctx: &ChildExecutionContext) -> Result<Infallible> {
        crate::exec::exec_program(ctx)
    }
}

/// Tracks the bootstrap stage and logs every transition.
#[derive(Debug)]
struct StageTracker {
    stage: BootstrapStage,
}

impl StageTracker {
    const fn new() -> Self {
        Self {
            stage: BootstrapStage::Created,
        }
    }

    fn advance(&mut self, next: BootstrapStage) {
        tracing::debug!(from = %self.stage, to = %next, "bootstrap stage");
        self.stage = next;
    }
}

fn apply<H: IsolationHost>(
    host: &mut H,
    action: &SetupAction,
    tracker: &mut StageTracker,
) -> Result<()> {
    match action {
        SetupAction::PrivatizeMounts => {
            host.make_mounts_private()?;
            tracker.advance(BootstrapStage::MountsPrivate);
        }
        SetupAction::MountTmpfs { target } => {
            host.mount_tmpfs(target)?;
            tracker.advance(BootstrapStage::TmpMounted);
        }
        SetupAction::RemountProc => {
            // Mounting before the unmount would stack a second proc on top of
            // the stale one instead of replacing it.
            host.unmount_proc()?;
            tracker.advance(BootstrapStage::ProcUnmounted);
            host.mount_proc()?;
            tracker.advance(BootstrapStage::ProcRemounted);
        }
        SetupAction::SetHostname(hostname) => {
            host.set_hostname(hostname)?;
            tracker.advance(BootstrapStage::HostnameSet);
        }
    }
    Ok(())
}

/// Applies `actions` in order, then execs the program in `ctx`.
///
/// Returns only on failure: the first failing action stops the sequence and
/// the program is never executed.
///
/// # Errors
///
/// Returns the error of the first failing action, or of the exec itself.
pub fn bootstrap<H: IsolationHost>(
    host: &mut H,
    actions: &[SetupAction],
    ctx: &ChildExecutionContext,
) -> Result<Infallible> {
    let mut tracker = StageTracker::new();
    for action in actions {
        if let Err(e) = apply(host, action, &mut tracker) {
            tracing::debug!(
                action = %action,
                last = %tracker.stage,
                to = %BootstrapStage::Failed,
                "bootstrap stage"
            );
            return Err(e);
        }
    }
    tracker.advance(BootstrapStage::Execed);
    host.exec(ctx)
}

/// Entry point of the cloned child; the return value is its exit status.
///
/// Only reached again if the bootstrap failed, in which case the error is
/// reported on stderr and mapped to its exit code.
pub fn child_main(actions: &[SetupAction], ctx: &ChildExecutionContext) -> isize {
    let err = match bootstrap(&mut LinuxHost, actions, ctx) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    if aborted_before_exec(&err) {
        tracing::error!(error = %err, "isolation setup failed, program not started");
    } else {
        tracing::error!(error = %err, "could not execute program");
    }
    isize::try_from(err.exit_code()).unwrap_or(isize::MAX)
}

/// Returns whether `err` stopped the child before the program could start.
#[must_use]
pub const fn aborted_before_exec(err: &LaunchError) -> bool {
    !matches!(err, LaunchError::Exec { .. })
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use nslaunch_common::types::IsolationProfile;

    use super::*;

    /// Records every call and fails the one named in `fail_at`.
    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<&'static str>,
        fail_at: Option<&'static str>,
    }

    impl RecordingHost {
        fn failing_at(call: &'static str) -> Self {
            Self {
                calls: Vec::new(),
                fail_at: Some(call),
            }
        }

        fn record(&mut self, call: &'static str) -> Result<()> {
            self.calls.push(call);
            if self.fail_at == Some(call) {
                return Err(match call {
                    "unmount_proc" => LaunchError::Unmount {
                        target: PathBuf::from("/proc"),
                        source: io::Error::from(io::ErrorKind::PermissionDenied),
                    },
                    "set_hostname" => LaunchError::Hostname {
                        hostname: "custom_hostname".into(),
                        source: io::Error::from(io::ErrorKind::PermissionDenied),
                    },
                    _ => LaunchError::Mount {
                        step: call,
                        target: PathBuf::from("/"),
                        source: io::Error::from(io::ErrorKind::PermissionDenied),
                    },
                });
            }
            Ok(())
        }
    }

    impl IsolationHost for RecordingHost {
        fn make_mounts_private(&mut self) -> Result<()> {
            self.record("make_mounts_private")
        }

        fn mount_tmpfs(&mut self, _target: &Path) -> Result<()> {
            self.record("mount_tmpfs")
        }

        fn unmount_proc(&mut self) -> Result<()> {
            self.record("unmount_proc")
        }

        fn mount_proc(&mut self) -> Result<()> {
            self.record("mount_proc")
        }

        fn set_hostname(&mut self, _hostname: &str) -> Result<()> {
            self.record("set_hostname")
        }

        fn exec(&mut self, ctx: &ChildExecutionContext) -> Result<Infallible> {
            self.calls.push("exec");
            Err(LaunchError::Exec {
                program: ctx.program().to_owned(),
                source: io::Error::from(io::ErrorKind::NotFound),
            })
        }
    }

    fn ctx() -> ChildExecutionContext {
        ChildExecutionContext::from_command(vec!["/bin/sh".into(), "-c".into(), "echo $$".into()])
            .unwrap()
    }

    fn run(host: &mut RecordingHost, profile: IsolationProfile) -> LaunchError {
        match bootstrap(host, &profile.setup_actions("custom_hostname"), &ctx()) {
            Ok(never) => match never {},
            Err(e) => e,
        }
    }

    #[test]
    fn full_profile_runs_steps_in_order_then_execs() {
        let mut host = RecordingHost::default();
        let err = run(&mut host, IsolationProfile::FULL);
        assert_eq!(
            host.calls,
            [
                "make_mounts_private",
                "mount_tmpfs",
                "unmount_proc",
                "mount_proc",
                "set_hostname",
                "exec",
            ]
        );
        assert!(!aborted_before_exec(&err));
    }

    #[test]
    fn network_only_goes_straight_to_exec() {
        let mut host = RecordingHost::default();
        let _ = run(&mut host, IsolationProfile::NETWORK_ONLY);
        assert_eq!(host.calls, ["exec"]);
    }

    #[test]
    fn proc_mount_failure_never_execs() {
        let mut host = RecordingHost::failing_at("mount_proc");
        let err = run(&mut host, IsolationProfile::FULL);
        assert!(!host.calls.contains(&"exec"));
        assert!(!host.calls.contains(&"set_hostname"));
        assert!(aborted_before_exec(&err));
        assert!(matches!(err, LaunchError::Mount { step: "mount_proc", .. }));
    }

    #[test]
    fn proc_unmount_failure_skips_remount() {
        let mut host = RecordingHost::failing_at("unmount_proc");
        let err = run(&mut host, IsolationProfile::FULL);
        assert_eq!(
            host.calls,
            ["make_mounts_private", "mount_tmpfs", "unmount_proc"]
        );
        assert!(matches!(err, LaunchError::Unmount { .. }));
        assert_eq!(err.exit_code(), 120);
    }

    #[test]
    fn tmpfs_failure_stops_at_first_mount() {
        let mut host = RecordingHost::failing_at("mount_tmpfs");
        let _ = run(&mut host, IsolationProfile::FULL);
        assert_eq!(host.calls, ["make_mounts_private", "mount_tmpfs"]);
    }

    #[test]
    fn hostname_failure_is_reported_with_its_own_code() {
        let mut host = RecordingHost::failing_at("set_hostname");
        let err = run(&mut host, IsolationProfile::FULL);
        assert!(!host.calls.contains(&"exec"));
        assert_eq!(err.exit_code(), 121);
    }

    #[test]
    fn exec_failure_surfaces_program_name() {
        let mut host = RecordingHost::default();
        let err = run(&mut host, IsolationProfile::NETWORK_ONLY);
        assert_eq!(err.exit_code(), 127);
        assert!(err.to_string().contains("/bin/sh"));
    }
}
