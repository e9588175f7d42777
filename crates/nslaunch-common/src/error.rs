//! Unified error type for the nslaunch workspace.
//!
//! Launcher-side variants are fatal to the invocation. Child-side variants are
//! fatal to the child only and are turned into its exit status before it dies,
//! which is all the launcher ever sees of them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::constants::{
    EXIT_EXEC_NOT_EXECUTABLE, EXIT_EXEC_NOT_FOUND, EXIT_HOSTNAME_FAILED, EXIT_LAUNCH_FAILED,
    EXIT_MOUNT_FAILED,
};

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The isolated child process could not be created.
    #[error("failed to create isolated process: {source}")]
    ProcessCreation {
        /// Underlying OS error.
        source: io::Error,
    },

    /// The launcher could not observe the child's termination.
    #[error("failed to wait for pid {pid}: {source}")]
    Wait {
        /// PID of the child being waited on.
        pid: i32,
        /// Underlying OS error.
        source: io::Error,
    },

    /// A mount step of the bootstrap failed.
    #[error("{step} failed to mount {target}: {source}")]
    Mount {
        /// Name of the failing setup step.
        step: &'static str,
        /// Mount point.
        target: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },

    /// Unmounting an inherited filesystem failed.
    #[error("failed to unmount {target}: {source}")]
    Unmount {
        /// Mount point.
        target: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },

    /// Setting the UTS hostname failed.
    #[error("failed to set hostname to {hostname:?}: {source}")]
    Hostname {
        /// Requested hostname.
        hostname: String,
        /// Underlying OS error.
        source: io::Error,
    },

    /// The target program could not be executed.
    #[error("failed to execute {program}: {source}")]
    Exec {
        /// Program path as given.
        program: String,
        /// Underlying OS error.
        source: io::Error,
    },

    /// The program or its arguments are unusable.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },
}

impl LaunchError {
    /// Process exit code that reports this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProcessCreation { .. } | Self::Wait { .. } | Self::InvalidArgument { .. } => {
                EXIT_LAUNCH_FAILED
            }
            Self::Mount { .. } | Self::Unmount { .. } => EXIT_MOUNT_FAILED,
            Self::Hostname { .. } => EXIT_HOSTNAME_FAILED,
            Self::Exec { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                EXIT_EXEC_NOT_FOUND
            }
            Self::Exec { .. } => EXIT_EXEC_NOT_EXECUTABLE,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, LaunchError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn os_error(kind: io::ErrorKind) -> io::Error {
        io::Error::from(kind)
    }

    #[test]
    fn launcher_errors_share_one_code() {
        let create = LaunchError::ProcessCreation {
            source: os_error(io::ErrorKind::PermissionDenied),
        };
        let wait = LaunchError::Wait {
            pid: 42,
            source: os_error(io::ErrorKind::Other),
        };
        assert_eq!(create.exit_code(), EXIT_LAUNCH_FAILED);
        assert_eq!(wait.exit_code(), EXIT_LAUNCH_FAILED);
    }

    #[test]
    fn exec_not_found_differs_from_not_executable() {
        let missing = LaunchError::Exec {
            program: "/nope".into(),
            source: os_error(io::ErrorKind::NotFound),
        };
        let denied = LaunchError::Exec {
            program: "/etc/passwd".into(),
            source: os_error(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(missing.exit_code(), 127);
        assert_eq!(denied.exit_code(), 126);
    }

    #[test]
    fn mount_error_names_step_and_target() {
        let err = LaunchError::Mount {
            step: "remount-proc",
            target: PathBuf::from("/proc"),
            source: os_error(io::ErrorKind::PermissionDenied),
        };
        let message = err.to_string();
        assert!(message.starts_with("remount-proc failed to mount /proc"));
        assert_eq!(err.exit_code(), EXIT_MOUNT_FAILED);
    }

    #[test]
    fn unmount_and_hostname_codes() {
        let unmount = LaunchError::Unmount {
            target: PathBuf::from("/proc"),
            source: os_error(io::ErrorKind::Other),
        };
        let hostname = LaunchError::Hostname {
            hostname: "custom_hostname".into(),
            source: os_error(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(unmount.exit_code(), EXIT_MOUNT_FAILED);
        assert_eq!(hostname.exit_code(), EXIT_HOSTNAME_FAILED);
    }
}
