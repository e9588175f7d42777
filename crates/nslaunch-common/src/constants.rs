//! System-wide constants and exit codes.

/// Size of the stack reserved for the cloned child (1 MiB).
pub const CHILD_STACK_SIZE: usize = 1024 * 1024;

/// Hostname set inside a fresh UTS namespace.
pub const ISOLATED_HOSTNAME: &str = "custom_hostname";

/// Mount point that receives a private tmpfs.
pub const TMP_MOUNT_POINT: &str = "/tmp";

/// Mount point of the proc filesystem.
pub const PROC_MOUNT_POINT: &str = "/proc";

/// Exit code when the launcher itself fails (clone, wait, bad arguments).
pub const EXIT_LAUNCH_FAILED: i32 = 125;

/// Exit code when the target program exists but cannot be executed.
pub const EXIT_EXEC_NOT_EXECUTABLE: i32 = 126;

/// Exit code when the target program cannot be found.
pub const EXIT_EXEC_NOT_FOUND: i32 = 127;

/// Exit code for any failed filesystem bootstrap step.
pub const EXIT_MOUNT_FAILED: i32 = 120;

/// Exit code when the hostname could not be set.
pub const EXIT_HOSTNAME_FAILED: i32 = 121;

/// Offset added to a signal number when the child was killed by it.
pub const SIGNAL_EXIT_BASE: i32 = 128;

