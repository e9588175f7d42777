//! Exec handoff: replacing the child's process image with the target program.

use std::convert::Infallible;
use std::ffi::CString;

use nix::unistd::execvp;
use nslaunch_common::error::{LaunchError, Result};
use nslaunch_common::types::ChildExecutionContext;

/// Replaces the current process image with the context's program.
///
/// The program is looked up through `PATH` when it is not a path, and
/// `args` becomes its argument vector unchanged. On success this never
/// returns; the new program keeps the pid, namespaces, mounts and hostname.
///
/// # Errors
///
/// Returns [`LaunchError::Exec`] if the program is missing, not executable,
/// or an argument cannot be passed to the kernel.
pub fn exec_program(ctx: &ChildExecutionContext) -> Result<Infallible> {
    let exec_error = |source: std::io::Error| LaunchError::Exec {
        program: ctx.program().to_owned(),
        source,
    };

    let program = CString::new(ctx.program())
        .map_err(|e| exec_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
    let args = ctx
        .args()
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| exec_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;

    tracing::debug!(program = ctx.program(), args = ?ctx.args(), "exec");
    execvp(&program, &args).map_err(|e| exec_error(e.into()))
}
