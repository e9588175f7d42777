//! Mount utilities for the child's private filesystem view.
//!
//! All of these act on the calling process's mount namespace. They must run
//! after the child is in its own mount namespace and, for the mounts below,
//! after [`make_mounts_private`].

use std::path::Path;

use nix::mount::{MntFlags, MsFlags, mount, umount2};
use nslaunch_common::constants::PROC_MOUNT_POINT;
use nslaunch_common::error::{LaunchError, Result};

/// Recursively marks every mount as private.
///
/// A new mount namespace starts with copies of the parent's mounts, still in
/// the same peer groups. Without this, mounting or unmounting on a shared
/// mount would propagate back to the host.
///
/// # Errors
///
/// Returns [`LaunchError::Mount`] if the propagation change fails.
pub fn make_mounts_private() -> Result<()> {
    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_REC | MsFlags::MS_PRIVATE,
        None::<&str>,
    )
    .map_err(|e| LaunchError::Mount {
        step: "privatize-mounts",
        target: "/".into(),
        source: e.into(),
    })?;
    tracing::debug!("mount propagation set to private");
    Ok(())
}

/// Mounts an empty tmpfs over `target`.
///
/// # Errors
///
/// Returns [`LaunchError::Mount`] if the `mount(2)` syscall fails.
pub fn mount_tmpfs(target: &Path) -> Result<()> {
    mount(
        Some("none"),
        target,
        Some("tmpfs"),
        MsFlags::empty(),
        None::<&str>,
    )
    .map_err(|e| LaunchError::Mount {
        step: "mount-tmpfs",
        target: target.to_path_buf(),
        source: e.into(),
    })?;
    tracing::debug!(target = %target.display(), "tmpfs mounted");
    Ok(())
}

/// Detaches the inherited `/proc`.
///
/// Uses a lazy unmount so sub-mounts such as `binfmt_misc` do not make the
/// call fail with `EBUSY`.
///
/// # Errors
///
/// Returns [`LaunchError::Unmount`] if `umount2(2)` fails.
pub fn unmount_proc() -> Result<()> {
    umount2(PROC_MOUNT_POINT, MntFlags::MNT_DETACH).map_err(|e| LaunchError::Unmount {
        target: PROC_MOUNT_POINT.into(),
        source: e.into(),
    })?;
    tracing::debug!("stale /proc detached");
    Ok(())
}

/// Mounts a `proc` filesystem reflecting the caller's PID namespace.
///
/// # Errors
///
/// Returns [`LaunchError::Mount`] if the `mount(2)` syscall fails.
pub fn mount_proc() -> Result<()> {
    mount(
        Some("proc"),
        PROC_MOUNT_POINT,
        Some("proc"),
        MsFlags::MS_NOSUID | MsFlags::MS_NODEV | MsFlags::MS_NOEXEC,
        None::<&str>,
    )
    .map_err(|e| LaunchError::Mount {
        step: "remount-proc",
        target: PROC_MOUNT_POINT.into(),
        source: e.into(),
    })?;
    tracing::debug!("fresh /proc mounted");
    Ok(())
}
