//! Linux namespace selection and inspection.
//!
//! Namespaces are created by the launcher's single `clone(2)` call, so this
//! module only translates profiles into flags and reads back identities.

pub mod uts;

use std::io;
use std::path::PathBuf;

use nix::sched::CloneFlags;
use nix::unistd::Pid;
use nslaunch_common::types::{IsolationProfile, NamespaceKind};

/// `clone(2)` flag that creates a new namespace of `kind`.
#[must_use]
pub const fn clone_flag(kind: NamespaceKind) -> CloneFlags {
    match kind {
        NamespaceKind::Net => CloneFlags::CLONE_NEWNET,
        NamespaceKind::Pid => CloneFlags::CLONE_NEWPID,
        NamespaceKind::Ipc => CloneFlags::CLONE_NEWIPC,
        NamespaceKind::Uts => CloneFlags::CLONE_NEWUTS,
        NamespaceKind::Mount => CloneFlags::CLONE_NEWNS,
    }
}

/// Combined `clone(2)` flags for every kind requested by `profile`.
#[must_use]
pub fn clone_flags(profile: IsolationProfile) -> CloneFlags {
    profile
        .kinds()
        .fold(CloneFlags::empty(), |flags, kind| flags | clone_flag(kind))
}

/// Path of the namespace link for `pid` (or the calling process when `None`).
#[must_use]
pub fn namespace_path(pid: Option<Pid>, kind: NamespaceKind) -> PathBuf {
    let owner = pid.map_or_else(|| "self".to_owned(), |p| p.to_string());
    PathBuf::from(format!("/proc/{owner}/ns/{}", kind.proc_name()))
}

/// Reads the identity of a namespace, e.g. `net:[4026531840]`.
///
/// Two processes are in the same namespace of `kind` exactly when these
/// strings are equal.
///
/// # Errors
///
/// Returns an error if the process does not exist or its `ns` directory
/// cannot be read.
pub fn namespace_id(pid: Option<Pid>, kind: NamespaceKind) -> io::Result<String> {
    let link = std::fs::read_link(namespace_path(pid, kind))?;
    Ok(link.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_profile_maps_to_all_five_flags() {
        let flags = clone_flags(IsolationProfile::FULL);
        assert_eq!(
            flags,
            CloneFlags::CLONE_NEWNET
                | CloneFlags::CLONE_NEWPID
                | CloneFlags::CLONE_NEWIPC
                | CloneFlags::CLONE_NEWUTS
                | CloneFlags::CLONE_NEWNS
        );
    }

    #[test]
    fn network_only_maps_to_newnet() {
        assert_eq!(
            clone_flags(IsolationProfile::NETWORK_ONLY),
            CloneFlags::CLONE_NEWNET
        );
    }

    #[test]
    fn empty_profile_has_no_flags() {
        assert!(clone_flags(IsolationProfile::empty()).is_empty());
    }

    #[test]
    fn namespace_path_uses_proc_names() {
        assert_eq!(
            namespace_path(None, NamespaceKind::Mount),
            PathBuf::from("/proc/self/ns/mnt")
        );
        assert_eq!(
            namespace_path(Some(Pid::from_raw(42)), NamespaceKind::Net),
            PathBuf::from("/proc/42/ns/net")
        );
    }

    #[test]
    fn own_namespace_ids_are_readable() {
        for kind in NamespaceKind::ALL {
            let id = namespace_id(None, kind).unwrap();
            assert!(id.starts_with(&format!("{}:[", kind.proc_name())), "{id}");
        }
    }
}
