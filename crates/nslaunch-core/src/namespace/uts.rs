//! UTS namespace setup.
//!
//! Gives the isolated child its own hostname.

use nix::unistd::sethostname;
use nslaunch_common::error::{LaunchError, Result};

/// Sets the hostname of the calling process's UTS namespace.
///
/// Only call this inside a freshly created UTS namespace, otherwise the
/// host's hostname changes.
///
/// # Errors
///
/// Returns [`LaunchError::Hostname`] if `sethostname(2)` fails.
pub fn set_hostname(hostname: &str) -> Result<()> {
    sethostname(hostname).map_err(|e| LaunchError::Hostname {
        hostname: hostname.to_owned(),
        source: e.into(),
    })?;
    tracing::debug!(hostname, "hostname set");
    Ok(())
}
