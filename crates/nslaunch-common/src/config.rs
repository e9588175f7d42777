//! Launch configuration.

use crate::constants::{CHILD_STACK_SIZE, ISOLATED_HOSTNAME};
use crate::types::{IsolationProfile, SetupAction};

/// Immutable settings for a single launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Namespace kinds the child is created in.
    pub profile: IsolationProfile,
    /// Hostname applied when the profile isolates UTS.
    pub hostname: String,
    /// Size in bytes of the child's initial stack.
    pub stack_size: usize,
}

impl LaunchConfig {
    /// Creates a configuration for `profile` with the default hostname and stack size.
    #[must_use]
    pub fn new(profile: IsolationProfile) -> Self {
        Self {
            profile,
            hostname: ISOLATED_HOSTNAME.to_owned(),
            stack_size: CHILD_STACK_SIZE,
        }
    }

    /// Ordered setup actions the child performs before exec.
    #[must_use]
    pub fn setup_actions(&self) -> Vec<SetupAction> {
        self.profile.setup_actions(&self.hostname)
    }
}
