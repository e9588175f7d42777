//! # nsl-net
//!
//! Runs a program in a fresh, unconfigured network namespace.

use nslaunch_common::types::IsolationProfile;

fn main() {
    std::process::exit(nslaunch_cli::run(IsolationProfile::NETWORK_ONLY));
}
