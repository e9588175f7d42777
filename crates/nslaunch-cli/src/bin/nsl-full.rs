//! # nsl-full
//!
//! Runs a program in new PID, IPC, UTS, mount and network namespaces, with a
//! private `/tmp`, its own `/proc`, and an isolated hostname.

use nslaunch_common::types::IsolationProfile;

fn main() {
    std::process::exit(nslaunch_cli::run(IsolationProfile::FULL));
}
