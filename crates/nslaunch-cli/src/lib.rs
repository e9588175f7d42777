//! Shared front end of the `nsl-net` and `nsl-full` launchers.
//!
//! Both binaries take `<program> [args...]`, differ only in the isolation
//! profile they hardcode, and exit with the code described in
//! [`nslaunch_common::constants`].

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use anyhow::Context;
use clap::Parser;
use nslaunch_common::config::LaunchConfig;
use nslaunch_common::constants::EXIT_LAUNCH_FAILED;
use nslaunch_common::types::{ChildExecutionContext, IsolationProfile};

/// Run a program inside fresh Linux namespaces.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Program to run followed by its arguments, passed through verbatim.
    #[arg(
        value_name = "PROGRAM",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required = true
    )]
    pub command: Vec<String>,
}

/// Installs the stderr `tracing` subscriber, filtered by `RUST_LOG`.
///
/// Without `RUST_LOG` only errors are printed.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Launches the parsed command under `profile`.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the launcher itself fails.
pub fn launch(cli: Cli, profile: IsolationProfile) -> anyhow::Result<i32> {
    let ctx = ChildExecutionContext::from_command(cli.command)?;
    let config = LaunchConfig::new(profile);
    let outcome = nslaunch_runtime::launcher::launch(&config, &ctx)
        .with_context(|| format!("cannot run {} in a {profile} sandbox", ctx.program()))?;
    Ok(outcome.exit_code())
}

/// Binary entry point: parses arguments, launches, and returns the exit code.
pub fn run(profile: IsolationProfile) -> i32 {
    init_tracing();
    let cli = Cli::parse();
    match launch(cli, profile) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            EXIT_LAUNCH_FAILED
        }
    }
}
