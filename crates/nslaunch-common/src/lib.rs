//! # nslaunch-common
//!
//! Shared types, error definitions, configuration and constants used across
//! the nslaunch workspace.
//!
//! This crate is the leaf of the dependency graph. It knows nothing about
//! system calls; the Linux specifics live in `nslaunch-core`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
