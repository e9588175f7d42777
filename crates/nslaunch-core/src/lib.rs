//! # nslaunch-core
//!
//! Low-level Linux isolation primitives for nslaunch.
//!
//! This crate provides safe wrappers over:
//! - **Namespaces**: mapping an isolation profile to `clone(2)` flags and
//!   reading namespace identities from `/proc`.
//! - **Filesystem**: mount privatisation, tmpfs scratch space, and the
//!   `/proc` replacement a new PID namespace needs.
//! - **UTS**: the hostname inside a new UTS namespace.
//!
//! Every function here acts on the calling process. Mount and hostname
//! changes are only safe to call from inside the namespaces they target.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod filesystem;
pub mod namespace;
