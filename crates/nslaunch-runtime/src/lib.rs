//! Launching a program inside fresh Linux namespaces.
//!
//! The flow is [`launcher::launch`] (parent side) → [`bootstrap::bootstrap`]
//! (first code run by the cloned child) → [`exec::exec_program`], which
//! replaces the child's image with the target program.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod bootstrap;
pub mod exec;
pub mod launcher;
pub mod stack;
