//! Filesystem setup inside a new mount namespace.

pub mod mount;
