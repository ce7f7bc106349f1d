//! Infrastructure layer
//!
//! Handles all I/O: the filesystem and environment lookups.
//! This module is the only place where side effects occur.

pub mod dirs;
pub mod env;
pub mod filesystem;
