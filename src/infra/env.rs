//! Environment overrides
//!
//! Variables that are not set, or are not valid Unicode, count as absent.

use std::env;
use std::path::PathBuf;

use crate::config::defaults::{ENV_CONFIG_DIR, ENV_STORE_DIR};

fn var(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Config directory from `FLAKELOCK_CONFIG_DIR`
pub fn config_dir_override() -> Option<PathBuf> {
    var(ENV_CONFIG_DIR).map(PathBuf::from)
}

/// Store directory from `FLAKELOCK_STORE_DIR`
pub fn store_dir_override() -> Option<String> {
    var(ENV_STORE_DIR)
}
