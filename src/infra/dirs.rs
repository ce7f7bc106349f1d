//! Platform-specific directory management
//!
//! Resolves where flakelock looks for its settings file. Follows the XDG Base
//! Directory Specification on Linux and standard locations on macOS.
//!
//! `FLAKELOCK_CONFIG_DIR` overrides the default config directory.

use std::path::PathBuf;

use crate::infra::env;

/// Application name used in directory paths
const APP_NAME: &str = "flakelock";

/// Settings file name inside the config directory
const SETTINGS_FILE: &str = "settings.toml";

/// Platform-specific directory provider for flakelock
#[derive(Debug, Clone)]
pub struct FlakelockDirs {
    config_dir: PathBuf,
}

impl FlakelockDirs {
    /// Create a new `FlakelockDirs` instance
    ///
    /// Checks the environment first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Use an explicit config directory, ignoring environment and platform
    #[must_use]
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/flakelock` or `~/.config/flakelock`
    /// - macOS: `~/Library/Application Support/flakelock`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Path of `settings.toml` in the config directory
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        env::config_dir_override().unwrap_or_else(Self::platform_config_dir)
    }

    fn platform_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for FlakelockDirs {
    fn default() -> Self {
        Self::new()
    }
}
