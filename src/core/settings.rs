//! Settings
//!
//! Reads the user's `settings.toml` from the config directory. Settings are
//! loaded once into an immutable [`Settings`] value and passed explicitly to
//! whatever needs them ([`crate::core::store::Store`], lock file helpers).
//!
//! Recognized keys:
//!
//! ```toml
//! store_dir = "/nix/store"
//! lock_file_name = "flake.lock"
//! ```
//!
//! `FLAKELOCK_STORE_DIR` overrides `store_dir`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::defaults::{DEFAULT_LOCK_FILE_NAME, DEFAULT_STORE_DIR, ENV_STORE_DIR};
use crate::infra::dirs::FlakelockDirs;
use crate::infra::{env, filesystem};

/// Settings error types
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("Failed to read settings file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    ParseError { path: String, error: String },

    /// Failed to serialize settings
    #[error("Failed to serialize settings: {error}")]
    SerializeError { error: String },

    /// A setting has an unusable value
    #[error("Invalid value for setting '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Settings file contents; every key is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    store_dir: Option<String>,
    lock_file_name: Option<String>,
}

/// Effective settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    store_dir: String,
    lock_file_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: DEFAULT_STORE_DIR.to_string(),
            lock_file_name: DEFAULT_LOCK_FILE_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the config directory, then apply environment overrides
    ///
    /// A missing settings file yields the defaults.
    pub fn load(dirs: &FlakelockDirs) -> Result<Self, SettingsError> {
        let settings = Self::load_from_path(&dirs.settings_path())?;
        match env::store_dir_override() {
            Some(store_dir) => {
                tracing::debug!("Store directory overridden by {ENV_STORE_DIR}: {store_dir}");
                settings.with_store_dir(store_dir)
            }
            None => Ok(settings),
        }
    }

    /// Load settings from a specific path, without environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        let Some(content) =
            filesystem::read_file_if_exists(path).map_err(|e| SettingsError::ReadError {
                path: path.display().to_string(),
                error: e.to_string(),
            })?
        else {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        };

        tracing::debug!("Loading settings from {}", path.display());
        Self::from_toml(&content).map_err(|e| match e {
            SettingsError::ParseError { error, .. } => SettingsError::ParseError {
                path: path.display().to_string(),
                error,
            },
            other => other,
        })
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile =
            toml::from_str(content).map_err(|e| SettingsError::ParseError {
                path: "<string>".to_string(),
                error: e.to_string(),
            })?;

        let mut settings = Self::default();
        if let Some(store_dir) = file.store_dir {
            settings = settings.with_store_dir(store_dir)?;
        }
        if let Some(lock_file_name) = file.lock_file_name {
            settings = settings.with_lock_file_name(lock_file_name)?;
        }
        Ok(settings)
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        let file = SettingsFile {
            store_dir: Some(self.store_dir.clone()),
            lock_file_name: Some(self.lock_file_name.clone()),
        };
        toml::to_string_pretty(&file).map_err(|e| SettingsError::SerializeError {
            error: e.to_string(),
        })
    }

    /// Replace the store directory
    ///
    /// Must be absolute; trailing slashes are dropped.
    pub fn with_store_dir(mut self, store_dir: impl Into<String>) -> Result<Self, SettingsError> {
        let mut store_dir = store_dir.into();
        if !store_dir.starts_with('/') {
            return Err(SettingsError::InvalidValue {
                name: "store_dir".to_string(),
                reason: format!("'{store_dir}' is not an absolute path"),
            });
        }
        while store_dir.len() > 1 && store_dir.ends_with('/') {
            store_dir.pop();
        }
        self.store_dir = store_dir;
        Ok(self)
    }

    /// Replace the lock file name
    ///
    /// Must be a bare file name, not a path.
    pub fn with_lock_file_name(
        mut self,
        lock_file_name: impl Into<String>,
    ) -> Result<Self, SettingsError> {
        let lock_file_name = lock_file_name.into();
        if lock_file_name.is_empty()
            || lock_file_name.contains('/')
            || lock_file_name == "."
            || lock_file_name == ".."
        {
            return Err(SettingsError::InvalidValue {
                name: "lock_file_name".to_string(),
                reason: format!("'{lock_file_name}' is not a plain file name"),
            });
        }
        self.lock_file_name = lock_file_name;
        Ok(self)
    }

    /// Store directory, without trailing slash
    #[must_use]
    pub fn store_dir(&self) -> &str {
        &self.store_dir
    }

    /// Lock file name inside a project directory
    #[must_use]
    pub fn lock_file_name(&self) -> &str {
        &self.lock_file_name
    }
}
