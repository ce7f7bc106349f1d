//! Error types for flakelock
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::settings::SettingsError;

/// Flake reference parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlakeRefError {
    /// Empty reference string
    #[error("Flake reference is empty")]
    Empty,

    /// Scheme not understood
    #[error("Unsupported scheme in flake reference '{reference}'")]
    UnsupportedScheme { reference: String },

    /// Structurally invalid reference
    #[error("Invalid flake reference '{reference}': {reason}")]
    Invalid { reference: String, reason: String },
}

/// Content hash parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Unknown or missing hash algorithm
    #[error("Unknown hash algorithm in '{hash}'")]
    UnknownAlgorithm { hash: String },

    /// Digest length does not match any encoding for the algorithm
    #[error("Hash '{hash}' has wrong length for {algorithm}")]
    WrongLength { hash: String, algorithm: String },

    /// Digest contains characters outside its encoding
    #[error("Hash '{hash}' is not valid {encoding}")]
    BadEncoding { hash: String, encoding: String },
}

/// Store path computation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Name part of a store path is not allowed
    #[error("Invalid store path name '{name}': {reason}")]
    InvalidStorePathName { name: String, reason: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: std::io::Error },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: std::io::Error },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: std::io::Error },
}

/// Lock file errors
///
/// Every variant aborts the whole read; there is no partial load.
#[derive(Error, Debug)]
pub enum LockFileError {
    /// Document is not valid JSON
    #[error("Lock file '{path}' is not valid JSON: {error}")]
    MalformedDocument { path: String, error: String },

    /// Format version other than the one this crate understands
    #[error("Lock file '{path}' has unsupported version {version}")]
    UnsupportedLockVersion {
        path: String,
        version: serde_json::Number,
    },

    /// A `url`/`originalUrl` value is not a valid flake reference
    #[error("Lock file contains invalid flake reference '{reference}': {error}")]
    InvalidReference {
        reference: String,
        error: FlakeRefError,
    },

    /// A `narHash` value is missing or cannot be parsed
    #[error("Lock file contains invalid narHash '{hash}': {error}")]
    InvalidHash { hash: String, error: String },

    /// A resolved reference does not pin an exact revision
    #[error("Lock file contains mutable flake reference '{reference}'")]
    MutableLockedReference { reference: String },

    /// A field is present but has the wrong JSON type
    #[error("Lock file has invalid structure: {message}")]
    InvalidStructure { message: String },

    /// Underlying storage failure
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Top-level flakelock error type
#[derive(Error, Debug)]
pub enum FlakelockError {
    /// Lock file error
    #[error("Lock file error: {0}")]
    LockFile(#[from] LockFileError),

    /// Flake reference error
    #[error("Flake reference error: {0}")]
    FlakeRef(#[from] FlakeRefError),

    /// Hash error
    #[error("Hash error: {0}")]
    Hash(#[from] HashError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Settings error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}
