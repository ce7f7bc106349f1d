//! Core business logic module
//!
//! Lock file data model and everything needed to verify it. File access goes
//! through [`crate::infra`].
//!
//! # Submodules
//!
//! - [`lock`] - Lock file, locked inputs and their JSON format
//! - [`flake_ref`] - Flake reference parsing and immutability
//! - [`hash`] - Self-describing content hashes
//! - [`nix_base32`] - Base32 flavour used by store paths and hashes
//! - [`store`] - Fixed-output store path derivation
//! - [`settings`] - Settings loaded from `settings.toml`

pub mod flake_ref;
pub mod hash;
pub mod lock;
pub mod nix_base32;
pub mod settings;
pub mod store;
