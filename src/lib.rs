//! Flakelock - versioned, content-addressed lock files
//!
//! This library reads, verifies and writes lock files that pin every input
//! of a project to an exact revision and content hash, so builds can be
//! reproduced bit for bit.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`core`] - Lock file model, references, hashes and store paths (no I/O)
//! - [`infra`] - Infrastructure layer (filesystem, directories)
//! - [`config`] - Constants
//! - [`error`] - Error types and handling
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use flakelock::core::lock::LockFile;
//! use flakelock::core::settings::Settings;
//! use flakelock::core::store::Store;
//! use flakelock::infra::dirs::FlakelockDirs;
//!
//! # fn main() -> Result<(), flakelock::error::FlakelockError> {
//! let settings = Settings::load(&FlakelockDirs::new())?;
//! let store = Store::new(&settings);
//! let lock = LockFile::read_in(Path::new("."), &settings)?;
//! for (name, input) in lock.inputs().iter() {
//!     println!("{name}: {}", input.compute_store_path(&store)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
