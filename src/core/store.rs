//! Store path derivation
//!
//! Computes where content lives in a content-addressed store. Locked inputs
//! use the fixed-output scheme: the path depends only on the content hash,
//! the name and the store directory, never on how the content was built.

use sha2::{Digest, Sha256};

use crate::config::defaults::{MAX_STORE_PATH_NAME_LEN, STORE_PATH_HASH_BYTES};
use crate::core::hash::{Encoding, Hash, HashAlgorithm};
use crate::core::nix_base32;
use crate::core::settings::Settings;
use crate::error::StoreError;

/// A store path relative to its store directory: `<digest>-<name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePath {
    digest: [u8; STORE_PATH_HASH_BYTES],
    name: String,
}

impl StorePath {
    /// Base32 digest part
    #[must_use]
    pub fn hash_part(&self) -> String {
        nix_base32::encode(&self.digest)
    }

    /// Name part
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for StorePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.hash_part(), self.name)
    }
}

/// Computes canonical store paths from content hashes
pub trait ContentAddresser {
    /// Absolute store directory, without trailing slash
    fn store_dir(&self) -> &str;

    /// Path of fixed-output content with the given hash
    ///
    /// `recursive` selects NAR (directory tree) hashing over flat file hashing.
    fn make_fixed_output_path(
        &self,
        recursive: bool,
        hash: &Hash,
        name: &str,
    ) -> Result<StorePath, StoreError>;

    /// Absolute path string of `path` inside this store
    fn print_store_path(&self, path: &StorePath) -> String {
        format!("{}/{path}", self.store_dir())
    }
}

/// Store-path calculator bound to one store directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    store_dir: String,
}

impl Store {
    /// Store using the directory from `settings`
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self::with_store_dir(settings.store_dir())
    }

    /// Store rooted at `store_dir`
    #[must_use]
    pub fn with_store_dir(store_dir: impl Into<String>) -> Self {
        let mut store_dir = store_dir.into();
        while store_dir.len() > 1 && store_dir.ends_with('/') {
            store_dir.pop();
        }
        Self { store_dir }
    }

    /// Check the name part of a store path
    pub fn validate_name(name: &str) -> Result<(), StoreError> {
        let reject = |reason: &str| {
            Err(StoreError::InvalidStorePathName {
                name: name.to_string(),
                reason: reason.to_string(),
            })
        };

        if name.is_empty() {
            return reject("name is empty");
        }
        if name.len() > MAX_STORE_PATH_NAME_LEN {
            return reject("name is too long");
        }
        if name.starts_with('.') {
            return reject("name starts with a period");
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || "+-._?=".contains(*c)))
        {
            return reject(&format!("illegal character '{c}'"));
        }
        Ok(())
    }

    /// `<type>:<algo>:<base16>:<store_dir>:<name>`, hashed and folded
    fn make_store_path(&self, kind: &str, hash: &Hash, name: &str) -> StorePath {
        let fingerprint = format!(
            "{kind}:{}:{}:{name}",
            hash.to_string_with(Encoding::Base16),
            self.store_dir
        );
        tracing::trace!("Store path fingerprint: {fingerprint}");
        StorePath {
            digest: compress_hash(&Sha256::digest(fingerprint.as_bytes())),
            name: name.to_string(),
        }
    }
}

impl ContentAddresser for Store {
    fn store_dir(&self) -> &str {
        &self.store_dir
    }

    fn make_fixed_output_path(
        &self,
        recursive: bool,
        hash: &Hash,
        name: &str,
    ) -> Result<StorePath, StoreError> {
        Self::validate_name(name)?;

        if recursive && hash.algorithm() == HashAlgorithm::Sha256 {
            return Ok(self.make_store_path("source", hash, name));
        }

        let inner = Hash::sha256(
            format!(
                "fixed:out:{}{}:",
                if recursive { "r:" } else { "" },
                hash.to_string_with(Encoding::Base16)
            )
            .as_bytes(),
        );
        Ok(self.make_store_path("output:out", &inner, name))
    }
}

/// XOR-fold a digest down to the store path digest size
fn compress_hash(digest: &[u8]) -> [u8; STORE_PATH_HASH_BYTES] {
    let mut out = [0u8; STORE_PATH_HASH_BYTES];
    for (i, byte) in digest.iter().enumerate() {
        out[i % STORE_PATH_HASH_BYTES] ^= byte;
    }
    out
}
