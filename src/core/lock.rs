//! Lock file handling
//!
//! The lock file (`flake.lock`) records, for every input of a project, the
//! exact revision it resolved to and the hash of its content, recursively for
//! the inputs of those inputs. A locked input can only be built from an
//! immutable reference, so once a lock file loads, everything in it is
//! pinned and independently verifiable.
//!
//! On disk the lock file is JSON:
//!
//! ```json
//! {
//!     "inputs": {
//!         "nixpkgs": {
//!             "inputs": {},
//!             "narHash": "sha256-...",
//!             "originalUrl": "github:NixOS/nixpkgs",
//!             "url": "github:NixOS/nixpkgs/<rev>"
//!         }
//!     },
//!     "version": 3
//! }
//! ```
//!
//! Older lock files spell `url`/`originalUrl` as `uri`/`originalUri`; both are
//! accepted on read and only the new keys are written.
//!
//! Writes replace the whole file. There is no cross-process locking: two
//! concurrent writers to the same path race, and the last write wins.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};

use crate::config::defaults::{LOCK_FILE_INDENT, LOCK_FILE_VERSION, SOURCE_LABEL};
use crate::core::flake_ref::FlakeRef;
use crate::core::hash::Hash;
use crate::core::settings::Settings;
use crate::core::store::ContentAddresser;
use crate::error::{LockFileError, StoreError};
use crate::infra::filesystem;

/// Keys holding the resolved reference, in priority order
const URL_KEYS: &[&str] = &["url", "uri"];

/// Keys holding the reference as written by the user, in priority order
const ORIGINAL_URL_KEYS: &[&str] = &["originalUrl", "originalUri"];

const NAR_HASH_KEY: &str = "narHash";
const INPUTS_KEY: &str = "inputs";
const VERSION_KEY: &str = "version";

/// Where a document came from, for error messages
const IN_MEMORY: &str = "<string>";

fn as_object<'a>(json: &'a Value, what: &str) -> Result<&'a Map<String, Value>, LockFileError> {
    json.as_object()
        .ok_or_else(|| LockFileError::InvalidStructure {
            message: format!("{what} must be a JSON object"),
        })
}

/// First string value found under any of `keys`
///
/// An absent key yields the empty string, which no reference parser accepts.
fn lookup_string<'a>(
    object: &'a Map<String, Value>,
    keys: &[&str],
) -> Result<&'a str, LockFileError> {
    let Some((index, key, value)) = keys
        .iter()
        .enumerate()
        .find_map(|(index, key)| object.get(*key).map(|value| (index, *key, value)))
    else {
        return Ok("");
    };

    if index > 0 {
        tracing::debug!("Lock file uses legacy attribute '{key}'");
    }

    value.as_str().ok_or_else(|| LockFileError::InvalidStructure {
        message: format!("attribute '{key}' must be a string"),
    })
}

/// Whether `version` is the supported format version
///
/// Integral floats such as `3.0` count as their integer value.
#[allow(clippy::float_cmp, clippy::cast_precision_loss)]
fn is_supported_version(version: &Number) -> bool {
    match version.as_i64() {
        Some(version) => version == LOCK_FILE_VERSION,
        None => version
            .as_f64()
            .is_some_and(|version| version == LOCK_FILE_VERSION as f64),
    }
}

fn parse_reference(reference: &str) -> Result<FlakeRef, LockFileError> {
    reference
        .parse()
        .map_err(|error| LockFileError::InvalidReference {
            reference: reference.to_string(),
            error,
        })
}

/// A single resolved input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedInput {
    reference: FlakeRef,
    original_reference: FlakeRef,
    nar_hash: Hash,
    inputs: LockedInputs,
}

impl LockedInput {
    /// Build a locked input from its parts
    ///
    /// Fails with [`LockFileError::MutableLockedReference`] unless `reference`
    /// pins an exact revision.
    pub fn new(
        reference: FlakeRef,
        original_reference: FlakeRef,
        nar_hash: Hash,
        inputs: LockedInputs,
    ) -> Result<Self, LockFileError> {
        Self::ensure_immutable(&reference)?;
        Ok(Self {
            reference,
            original_reference,
            nar_hash,
            inputs,
        })
    }

    fn ensure_immutable(reference: &FlakeRef) -> Result<(), LockFileError> {
        if reference.is_immutable() {
            Ok(())
        } else {
            Err(LockFileError::MutableLockedReference {
                reference: reference.to_string(),
            })
        }
    }

    /// Parse a locked input from its JSON record
    pub fn from_json(json: &Value) -> Result<Self, LockFileError> {
        let object = as_object(json, "locked input")?;

        let reference = parse_reference(lookup_string(object, URL_KEYS)?)?;
        Self::ensure_immutable(&reference)?;

        let original_reference = parse_reference(lookup_string(object, ORIGINAL_URL_KEYS)?)?;

        let nar_hash = match object.get(NAR_HASH_KEY) {
            None | Some(Value::Null) => {
                return Err(LockFileError::InvalidHash {
                    hash: String::new(),
                    error: format!("missing '{NAR_HASH_KEY}' attribute"),
                })
            }
            Some(Value::String(hash)) => {
                hash.parse::<Hash>()
                    .map_err(|e| LockFileError::InvalidHash {
                        hash: hash.clone(),
                        error: e.to_string(),
                    })?
            }
            Some(other) => {
                return Err(LockFileError::InvalidHash {
                    hash: other.to_string(),
                    error: format!("'{NAR_HASH_KEY}' must be a string"),
                })
            }
        };

        let inputs = LockedInputs::from_json(json)?;

        Self::new(reference, original_reference, nar_hash, inputs)
    }

    /// Serialize to the lock file record
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut json = self.inputs.to_json();
        if let Value::Object(object) = &mut json {
            object.insert(URL_KEYS[0].to_string(), self.reference.to_string().into());
            object.insert(
                ORIGINAL_URL_KEYS[0].to_string(),
                self.original_reference.to_string().into(),
            );
            object.insert(NAR_HASH_KEY.to_string(), self.nar_hash.to_string().into());
        }
        json
    }

    /// Store path of this input's source
    ///
    /// Depends only on the content hash (and the store directory), not on
    /// where the content came from.
    pub fn compute_store_path<S>(&self, store: &S) -> Result<String, StoreError>
    where
        S: ContentAddresser + ?Sized,
    {
        let path = store.make_fixed_output_path(true, &self.nar_hash, SOURCE_LABEL)?;
        Ok(store.print_store_path(&path))
    }

    /// Whether every nested input is pinned
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.inputs.is_immutable()
    }

    /// Resolved reference
    #[must_use]
    pub fn reference(&self) -> &FlakeRef {
        &self.reference
    }

    /// Reference as written by the user
    #[must_use]
    pub fn original_reference(&self) -> &FlakeRef {
        &self.original_reference
    }

    /// Content hash
    #[must_use]
    pub fn nar_hash(&self) -> &Hash {
        &self.nar_hash
    }

    /// Nested inputs
    #[must_use]
    pub fn inputs(&self) -> &LockedInputs {
        &self.inputs
    }
}

/// Named locked inputs, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockedInputs {
    inputs: BTreeMap<String, LockedInput>,
}

impl LockedInputs {
    /// No inputs
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input, replacing any input of the same name
    #[must_use]
    pub fn with_input(mut self, name: impl Into<String>, input: LockedInput) -> Self {
        self.inputs.insert(name.into(), input);
        self
    }

    /// Parse the `inputs` attribute of a JSON record
    ///
    /// A missing or null `inputs` attribute means no inputs.
    pub fn from_json(json: &Value) -> Result<Self, LockFileError> {
        let object = as_object(json, "lock file node")?;

        let entries = match object.get(INPUTS_KEY) {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Object(entries)) => entries,
            Some(_) => {
                return Err(LockFileError::InvalidStructure {
                    message: format!("attribute '{INPUTS_KEY}' must be an object"),
                })
            }
        };

        let mut inputs = BTreeMap::new();
        for (name, entry) in entries {
            tracing::trace!("Parsing locked input '{name}'");
            inputs.insert(name.clone(), LockedInput::from_json(entry)?);
        }
        Ok(Self { inputs })
    }

    /// Serialize as `{"inputs": {...}}`
    #[must_use]
    pub fn to_json(&self) -> Value {
        let entries: Map<String, Value> = self
            .inputs
            .iter()
            .map(|(name, input)| (name.clone(), input.to_json()))
            .collect();

        let mut json = Map::new();
        json.insert(INPUTS_KEY.to_string(), Value::Object(entries));
        Value::Object(json)
    }

    /// Whether every input in the tree has an immutable reference
    ///
    /// `LockedInput` construction already rejects mutable references, so a
    /// `false` here means the tree was not built through this module.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.inputs
            .values()
            .all(|input| input.reference.is_immutable() && input.is_immutable())
    }

    /// Input by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LockedInput> {
        self.inputs.get(name)
    }

    /// Inputs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LockedInput)> {
        self.inputs.iter().map(|(name, input)| (name.as_str(), input))
    }

    /// Input names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }

    /// Number of direct inputs
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether there are no direct inputs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Root of a lock file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockFile {
    inputs: LockedInputs,
}

impl LockFile {
    /// Lock file holding `inputs`
    #[must_use]
    pub fn new(inputs: LockedInputs) -> Self {
        Self { inputs }
    }

    /// Top-level inputs
    #[must_use]
    pub fn inputs(&self) -> &LockedInputs {
        &self.inputs
    }

    /// Whether every input in the tree has an immutable reference
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.inputs.is_immutable()
    }

    /// Serialize to the lock file document, including the format version
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut json = self.inputs.to_json();
        if let Value::Object(object) = &mut json {
            object.insert(VERSION_KEY.to_string(), LOCK_FILE_VERSION.into());
        }
        json
    }

    /// Build from a parsed document, checking its format version
    fn from_document(json: &Value, origin: &str) -> Result<Self, LockFileError> {
        let object = as_object(json, "lock file")?;

        let version = match object.get(VERSION_KEY) {
            None => Number::from(0_i64),
            Some(Value::Number(version)) => version.clone(),
            Some(_) => {
                return Err(LockFileError::InvalidStructure {
                    message: format!("attribute '{VERSION_KEY}' must be a number"),
                })
            }
        };
        if !is_supported_version(&version) {
            return Err(LockFileError::UnsupportedLockVersion {
                path: origin.to_string(),
                version,
            });
        }

        Ok(Self {
            inputs: LockedInputs::from_json(json)?,
        })
    }

    /// Parse a raw document; bytes that are not UTF-8 JSON are malformed
    fn parse(bytes: &[u8], origin: &str) -> Result<Self, LockFileError> {
        let json: Value =
            serde_json::from_slice(bytes).map_err(|e| LockFileError::MalformedDocument {
                path: origin.to_string(),
                error: e.to_string(),
            })?;
        Self::from_document(&json, origin)
    }

    /// Parse lock file text
    pub fn from_json_str(text: &str) -> Result<Self, LockFileError> {
        Self::parse(text.as_bytes(), IN_MEMORY)
    }

    /// Formatted document with 4-space indentation and a trailing newline
    #[must_use]
    pub fn to_json_string(&self) -> String {
        format!("{self}\n")
    }

    /// Read a lock file
    ///
    /// A missing file is an empty lock file, not an error.
    pub fn read(path: &Path) -> Result<Self, LockFileError> {
        let Some(bytes) = filesystem::read_bytes_if_exists(path)? else {
            tracing::debug!("No lock file at {}, starting empty", path.display());
            return Ok(Self::default());
        };

        tracing::debug!("Reading lock file {}", path.display());
        let lock_file = Self::parse(&bytes, &path.display().to_string())?;
        tracing::debug!(
            "Loaded {} top-level input(s) from {}",
            lock_file.inputs.len(),
            path.display()
        );
        Ok(lock_file)
    }

    /// Write the lock file, creating missing parent directories
    ///
    /// Overwrites whatever is at `path`.
    pub fn write(&self, path: &Path) -> Result<(), LockFileError> {
        tracing::debug!("Writing lock file {}", path.display());
        filesystem::write_file(path, &self.to_json_string())?;
        Ok(())
    }

    /// Read the lock file of the project in `dir`
    pub fn read_in(dir: &Path, settings: &Settings) -> Result<Self, LockFileError> {
        Self::read(&dir.join(settings.lock_file_name()))
    }

    /// Write the lock file of the project in `dir`
    pub fn write_in(&self, dir: &Path, settings: &Settings) -> Result<(), LockFileError> {
        self.write(&dir.join(settings.lock_file_name()))
    }
}

impl fmt::Display for LockFile {
    /// Formatted document, without trailing newline
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(LOCK_FILE_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.to_json()
            .serialize(&mut serializer)
            .map_err(|_| fmt::Error)?;
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}
