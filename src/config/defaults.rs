//! Default configuration values

/// On-disk lock file schema version
pub const LOCK_FILE_VERSION: i64 = 3;

/// Default lock file name inside a project directory
pub const DEFAULT_LOCK_FILE_NAME: &str = "flake.lock";

/// Default store directory
pub const DEFAULT_STORE_DIR: &str = "/nix/store";

/// Indentation used when formatting lock files
pub const LOCK_FILE_INDENT: &[u8] = b"    ";

/// Name tag for fetched input sources in the store
pub const SOURCE_LABEL: &str = "source";

/// Maximum length of the name part of a store path
pub const MAX_STORE_PATH_NAME_LEN: usize = 211;

/// Number of bytes a store path digest is folded to
pub const STORE_PATH_HASH_BYTES: usize = 20;

/// Environment variable overriding the store directory
pub const ENV_STORE_DIR: &str = "FLAKELOCK_STORE_DIR";

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "FLAKELOCK_CONFIG_DIR";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
