//! Shared fixtures for the integration tests
//!
//! A scratch project directory, known revisions and hashes, and a sample
//! lock document in the exact formatting `LockFile` writes.

use std::path::PathBuf;
use tempfile::TempDir;

/// Scratch project directory, removed on drop
pub struct TestProject {
    root: TempDir,
}

impl TestProject {
    /// Empty project
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Project root
    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// Write `content` to `name` under the root, creating directories
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.root.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Project whose `flake.lock` holds `content`
    #[allow(dead_code)]
    pub fn with_lock_file(self, content: &str) -> Self {
        self.create_file("flake.lock", content);
        self
    }

    /// Whether `name` exists under the root
    pub fn file_exists(&self, name: &str) -> bool {
        self.root.path().join(name).exists()
    }

    /// Contents of `name` under the root
    #[allow(dead_code)]
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.root.path().join(name)).expect("Failed to read file")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Route `tracing` output through the test harness
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Pinned revisions used across tests
pub const REV_A: &str = "a5f5ae2e4a7bde1c9e10a6d7a1b8e3f2c4d6e8f0";
#[allow(dead_code)]
pub const REV_B: &str = "b6e6bf3f5b8cef2d0f21b7e8b2c9f4e3d5e7f9a1";
#[allow(dead_code)]
pub const REV_C: &str = "c7f7c04f6c9df03e1f32c8f9c3d0f5f4e6f8f0b2";

/// SRI hash of `sha256("hello")`
pub const HELLO_SRI: &str = "sha256-LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ=";

/// Recursive `source` store path for [`HELLO_SRI`] under `/nix/store`
#[allow(dead_code)]
pub const HELLO_SOURCE_PATH: &str = "/nix/store/zkhxzz513cccjis93q2xa1kwr3q4rq7l-source";

/// Sample lock file with one nested input
#[allow(dead_code)]
pub const SAMPLE_LOCK: &str = r#"{
    "inputs": {
        "nixpkgs": {
            "inputs": {
                "utils": {
                    "inputs": {},
                    "narHash": "sha256-LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ=",
                    "originalUrl": "github:numtide/flake-utils",
                    "url": "github:numtide/flake-utils/b6e6bf3f5b8cef2d0f21b7e8b2c9f4e3d5e7f9a1"
                }
            },
            "narHash": "sha256-LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ=",
            "originalUrl": "github:NixOS/nixpkgs",
            "url": "github:NixOS/nixpkgs/a5f5ae2e4a7bde1c9e10a6d7a1b8e3f2c4d6e8f0"
        }
    },
    "version": 3
}
"#;
