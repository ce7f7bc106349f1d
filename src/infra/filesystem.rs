//! Filesystem operations
//!
//! Whole-file reads and writes used at the lock file boundary.

use std::path::Path;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|error| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error,
    })
}

/// Write content to a file, creating missing parent directories first
///
/// The file is overwritten unconditionally.
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|error| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error,
    })
}

/// Read content from a file
///
/// Returns `Ok(None)` when nothing exists at `path`. Content that is not
/// UTF-8 is a read error.
pub fn read_file_if_exists(path: &Path) -> Result<Option<String>, FilesystemError> {
    absent_as_none(path, std::fs::read_to_string(path))
}

/// Read raw bytes from a file
///
/// Returns `Ok(None)` when nothing exists at `path`. The bytes are not
/// decoded, so only storage failures are errors.
pub fn read_bytes_if_exists(path: &Path) -> Result<Option<Vec<u8>>, FilesystemError> {
    absent_as_none(path, std::fs::read(path))
}

fn absent_as_none<T>(path: &Path, result: std::io::Result<T>) -> Result<Option<T>, FilesystemError> {
    match result {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(FilesystemError::ReadFile {
            path: path.to_path_buf(),
            error,
        }),
    }
}
