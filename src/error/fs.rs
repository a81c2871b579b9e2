//! File system errors

use std::path::Path;

use super::ModpatchError;

/// Creates a file-not-found error
pub fn not_found(path: &Path) -> ModpatchError {
    ModpatchError::FileNotFound {
        path: path.display().to_string(),
    }
}

/// Creates a file read error
pub fn read_failed(path: &Path, err: impl std::fmt::Display) -> ModpatchError {
    ModpatchError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a file write error
pub fn write_failed(path: &Path, err: impl std::fmt::Display) -> ModpatchError {
    ModpatchError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
