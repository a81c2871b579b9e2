//! Manifest errors

use std::path::Path;

use super::ModpatchError;

/// Creates a manifest corruption error for a single module entry
pub fn corruption(module: impl Into<String>, reason: impl Into<String>) -> ModpatchError {
    ModpatchError::ManifestCorruption {
        module: module.into(),
        reason: reason.into(),
    }
}

/// Creates a module-not-found error
pub fn module_not_found(remote: impl Into<String>, module: impl Into<String>) -> ModpatchError {
    ModpatchError::ModuleNotFound {
        remote: remote.into(),
        module: module.into(),
    }
}

/// Creates a manifest parse error
pub fn parse_failed(path: &Path, err: impl std::fmt::Display) -> ModpatchError {
    ModpatchError::ManifestParseFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
