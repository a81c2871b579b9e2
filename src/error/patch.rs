//! Patch file errors

use std::path::Path;

use super::ModpatchError;

/// Creates a patch parse error
pub fn parse_failed(path: &Path, reason: impl Into<String>) -> ModpatchError {
    ModpatchError::PatchParseFailed {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Creates a no-local-changes outcome for a module
pub fn no_local_changes(module: impl Into<String>) -> ModpatchError {
    ModpatchError::NoLocalChanges {
        module: module.into(),
    }
}
