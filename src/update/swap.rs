//! Atomic working-copy replacement
//!
//! The swap renames the old working copy into project-local staging, then
//! renames the incoming tree into place. Renames are atomic within one
//! filesystem, and both directories sit under the project root, so the
//! working copy is never observable in a mixed state. If the second rename
//! fails the backup is renamed back, restoring the pre-swap tree.

use std::fs;
use std::path::Path;

use crate::error::{self, Result};
use crate::temp;

/// How a swap attempt left the working copy
#[derive(Debug)]
pub enum SwapResult {
    /// The incoming tree is now the working copy
    Replaced,
    /// The swap failed and the previous working copy was restored
    Restored { reason: String },
}

/// Replace `working_dir` with `incoming_dir`.
///
/// `incoming_dir` must live on the same filesystem as the working copy (the
/// update orchestrator stages it under the project root). Returns an error
/// only when the working copy could not be restored either, the one state
/// that needs manual attention.
pub fn replace_dir(
    working_dir: &Path,
    incoming_dir: &Path,
    project_root: &Path,
) -> Result<SwapResult> {
    let backup = temp::staging_dir(project_root)?;
    let backup_slot = backup.path().join("previous");

    if working_dir.exists() {
        fs::rename(working_dir, &backup_slot).map_err(|e| error::ModpatchError::SwapFailed {
            path: working_dir.display().to_string(),
            reason: format!("failed to move working copy aside: {e}"),
        })?;
    }
    if let Some(parent) = working_dir.parent() {
        fs::create_dir_all(parent).map_err(|e| error::file_write_failed(parent, e))?;
    }

    match fs::rename(incoming_dir, working_dir) {
        Ok(()) => Ok(SwapResult::Replaced),
        Err(swap_err) => {
            if backup_slot.exists() {
                fs::rename(&backup_slot, working_dir).map_err(|restore_err| {
                    error::ModpatchError::SwapFailed {
                        path: working_dir.display().to_string(),
                        reason: format!(
                            "swap failed ({swap_err}) and restore failed ({restore_err})"
                        ),
                    }
                })?;
            }
            Ok(SwapResult::Restored {
                reason: swap_err.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_replace_existing_dir() {
        let root = TempDir::new().unwrap();
        let working = root.path().join("modules/org/mod");
        std::fs::create_dir_all(&working).unwrap();
        std::fs::write(working.join("main.nf"), "old\n").unwrap();

        let incoming = root.path().join("incoming");
        std::fs::create_dir_all(&incoming).unwrap();
        std::fs::write(incoming.join("main.nf"), "new\n").unwrap();

        let result = replace_dir(&working, &incoming, root.path()).unwrap();
        assert!(matches!(result, SwapResult::Replaced));
        assert_eq!(
            std::fs::read_to_string(working.join("main.nf")).unwrap(),
            "new\n"
        );
        assert!(!incoming.exists());
    }

    #[test]
    fn test_replace_missing_working_dir() {
        let root = TempDir::new().unwrap();
        let working = root.path().join("modules/org/new-mod");

        let incoming = root.path().join("incoming");
        std::fs::create_dir_all(&incoming).unwrap();
        std::fs::write(incoming.join("main.nf"), "new\n").unwrap();

        let result = replace_dir(&working, &incoming, root.path()).unwrap();
        assert!(matches!(result, SwapResult::Replaced));
        assert!(working.join("main.nf").exists());
    }

    #[test]
    fn test_failed_swap_restores_backup() {
        let root = TempDir::new().unwrap();
        let working = root.path().join("modules/org/mod");
        std::fs::create_dir_all(&working).unwrap();
        std::fs::write(working.join("main.nf"), "old\n").unwrap();

        // Incoming path does not exist, so the forward rename fails
        let incoming = root.path().join("no-such-dir");
        let result = replace_dir(&working, &incoming, root.path()).unwrap();
        assert!(matches!(result, SwapResult::Restored { .. }));
        assert_eq!(
            std::fs::read_to_string(working.join("main.nf")).unwrap(),
            "old\n"
        );
    }
}
