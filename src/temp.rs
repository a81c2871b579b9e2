//! Scoped scratch directories for pristine snapshots and swap staging.
//!
//! Pristine snapshots live under the system temp base (they are only ever
//! read), while swap staging must be created *inside* the project root so the
//! final rename stays on a single filesystem. Both are `TempDir`-backed:
//! removal is guaranteed on every exit path, including errors.

use std::env;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;

/// Returns a directory path suitable for creating temporary directories.
/// Never returns a relative path, so scratch dirs are never created under the
/// current working directory (avoids repo/tmp when TMPDIR=tmp and cwd is the
/// repo).
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Create a scratch directory for a pristine snapshot.
///
/// The snapshot is read-only scratch; it is never renamed into the project,
/// so the system temp base is fine.
pub fn snapshot_dir() -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix("modpatch-snapshot-")
        .tempdir_in(temp_dir_base())?;
    Ok(dir)
}

/// Create a scratch directory inside the project root.
///
/// Fetched revisions destined for the working-copy swap must live on the same
/// filesystem as the working copy, or the atomic rename in the swap does not
/// hold.
pub fn staging_dir(project_root: &Path) -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix(".modpatch-staging-")
        .tempdir_in(project_root)?;
    Ok(dir)
}
