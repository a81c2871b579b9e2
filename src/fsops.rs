//! Small file tree operations shared by install, update, and fetch

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{self, Result};
use crate::manifest::unified_path;

/// List a module directory's files as sorted, `/`-separated relative paths
pub fn list_module_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(error::fs::not_found(dir));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| error::file_read_failed(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        files.push(unified_path(rel));
    }
    files.sort();
    Ok(files)
}

/// Copy a directory tree into an existing destination directory
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| error::file_read_failed(src, e))?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| error::file_write_failed(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| error::file_write_failed(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| error::file_write_failed(&target, e))?;
        }
    }
    Ok(())
}
