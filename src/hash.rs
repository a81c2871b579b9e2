//! BLAKE3 hashing utilities for working-copy integrity
//!
//! The update orchestrator digests a module's working copy before any
//! risk-bearing work and re-digests it after a failed patch application, so a
//! "nothing was touched" guarantee is checked rather than assumed.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;
use walkdir::WalkDir;

use crate::error::{self, Result};
use crate::manifest::MANIFEST_FILE;

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

fn hash_file_into(hasher: &mut Hasher, path: &Path) -> Result<()> {
    let file = File::open(path).map_err(|e| error::file_read_failed(path, e))?;
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| error::file_read_failed(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(())
}

/// Calculate BLAKE3 hash of a file
pub fn hash_file(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    hash_file_into(&mut hasher, path)?;
    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

/// Calculate BLAKE3 hash of a directory's contents
///
/// Hashes all files in the directory recursively, sorted by relative path so
/// the result is deterministic. Relative paths are mixed into the digest, so
/// renames change the hash even when contents do not. A file named like the
/// manifest is skipped: the digest tracks module content, not bookkeeping.
pub fn hash_directory(path: &Path) -> Result<String> {
    if !path.is_dir() {
        return Err(error::fs::not_found(path));
    }

    let mut files: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name() != std::ffi::OsStr::new(MANIFEST_FILE))
        .collect();
    files.sort_by_key(|e| e.path().to_path_buf());

    let mut hasher = Hasher::new();
    for entry in files {
        let file_path = entry.path();
        let relative_path = file_path
            .strip_prefix(path)
            .unwrap_or(file_path)
            .to_string_lossy();
        hasher.update(relative_path.as_bytes());
        hasher.update(b"\0");
        hash_file_into(&mut hasher, file_path)?;
        hasher.update(b"\0");
    }

    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");
        std::fs::write(&file_path, "test content").unwrap();

        let hash = hash_file(&file_path).unwrap();
        assert!(hash.starts_with(HASH_PREFIX));
    }

    #[test]
    fn test_hash_file_not_found() {
        let result = hash_file(Path::new("/nonexistent/file.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_hash_directory_deterministic() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "aaa").unwrap();
        std::fs::create_dir(temp.path().join("subdir")).unwrap();
        std::fs::write(temp.path().join("subdir/b.txt"), "bbb").unwrap();

        let hash1 = hash_directory(temp.path()).unwrap();
        let hash2 = hash_directory(temp.path()).unwrap();
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_directory_detects_content_change() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "aaa").unwrap();
        let before = hash_directory(temp.path()).unwrap();

        std::fs::write(temp.path().join("a.txt"), "AAA").unwrap();
        let after = hash_directory(temp.path()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_hash_directory_ignores_manifest_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("main.nf"), "process A {}\n").unwrap();
        let before = hash_directory(temp.path()).unwrap();

        std::fs::write(temp.path().join(MANIFEST_FILE), "{}\n").unwrap();
        let after = hash_directory(temp.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_hash_directory_detects_rename() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "same").unwrap();
        let before = hash_directory(temp.path()).unwrap();

        std::fs::rename(temp.path().join("a.txt"), temp.path().join("b.txt")).unwrap();
        let after = hash_directory(temp.path()).unwrap();
        assert_ne!(before, after);
    }
}
