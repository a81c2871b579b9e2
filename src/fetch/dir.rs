//! Directory-mirror fetcher
//!
//! Serves module files from a local mirror laid out as
//! `<mirror>/<revision>/<module-path>/...`, one snapshot directory per
//! revision. Used for offline mirrors and as the fixture fetcher in tests;
//! network-backed fetchers implement the same trait outside this crate.

use std::path::{Path, PathBuf};

use crate::error::{self, Result};
use crate::fetch::ModuleFetcher;
use crate::fsops;
use crate::manifest::Remote;

/// Fetcher backed by a revision-per-directory local mirror
#[derive(Debug, Clone)]
pub struct DirFetcher {
    mirror: PathBuf,
}

impl DirFetcher {
    /// Create a fetcher over a mirror root
    pub fn new(mirror: impl Into<PathBuf>) -> Self {
        Self {
            mirror: mirror.into(),
        }
    }
}

impl ModuleFetcher for DirFetcher {
    fn fetch_module_files(
        &self,
        _remote: &Remote,
        module: &str,
        revision: &str,
        dest_dir: &Path,
    ) -> Result<()> {
        let mut src = self.mirror.join(revision);
        for part in module.split('/') {
            src.push(part);
        }
        if !src.is_dir() {
            return Err(error::fetch_failed(
                module,
                revision,
                format!("no files at '{}' in the mirror", src.display()),
            ));
        }
        fsops::copy_dir_recursive(&src, dest_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn remote() -> Remote {
        Remote::new("/srv/mirrors/org/repo", None)
    }

    #[test]
    fn test_fetch_known_revision() {
        let mirror = TempDir::new().unwrap();
        let module_dir = mirror.path().join("abc123/tool/align");
        std::fs::create_dir_all(&module_dir).unwrap();
        std::fs::write(module_dir.join("main.nf"), "process X {}\n").unwrap();

        let dest = TempDir::new().unwrap();
        let fetcher = DirFetcher::new(mirror.path());
        fetcher
            .fetch_module_files(&remote(), "tool/align", "abc123", dest.path())
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.path().join("main.nf")).unwrap(),
            "process X {}\n"
        );
    }

    #[test]
    fn test_fetch_unknown_revision_fails() {
        let mirror = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let fetcher = DirFetcher::new(mirror.path());
        let result = fetcher.fetch_module_files(&remote(), "tool/align", "missing", dest.path());
        assert!(matches!(
            result,
            Err(crate::error::ModpatchError::FetchFailed { .. })
        ));
        // Nothing was deposited
        assert!(std::fs::read_dir(dest.path()).unwrap().next().is_none());
    }
}
