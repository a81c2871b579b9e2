//! Manifest store (modules.json)
//!
//! The manifest is the project's single source of truth for "what revision of
//! what module is installed, with what local deviation". It is owned
//! exclusively by [`ManifestStore`]; every other component reads and writes it
//! through the store's accessors, never by direct file access.
//!
//! Mutations operate on the in-memory copy; [`ManifestStore::persist`] is the
//! only durability point and writes the whole manifest atomically
//! (write-to-temp-then-rename), so a crash mid-write never leaves a
//! half-written manifest behind.

pub mod entry;


use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};

pub use entry::{ModuleEntry, Remote, RepoEntry};

/// Manifest file name at the project root
pub const MANIFEST_FILE: &str = "modules.json";

/// Directory below the project root all modules install under
pub const MODULES_DIR: &str = "modules";

/// The full mapping from remote to module path to [`ModuleEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Remote URL -> installed modules, ordered for deterministic output
    #[serde(default)]
    pub repos: BTreeMap<String, RepoEntry>,
}

/// Owner of the manifest for one project root.
///
/// Holds the project root and the in-memory [`Manifest`]; all operations in
/// this crate take the store as an explicit parameter, never through ambient
/// state.
#[derive(Debug)]
pub struct ManifestStore {
    root: PathBuf,
    manifest: Manifest,
}

impl ManifestStore {
    /// Load the manifest from a project root.
    ///
    /// A missing manifest file yields an empty manifest; a present but
    /// unparsable one is an error. Per-entry invariants are checked lazily by
    /// [`ManifestStore::get_validated`], so corruption stays fatal for the
    /// affected module only.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        let manifest = if path.exists() {
            let content =
                fs::read_to_string(&path).map_err(|e| error::file_read_failed(&path, e))?;
            serde_json::from_str(&content).map_err(|e| error::manifest::parse_failed(&path, e))?
        } else {
            Manifest::default()
        };

        Ok(Self {
            root: root.to_path_buf(),
            manifest,
        })
    }

    /// The project root this store was loaded from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read access to the in-memory manifest
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Absolute path of the manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Project-root-relative directory a module installs into
    /// (`modules/<repo_name>/<module>`)
    pub fn module_dir_rel(&self, remote: &Remote, module: &str) -> PathBuf {
        let mut dir = PathBuf::from(MODULES_DIR).join(remote.repo_name());
        for part in module.split('/') {
            dir.push(part);
        }
        dir
    }

    /// Absolute directory a module installs into
    pub fn module_dir(&self, remote: &Remote, module: &str) -> PathBuf {
        self.root.join(self.module_dir_rel(remote, module))
    }

    /// Look up a module entry
    pub fn get(&self, remote: &Remote, module: &str) -> Option<&ModuleEntry> {
        self.manifest
            .repos
            .get(&remote.url)
            .and_then(|repo| repo.modules.get(module))
    }

    /// Look up a module entry, failing on a missing module or on an entry
    /// that violates the patch-reference invariant
    pub fn get_validated(&self, remote: &Remote, module: &str) -> Result<&ModuleEntry> {
        let entry = self
            .get(remote, module)
            .ok_or_else(|| error::module_not_found(&remote.url, module))?;
        entry.validate(module, &self.module_dir_rel(remote, module))?;
        Ok(entry)
    }

    /// Insert or replace a module entry
    pub fn set_entry(&mut self, remote: &Remote, module: &str, entry: ModuleEntry) {
        let repo = self.manifest.repos.entry(remote.url.clone()).or_default();
        repo.branch = remote.branch.clone();
        repo.modules.insert(module.to_string(), entry);
    }

    /// The module's recorded patch path (project-root relative), if any
    pub fn patch_path(&self, remote: &Remote, module: &str) -> Option<PathBuf> {
        self.get(remote, module)
            .and_then(|entry| entry.patch.as_ref())
            .map(PathBuf::from)
    }

    /// Record or clear the module's patch path.
    ///
    /// Keeps the installed file list in step: the patch file name joins the
    /// list when a path is recorded and leaves it when the path is cleared,
    /// preserving the `{files} == {original} ∪ {patch}` invariant.
    pub fn set_patch_path(
        &mut self,
        remote: &Remote,
        module: &str,
        path: Option<PathBuf>,
    ) -> Result<()> {
        let previous = self
            .get(remote, module)
            .ok_or_else(|| error::module_not_found(&remote.url, module))?
            .patch
            .clone();

        // Checked above
        let Some(repo) = self.manifest.repos.get_mut(&remote.url) else {
            return Err(error::module_not_found(&remote.url, module));
        };
        let Some(entry) = repo.modules.get_mut(module) else {
            return Err(error::module_not_found(&remote.url, module));
        };

        if let Some(prev) = previous {
            let prev_name = Path::new(&prev)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            entry.installed_files.retain(|f| *f != prev_name);
        }

        match path {
            Some(p) => {
                let file_name = p
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                if !entry.installed_files.iter().any(|f| *f == file_name) {
                    entry.installed_files.push(file_name);
                    entry.installed_files.sort();
                }
                entry.patch = Some(unified_path(&p));
            }
            None => entry.patch = None,
        }

        Ok(())
    }

    /// Write the whole manifest atomically (write-to-temp-then-rename).
    pub fn persist(&self) -> Result<()> {
        let path = self.manifest_path();
        let mut content = serde_json::to_string_pretty(&self.manifest)
            .map_err(|e| error::file_write_failed(&path, e))?;
        content.push('\n');

        let tmp = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(|e| error::file_write_failed(&path, e))?;
        fs::write(tmp.path(), content).map_err(|e| error::file_write_failed(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| error::file_write_failed(&path, e))?;

        log::debug!("persisted manifest at {}", path.display());
        Ok(())
    }
}

/// Render a relative path with `/` separators regardless of platform, so
/// manifest and patch content is byte-identical everywhere.
pub(crate) fn unified_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
