//! `ModuleEntry` and `Remote` types for the manifest
//!
//! One `ModuleEntry` per (remote, module path) pair installed into a project.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};

/// A remote component repository plus the branch modules are tracked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    /// Repository URL (https, scp-style, or a local path for dir mirrors)
    pub url: String,

    /// Branch the modules are tracked against, if pinned
    pub branch: Option<String>,
}

impl Remote {
    /// Create a new remote
    pub fn new(url: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            url: url.into(),
            branch,
        }
    }

    /// Derive the `org/repo` directory name modules from this remote install
    /// under (`modules/<repo_name>/<module>`).
    ///
    /// Scheme and host are stripped from URLs, the host from scp-style
    /// addresses, and a trailing `.git`. Local paths keep their last two
    /// components.
    pub fn repo_name(&self) -> String {
        let trimmed = self.url.trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let path = if let Some((_, rest)) = trimmed.split_once("://") {
            // https://host/org/repo -> org/repo
            rest.split_once('/').map_or(rest, |(_, p)| p)
        } else if let Some((_, p)) = trimmed.split_once(':') {
            // git@host:org/repo -> org/repo
            p
        } else {
            trimmed.trim_start_matches('/')
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() > 2 {
            segments[segments.len() - 2..].join("/")
        } else {
            segments.join("/")
        }
    }
}

/// One installed module: its pinned revision, the files it installed, and the
/// optional patch recording local modifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Content-addressable revision the module files were fetched at
    pub git_sha: String,

    /// Installed file paths relative to the module directory, sorted
    pub installed_files: Vec<String>,

    /// Project-root-relative path of the module's patch file, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

impl ModuleEntry {
    /// Create a new entry for a freshly installed module (no patch)
    pub fn new(git_sha: impl Into<String>, mut installed_files: Vec<String>) -> Self {
        installed_files.sort();
        Self {
            git_sha: git_sha.into(),
            installed_files,
            patch: None,
        }
    }

    /// Validate the patch-reference invariant: a recorded patch path must sit
    /// beneath the module's directory and its file name must be one of the
    /// module's installed files.
    pub fn validate(&self, module: &str, module_dir_rel: &Path) -> Result<()> {
        let Some(patch) = &self.patch else {
            return Ok(());
        };

        let patch_path = Path::new(patch);
        if !patch_path.starts_with(module_dir_rel) {
            return Err(error::manifest_corruption(
                module,
                format!("patch path '{patch}' is not under the module directory"),
            ));
        }

        let file_name = patch_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if !self.installed_files.iter().any(|f| *f == file_name) {
            return Err(error::manifest_corruption(
                module,
                format!("patch file '{file_name}' is not in the installed file list"),
            ));
        }

        Ok(())
    }
}

/// All modules installed from a single remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    /// Branch the remote is tracked against, if pinned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Module path -> entry, ordered for deterministic serialization
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleEntry>,
}
