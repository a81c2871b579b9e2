//! Update orchestrator
//!
//! Sequences fetch → patch-apply → swap → re-diff for a single module. All
//! risk-bearing work (fetch, hunk verification) happens against scratch
//! directories; the manifest and the working copy are only touched once the
//! whole update is known to succeed. A failed patch application leaves the
//! module at its old revision with its old patch intact, and the orchestrator
//! checks that by full-content digest rather than assuming it.

pub mod swap;


use std::fs;

use crate::error::{self, ModpatchError, Result};
use crate::fetch::ModuleFetcher;
use crate::fsops;
use crate::hash;
use crate::manifest::{ManifestStore, ModuleEntry, Remote};
use crate::patch::apply::{self, ApplyOutcome, ConflictInfo};
use crate::patch::{Patch, generate};
use crate::temp;
use crate::update::swap::SwapResult;

/// Terminal state of a module update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The working copy now holds the new revision (re-patched if a patch was
    /// recorded)
    Updated { revision: String },
    /// The swap could not complete and the previous working copy was
    /// restored; module state is unchanged
    Reverted { reason: String },
    /// The recorded patch does not apply to the new revision; working copy,
    /// manifest, and patch file are all unchanged
    Failed { conflict: ConflictInfo },
}

/// Update a module to `new_revision`, carrying its recorded patch across.
pub fn update(
    store: &mut ManifestStore,
    fetcher: &dyn ModuleFetcher,
    remote: &Remote,
    module: &str,
    new_revision: &str,
) -> Result<UpdateOutcome> {
    let entry = store.get_validated(remote, module)?.clone();
    let module_dir = store.module_dir(remote, module);
    let module_dir_rel = store.module_dir_rel(remote, module);

    // Digest before any risk-bearing work; failure paths verify against it
    let digest_before = hash::hash_directory(&module_dir)?;

    let scratch = temp::staging_dir(store.root())?;
    fetcher.fetch_module_files(remote, module, new_revision, scratch.path())?;

    if let Some(patch_rel) = entry.patch.clone().map(std::path::PathBuf::from) {
        let patch_abs = store.root().join(&patch_rel);
        let patch = Patch::load(&patch_abs)?;

        match apply::try_apply(&patch, scratch.path(), &module_dir_rel)? {
            ApplyOutcome::Conflict(conflict) => {
                let digest_after = hash::hash_directory(&module_dir)?;
                if digest_after != digest_before {
                    return Err(ModpatchError::SwapFailed {
                        path: module_dir.display().to_string(),
                        reason: "working copy changed during a failed update".to_string(),
                    });
                }
                log::info!("update of '{module}' failed: patch conflict at {conflict}");
                return Ok(UpdateOutcome::Failed { conflict });
            }
            ApplyOutcome::Applied => {}
        }

        // The swapped-in tree keeps the patch file; the refresh below
        // overwrites it with re-based hunk offsets
        carry_patch_file(&patch_abs, scratch.path())?;

        if let SwapResult::Restored { reason } =
            swap::replace_dir(&module_dir, scratch.path(), store.root())?
        {
            log::warn!("update of '{module}' reverted: {reason}");
            return Ok(UpdateOutcome::Reverted { reason });
        }

        record_new_revision(store, remote, module, new_revision, Some(patch_rel))?;
        refresh_patch(store, fetcher, remote, module)?;
    } else {
        if let SwapResult::Restored { reason } =
            swap::replace_dir(&module_dir, scratch.path(), store.root())?
        {
            log::warn!("update of '{module}' reverted: {reason}");
            return Ok(UpdateOutcome::Reverted { reason });
        }
        record_new_revision(store, remote, module, new_revision, None)?;
    }

    log::info!("updated module '{module}' to revision {new_revision}");
    Ok(UpdateOutcome::Updated {
        revision: new_revision.to_string(),
    })
}

/// Re-pin the entry at the new revision with the post-swap file list
fn record_new_revision(
    store: &mut ManifestStore,
    remote: &Remote,
    module: &str,
    revision: &str,
    patch: Option<std::path::PathBuf>,
) -> Result<()> {
    let module_dir = store.module_dir(remote, module);
    let files = fsops::list_module_files(&module_dir)?;
    let mut entry = ModuleEntry::new(revision, files);
    entry.patch = patch.map(|p| crate::manifest::unified_path(&p));
    store.set_entry(remote, module, entry);
    store.persist()
}

/// Regenerate the patch against the new revision (hunk offsets have likely
/// shifted). When upstream absorbed the local edits the diff comes back
/// empty; the stale patch file and its manifest reference are then cleared.
fn refresh_patch(
    store: &mut ManifestStore,
    fetcher: &dyn ModuleFetcher,
    remote: &Remote,
    module: &str,
) -> Result<()> {
    match generate::generate_patch(store, fetcher, remote, module) {
        Ok(_) => Ok(()),
        Err(ModpatchError::NoLocalChanges { .. }) => {
            if let Some(patch_rel) = store.patch_path(remote, module) {
                let patch_abs = store.root().join(&patch_rel);
                fs::remove_file(&patch_abs)
                    .map_err(|e| error::file_write_failed(&patch_abs, e))?;
            }
            store.set_patch_path(remote, module, None)?;
            store.persist()?;
            log::info!("local changes for '{module}' were absorbed upstream; patch dropped");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Copy the recorded patch file into the tree about to be swapped in
fn carry_patch_file(patch_abs: &std::path::Path, dest_dir: &std::path::Path) -> Result<()> {
    let dest = dest_dir.join(file_name_of(patch_abs));
    fs::copy(patch_abs, &dest).map_err(|e| error::file_write_failed(&dest, e))?;
    Ok(())
}

fn file_name_of(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
