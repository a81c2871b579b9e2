//! Patch generator: record local modifications as a patch file
//!
//! Materializes a pristine snapshot of the module at its recorded revision,
//! diffs it against the working copy, and persists the result as the module's
//! single deterministic patch file, recording the path in the manifest.

use std::fs;

use crate::diff;
use crate::error::{self, Result};
use crate::fetch::ModuleFetcher;
use crate::fsops;
use crate::manifest::{ManifestStore, Remote};
use crate::patch::{Patch, patch_file_name};
use crate::temp;

/// Generate (or regenerate) the patch for an installed module.
///
/// Zero hunks is the reportable
/// [`NoLocalChanges`](crate::error::ModpatchError::NoLocalChanges) condition:
/// no patch file is written, and any previously recorded patch path is left
/// untouched. A pure nothing-to-do check, not a revert.
///
/// On success exactly one file under the module directory is created or
/// overwritten, its path is recorded in the manifest, and the manifest is
/// persisted before returning.
pub fn generate_patch(
    store: &mut ManifestStore,
    fetcher: &dyn ModuleFetcher,
    remote: &Remote,
    module: &str,
) -> Result<Patch> {
    let entry = store.get_validated(remote, module)?.clone();
    let module_dir_rel = store.module_dir_rel(remote, module);
    let module_dir = store.module_dir(remote, module);

    let snapshot = temp::snapshot_dir()?;
    fetcher.fetch_module_files(remote, module, &entry.git_sha, snapshot.path())?;

    // Union of the recorded file list and the working directory: files the
    // user added locally must surface as whole-file addition hunks. The patch
    // file itself is never part of its own diff.
    let patch_name = patch_file_name(module);
    let mut files = entry.installed_files.clone();
    if module_dir.is_dir() {
        files.extend(fsops::list_module_files(&module_dir)?);
    }
    files.retain(|f| *f != patch_name);

    let patch = diff::diff_trees(snapshot.path(), &module_dir, &files, &module_dir_rel)?;
    if patch.is_empty() {
        return Err(error::no_local_changes(module));
    }

    let patch_rel = module_dir_rel.join(&patch_name);
    let patch_abs = store.root().join(&patch_rel);
    fs::write(&patch_abs, patch.render()).map_err(|e| error::file_write_failed(&patch_abs, e))?;

    store.set_patch_path(remote, module, Some(patch_rel))?;
    store.persist()?;

    log::info!(
        "recorded {} hunk(s) for module '{module}' in {patch_name}",
        patch.hunk_count()
    );
    Ok(patch)
}
