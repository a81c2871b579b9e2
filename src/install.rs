//! Module installation
//!
//! Install is deliberately thin (fetch and copy) but it begins the
//! [`ModuleEntry`](crate::manifest::ModuleEntry) lifecycle the patch and
//! update operations build on: revision pinned, file list recorded, no patch.

use std::fs;

use crate::error::{self, Result};
use crate::fetch::ModuleFetcher;
use crate::fsops;
use crate::manifest::{ManifestStore, ModuleEntry, Remote};
use crate::temp;

/// Install (or force-reinstall) a module at a pinned revision.
///
/// Fetches into project-local staging first, so a failed fetch leaves neither
/// the module directory nor the manifest touched.
pub fn install(
    store: &mut ManifestStore,
    fetcher: &dyn ModuleFetcher,
    remote: &Remote,
    module: &str,
    revision: &str,
) -> Result<()> {
    let staging = temp::staging_dir(store.root())?;
    fetcher.fetch_module_files(remote, module, revision, staging.path())?;

    let module_dir = store.module_dir(remote, module);
    if module_dir.exists() {
        fs::remove_dir_all(&module_dir).map_err(|e| error::file_write_failed(&module_dir, e))?;
    }
    if let Some(parent) = module_dir.parent() {
        fs::create_dir_all(parent).map_err(|e| error::file_write_failed(parent, e))?;
    }
    fs::rename(staging.path(), &module_dir)
        .map_err(|e| error::file_write_failed(&module_dir, e))?;

    let files = fsops::list_module_files(&module_dir)?;
    store.set_entry(remote, module, ModuleEntry::new(revision, files));
    store.persist()?;

    log::info!("installed module '{module}' at revision {revision}");
    Ok(())
}
