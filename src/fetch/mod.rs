//! Remote fetch collaborator
//!
//! Fetching is the subsystem's only external dependency: something that can
//! deposit a module's files at a given revision into a destination directory.
//! Failures here are [`FetchFailed`](crate::error::ModpatchError::FetchFailed),
//! distinct from patch and update outcomes, and always raised before any
//! local state is mutated.

pub mod dir;

use std::path::Path;

use crate::error::Result;
use crate::manifest::Remote;

pub use dir::DirFetcher;

/// Source of module files at pinned revisions.
pub trait ModuleFetcher {
    /// Deposit the files of `module` at `revision` into `dest_dir`.
    ///
    /// `dest_dir` exists and is empty; after a successful call it holds the
    /// module's files directly (no intermediate directories).
    fn fetch_module_files(
        &self,
        remote: &Remote,
        module: &str,
        revision: &str,
        dest_dir: &Path,
    ) -> Result<()>;
}
