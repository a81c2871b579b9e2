//! modpatch - patch-aware updates for vendored, versioned modules
//!
//! Manages reusable modules vendored into a project from a remote component
//! repository while letting local, persisted modifications survive upstream
//! updates. Local edits to an installed module are recorded as a portable
//! unified-diff patch, the association lives in a `modules.json` manifest,
//! and updating the module to a new revision re-applies the stored patch with
//! well-defined success, failure, and rollback semantics.
//!
//! The crate is the engine only: callers (a CLI or automation layer) drive it
//! through [`install`], [`generate_patch`], and [`update`], with every
//! operation taking the project's [`ManifestStore`] and a [`ModuleFetcher`]
//! explicitly; there is no ambient state.

pub mod diff;
pub mod error;
pub mod fetch;
pub mod fsops;
pub mod hash;
pub mod install;
pub mod manifest;
pub mod patch;
pub mod temp;
pub mod update;

pub use error::{ModpatchError, Result};
pub use fetch::{DirFetcher, ModuleFetcher};
pub use install::install;
pub use manifest::{Manifest, ManifestStore, ModuleEntry, Remote};
pub use patch::apply::{ApplyOutcome, ConflictInfo, MAX_HUNK_DRIFT, try_apply};
pub use patch::generate::generate_patch;
pub use patch::{Patch, patch_file_name};
pub use update::{UpdateOutcome, update};
