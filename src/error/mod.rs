//! Error types and handling for modpatch
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`manifest`]: Manifest load/persist errors
//! - [`patch`]: Patch file errors
//! - [`fetch`]: Remote fetch errors
//! - [`fs`]: File system errors
//!
//! Expected operational outcomes (a hunk conflict, an update that left the
//! working copy alone) are *not* errors; they are reported as
//! [`ApplyOutcome`](crate::patch::apply::ApplyOutcome) and
//! [`UpdateOutcome`](crate::update::UpdateOutcome) values the caller
//! branches on.

pub mod fetch;
pub mod fs;
pub mod manifest;
pub mod patch;

pub use fetch::failed as fetch_failed;
pub use fs::{read_failed as file_read_failed, write_failed as file_write_failed};
pub use manifest::{corruption as manifest_corruption, module_not_found};
pub use patch::{no_local_changes, parse_failed as patch_parse_failed};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for modpatch operations
#[derive(Error, Diagnostic, Debug)]
pub enum ModpatchError {
    // Patch generation outcomes
    #[error("Module '{module}' has no local changes")]
    #[diagnostic(
        code(modpatch::patch::no_local_changes),
        help(
            "The working copy matches the pristine files at the recorded revision; there is nothing to record"
        )
    )]
    NoLocalChanges { module: String },

    // Manifest errors
    #[error("Module '{module}' from '{remote}' is not in the manifest")]
    #[diagnostic(
        code(modpatch::manifest::module_not_found),
        help("Install the module before generating a patch or updating it")
    )]
    ModuleNotFound { remote: String, module: String },

    #[error("Manifest entry for module '{module}' is inconsistent: {reason}")]
    #[diagnostic(
        code(modpatch::manifest::corruption),
        help("The manifest must be repaired by hand; modpatch never guesses a repair")
    )]
    ManifestCorruption { module: String, reason: String },

    #[error("Failed to parse manifest: {path}")]
    #[diagnostic(code(modpatch::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    // Patch file errors
    #[error("Failed to parse patch file: {path}")]
    #[diagnostic(
        code(modpatch::patch::parse_failed),
        help("The patch file is not valid unified diff; regenerate it from the working copy")
    )]
    PatchParseFailed { path: String, reason: String },

    // Fetch errors
    #[error("Failed to fetch module '{module}' at revision '{revision}': {reason}")]
    #[diagnostic(
        code(modpatch::fetch::failed),
        help("Check that the remote is reachable and that the revision contains the module")
    )]
    FetchFailed {
        module: String,
        revision: String,
        reason: String,
    },

    // Working copy swap errors
    #[error("Failed to replace working copy at '{path}': {reason}")]
    #[diagnostic(code(modpatch::update::swap_failed))]
    SwapFailed { path: String, reason: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(modpatch::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}")]
    #[diagnostic(code(modpatch::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(modpatch::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(modpatch::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for ModpatchError {
    fn from(err: std::io::Error) -> Self {
        ModpatchError::IoError {
            message: err.to_string(),
        }
    }
}

/// Convenience result type for modpatch operations
pub type Result<T> = std::result::Result<T, ModpatchError>;
