//! Patch applier: apply a stored patch to a freshly fetched revision
//!
//! Application is evaluated per module as a single transaction. Every hunk of
//! every file is verified against in-memory buffers first; the target tree is
//! written only after the whole patch has been resolved, so it is either
//! fully patched or left untouched.
//!
//! A hunk is located by exact match of its old side (context plus removed
//! lines) at the recorded offset, adjusted for the drift of previously
//! applied hunks in the same file, then by a bounded outward search. Failure
//! to locate a hunk is an expected outcome (upstream changed the very lines
//! the patch touches), reported as [`ApplyOutcome::Conflict`], not an error.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::diff::{join_lines, split_lines};
use crate::error::{self, Result};
use crate::patch::{FilePatch, Hunk, Patch};

/// How far (in lines) a hunk's context may have drifted from its recorded
/// offset before the match is abandoned. Drift beyond this bound almost always
/// means the region was rewritten upstream, where a silent match would be
/// worse than a conflict.
pub const MAX_HUNK_DRIFT: usize = 200;

/// The first unresolvable hunk of a failed application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictInfo {
    /// Header path of the file the hunk belongs to
    pub file: String,
    /// 1-based first line of the hunk's old range
    pub old_start: usize,
    /// Number of old-side lines in the hunk
    pub old_count: usize,
}

impl ConflictInfo {
    fn for_hunk(file: &str, hunk: &Hunk) -> Self {
        Self {
            file: file.to_string(),
            old_start: hunk.old_start,
            old_count: hunk.old_count,
        }
    }
}

impl fmt::Display for ConflictInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: lines {}-{}",
            self.file,
            self.old_start,
            self.old_start + self.old_count.saturating_sub(1)
        )
    }
}

/// Result of a patch application attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Every hunk applied; the target tree has been rewritten
    Applied,
    /// A hunk could not be located; the target tree is untouched
    Conflict(ConflictInfo),
}

impl ApplyOutcome {
    /// Whether the patch applied in full
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }
}

enum StagedWrite {
    Write(PathBuf, String),
    Delete(PathBuf),
}

/// Apply `patch` to the module files in `target_dir`.
///
/// Patch headers carry project-root-relative paths; `module_prefix` is the
/// module's project-root-relative directory, stripped from each header to
/// address files inside `target_dir`.
pub fn try_apply(patch: &Patch, target_dir: &Path, module_prefix: &Path) -> Result<ApplyOutcome> {
    let mut staged = Vec::new();

    for file_patch in &patch.files {
        match stage_file(file_patch, target_dir, module_prefix)? {
            Ok(write) => staged.push(write),
            Err(conflict) => {
                log::debug!("patch does not apply: {conflict}");
                return Ok(ApplyOutcome::Conflict(conflict));
            }
        }
    }

    for write in staged {
        match write {
            StagedWrite::Write(path, content) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|e| error::file_write_failed(parent, e))?;
                }
                fs::write(&path, content).map_err(|e| error::file_write_failed(&path, e))?;
            }
            StagedWrite::Delete(path) => {
                fs::remove_file(&path).map_err(|e| error::file_write_failed(&path, e))?;
            }
        }
    }

    Ok(ApplyOutcome::Applied)
}

/// Resolve one file's hunks against the target, without writing anything.
/// The outer `Result` is for real I/O faults; the inner one distinguishes a
/// staged write from an expected conflict.
fn stage_file(
    file_patch: &FilePatch,
    target_dir: &Path,
    module_prefix: &Path,
) -> Result<std::result::Result<StagedWrite, ConflictInfo>> {
    let header = file_patch.header_path();
    let Ok(rel) = Path::new(header).strip_prefix(module_prefix) else {
        return Err(error::patch_parse_failed(
            Path::new(header),
            format!(
                "header path is outside the module directory '{}'",
                module_prefix.display()
            ),
        ));
    };
    let target = target_dir.join(rel);

    let Some(first_hunk) = file_patch.hunks.first() else {
        return Err(error::patch_parse_failed(
            Path::new(header),
            "file entry has no hunks",
        ));
    };

    if file_patch.is_file_addition() {
        if target.exists() {
            // Upstream now ships a file the patch wants to create
            return Ok(Err(ConflictInfo::for_hunk(header, first_hunk)));
        }
        let lines: Vec<String> = first_hunk
            .new_lines()
            .iter()
            .map(|l| (*l).to_string())
            .collect();
        return Ok(Ok(StagedWrite::Write(target, join_lines(&lines))));
    }

    if !target.exists() {
        // Upstream removed a file the patch modifies or removes
        return Ok(Err(ConflictInfo::for_hunk(header, first_hunk)));
    }
    let bytes = fs::read(&target).map_err(|e| error::file_read_failed(&target, e))?;
    let mut lines = split_lines(&String::from_utf8_lossy(&bytes));

    if file_patch.is_file_removal() {
        if lines != first_hunk.old_lines() {
            return Ok(Err(ConflictInfo::for_hunk(header, first_hunk)));
        }
        return Ok(Ok(StagedWrite::Delete(target)));
    }

    // Offsets of later hunks shift by the net line change of earlier ones
    let mut drift = 0isize;
    for hunk in &file_patch.hunks {
        let expected = hunk.old_start.saturating_sub(1) as isize + drift;
        let Some(position) = locate_hunk(&lines, hunk, expected) else {
            return Ok(Err(ConflictInfo::for_hunk(header, hunk)));
        };

        let old_len = hunk.old_lines().len();
        let replacement: Vec<String> = hunk.new_lines().iter().map(|l| (*l).to_string()).collect();
        let new_len = replacement.len();
        lines.splice(position..position + old_len, replacement);
        drift += new_len as isize - old_len as isize;
    }

    Ok(Ok(StagedWrite::Write(target, join_lines(&lines))))
}

/// Find the hunk's old side in `lines`: exact match at `expected` first, then
/// alternating outward offsets up to [`MAX_HUNK_DRIFT`].
fn locate_hunk(lines: &[String], hunk: &Hunk, expected: isize) -> Option<usize> {
    let old = hunk.old_lines();
    if old.is_empty() {
        // Pure insertion carries no anchor; trust the recorded offset
        let clamped = expected.clamp(0, lines.len() as isize) as usize;
        return Some(clamped);
    }

    let matches_at = |pos: isize| -> bool {
        if pos < 0 {
            return false;
        }
        let pos = pos as usize;
        pos + old.len() <= lines.len()
            && lines[pos..pos + old.len()]
                .iter()
                .map(String::as_str)
                .eq(old.iter().copied())
    };

    if matches_at(expected) {
        return Some(expected as usize);
    }
    for drift in 1..=MAX_HUNK_DRIFT as isize {
        if matches_at(expected + drift) {
            return Some((expected + drift) as usize);
        }
        if matches_at(expected - drift) {
            return Some((expected - drift) as usize);
        }
    }
    None
}
