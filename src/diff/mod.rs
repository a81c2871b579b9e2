//! Diff engine: unified diff between two directory trees
//!
//! Compares each listed file across a pristine and a working tree, line by
//! line, producing standard unified-diff hunks with a fixed 3-line context
//! window. Files present in only one tree become whole-file add/remove hunks.
//!
//! Determinism: files are processed in lexical path order and hunks in
//! position order, so identical inputs always produce identical bytes;
//! patch files must not churn under version control.


use std::fs;
use std::path::Path;

use similar::{Algorithm, DiffOp, capture_diff_slices, group_diff_ops};

use crate::error::{self, Result};
use crate::manifest::unified_path;
use crate::patch::{DEV_NULL, FilePatch, Hunk, Patch, PatchLine};

/// Context window around each hunk, matching common patch-file conventions
pub const CONTEXT_LINES: usize = 3;

/// Diff the listed files of two trees.
///
/// `header_prefix` is the project-root-relative directory both trees stand
/// for; file headers are written as `<header_prefix>/<file>` with `/`
/// separators.
pub fn diff_trees(
    pristine_dir: &Path,
    working_dir: &Path,
    files: &[String],
    header_prefix: &Path,
) -> Result<Patch> {
    let mut sorted: Vec<&String> = files.iter().collect();
    sorted.sort();
    sorted.dedup();

    let prefix = unified_path(header_prefix);
    let mut out = Vec::new();

    for file in sorted {
        let header = format!("{prefix}/{file}");
        let pristine = read_lines(&pristine_dir.join(file))?;
        let working = read_lines(&working_dir.join(file))?;

        let file_patch = match (pristine, working) {
            (None, None) => None,
            (Some(old), Some(new)) => diff_file(&old, &new, &header),
            (Some(old), None) => Some(remove_file(&old, &header)),
            (None, Some(new)) => Some(add_file(&new, &header)),
        };
        if let Some(fp) = file_patch {
            out.push(fp);
        }
    }

    Ok(Patch { files: out })
}

/// Read a file as lines, or `None` when it does not exist.
///
/// Content is read lossily as UTF-8 and normalized to `\n`; a trailing
/// newline is implied on every non-empty file.
fn read_lines(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|e| error::file_read_failed(path, e))?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(Some(split_lines(&content)))
}

/// Split content into lines without trailing newlines
pub(crate) fn split_lines(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    let trimmed = content.strip_suffix('\n').unwrap_or(content);
    trimmed.split('\n').map(str::to_string).collect()
}

/// Join lines back into file content with a trailing newline
pub(crate) fn join_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut content = lines.join("\n");
    content.push('\n');
    content
}

fn diff_file(old: &[String], new: &[String], header: &str) -> Option<FilePatch> {
    let ops = capture_diff_slices(Algorithm::Myers, old, new);
    let grouped = group_diff_ops(ops, CONTEXT_LINES);
    if grouped.is_empty() {
        return None;
    }

    let hunks = grouped
        .into_iter()
        .map(|group| hunk_from_group(old, new, &group))
        .collect();
    Some(FilePatch {
        old_path: header.to_string(),
        new_path: header.to_string(),
        hunks,
    })
}

fn hunk_from_group(old: &[String], new: &[String], group: &[DiffOp]) -> Hunk {
    let mut lines = Vec::new();
    let mut old_count = 0usize;
    let mut new_count = 0usize;

    for op in group {
        match *op {
            DiffOp::Equal {
                old_index, len, ..
            } => {
                for line in &old[old_index..old_index + len] {
                    lines.push(PatchLine::Context(line.clone()));
                }
                old_count += len;
                new_count += len;
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                for line in &old[old_index..old_index + old_len] {
                    lines.push(PatchLine::Removed(line.clone()));
                }
                old_count += old_len;
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                for line in &new[new_index..new_index + new_len] {
                    lines.push(PatchLine::Added(line.clone()));
                }
                new_count += new_len;
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                for line in &old[old_index..old_index + old_len] {
                    lines.push(PatchLine::Removed(line.clone()));
                }
                for line in &new[new_index..new_index + new_len] {
                    lines.push(PatchLine::Added(line.clone()));
                }
                old_count += old_len;
                new_count += new_len;
            }
        }
    }

    let old_index = group.first().map_or(0, |op| op.old_range().start);
    let new_index = group.first().map_or(0, |op| op.new_range().start);
    Hunk {
        old_start: if old_count == 0 { old_index } else { old_index + 1 },
        old_count,
        new_start: if new_count == 0 { new_index } else { new_index + 1 },
        new_count,
        lines,
    }
}

fn add_file(new: &[String], header: &str) -> FilePatch {
    FilePatch {
        old_path: DEV_NULL.to_string(),
        new_path: header.to_string(),
        hunks: vec![Hunk {
            old_start: 0,
            old_count: 0,
            new_start: if new.is_empty() { 0 } else { 1 },
            new_count: new.len(),
            lines: new.iter().map(|l| PatchLine::Added(l.clone())).collect(),
        }],
    }
}

fn remove_file(old: &[String], header: &str) -> FilePatch {
    FilePatch {
        old_path: header.to_string(),
        new_path: DEV_NULL.to_string(),
        hunks: vec![Hunk {
            old_start: if old.is_empty() { 0 } else { 1 },
            old_count: old.len(),
            new_start: 0,
            new_count: 0,
            lines: old.iter().map(|l| PatchLine::Removed(l.clone())).collect(),
        }],
    }
}
