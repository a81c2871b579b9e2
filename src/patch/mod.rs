//! Unified-diff patch artifacts
//!
//! A [`Patch`] is an ordered sequence of per-file hunks in standard unified
//! diff format: human-readable, tool-compatible, and byte-deterministic for a
//! given input pair. File headers carry project-root-relative paths; a file
//! present on only one side uses `/dev/null` on the absent side.
//!
//! Rendering always writes explicit `start,count` pairs in hunk headers so
//! that render-then-parse is lossless and repeated runs never churn bytes.

pub mod apply;
pub mod generate;


use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{self, Result};

/// Header path used for the absent side of a file addition or removal
pub const DEV_NULL: &str = "/dev/null";

/// One line of a hunk body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchLine {
    /// Unchanged context line
    Context(String),
    /// Line present in the old file only
    Removed(String),
    /// Line present in the new file only
    Added(String),
}

/// One contiguous changed region with its context window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 1-based first line of the old range (0 when the old range is empty)
    pub old_start: usize,
    /// Number of old-side lines (context + removed)
    pub old_count: usize,
    /// 1-based first line of the new range (0 when the new range is empty)
    pub new_start: usize,
    /// Number of new-side lines (context + added)
    pub new_count: usize,
    /// Hunk body in file order
    pub lines: Vec<PatchLine>,
}

impl Hunk {
    /// The old side of the hunk: context and removed lines, in order
    pub fn old_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                PatchLine::Context(l) | PatchLine::Removed(l) => Some(l.as_str()),
                PatchLine::Added(_) => None,
            })
            .collect()
    }

    /// The new side of the hunk: context and added lines, in order
    pub fn new_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                PatchLine::Context(l) | PatchLine::Added(l) => Some(l.as_str()),
                PatchLine::Removed(_) => None,
            })
            .collect()
    }
}

/// All hunks for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    /// Old-side header path (project-root relative, or `/dev/null`)
    pub old_path: String,
    /// New-side header path (project-root relative, or `/dev/null`)
    pub new_path: String,
    /// Hunks in position order
    pub hunks: Vec<Hunk>,
}

impl FilePatch {
    /// Whether this patch creates the file
    pub fn is_file_addition(&self) -> bool {
        self.old_path == DEV_NULL
    }

    /// Whether this patch removes the file
    pub fn is_file_removal(&self) -> bool {
        self.new_path == DEV_NULL
    }

    /// The header path naming the file in the project tree
    pub fn header_path(&self) -> &str {
        if self.is_file_removal() {
            &self.old_path
        } else {
            &self.new_path
        }
    }
}

/// A unified-diff patch over one module's files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    /// Per-file patches in lexical header-path order
    pub files: Vec<FilePatch>,
}

impl Patch {
    /// True when the patch carries no hunks at all
    pub fn is_empty(&self) -> bool {
        self.files.iter().all(|f| f.hunks.is_empty())
    }

    /// Total hunk count across all files
    pub fn hunk_count(&self) -> usize {
        self.files.iter().map(|f| f.hunks.len()).sum()
    }

    /// Render the patch as unified diff text
    pub fn render(&self) -> String {
        let mut out = String::new();
        for file in &self.files {
            let _ = writeln!(out, "--- {}", file.old_path);
            let _ = writeln!(out, "+++ {}", file.new_path);
            for hunk in &file.hunks {
                let _ = writeln!(
                    out,
                    "@@ -{},{} +{},{} @@",
                    hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
                );
                for line in &hunk.lines {
                    match line {
                        PatchLine::Context(l) => {
                            let _ = writeln!(out, " {l}");
                        }
                        PatchLine::Removed(l) => {
                            let _ = writeln!(out, "-{l}");
                        }
                        PatchLine::Added(l) => {
                            let _ = writeln!(out, "+{l}");
                        }
                    }
                }
            }
        }
        out
    }

    /// Read and parse a patch file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| error::file_read_failed(path, e))?;
        Self::parse(&content, path)
    }

    /// Parse unified diff text. `origin` names the source in errors.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        Parser::new(origin).parse(text)
    }
}

/// Deterministic patch file name for a module path: `/` becomes `-`, plus a
/// `.diff` suffix, so each module has at most one patch file at a time.
pub fn patch_file_name(module: &str) -> String {
    format!("{}.diff", module.split('/').collect::<Vec<_>>().join("-"))
}

struct Parser<'a> {
    origin: &'a Path,
}

impl<'a> Parser<'a> {
    fn new(origin: &'a Path) -> Self {
        Self { origin }
    }

    fn err(&self, reason: impl Into<String>) -> crate::error::ModpatchError {
        error::patch_parse_failed(self.origin, reason)
    }

    fn parse(&self, text: &str) -> Result<Patch> {
        let mut files: Vec<FilePatch> = Vec::new();
        let mut lines = text.lines().peekable();

        while let Some(line) = lines.next() {
            let Some(old_path) = line.strip_prefix("--- ") else {
                if line.is_empty() {
                    continue;
                }
                return Err(self.err(format!("expected '--- ' header, found '{line}'")));
            };
            let new_path = lines
                .next()
                .and_then(|l| l.strip_prefix("+++ "))
                .ok_or_else(|| self.err("missing '+++ ' header"))?;

            let mut hunks = Vec::new();
            while let Some(header) = lines.peek().and_then(|l| l.strip_prefix("@@ ")) {
                let (old_start, old_count, new_start, new_count) = self.parse_ranges(header)?;
                lines.next();
                let body = self.parse_body(&mut lines, old_count, new_count)?;
                hunks.push(Hunk {
                    old_start,
                    old_count,
                    new_start,
                    new_count,
                    lines: body,
                });
            }

            if hunks.is_empty() {
                return Err(self.err(format!("file entry '{old_path}' has no hunks")));
            }
            files.push(FilePatch {
                old_path: old_path.to_string(),
                new_path: new_path.to_string(),
                hunks,
            });
        }

        Ok(Patch { files })
    }

    /// Parse `-s,c +s,c @@` (a bare `-s` means count 1, per unified diff)
    fn parse_ranges(&self, header: &str) -> Result<(usize, usize, usize, usize)> {
        let body = header
            .split(" @@")
            .next()
            .ok_or_else(|| self.err("malformed hunk header"))?;
        let mut parts = body.split_whitespace();
        let old = parts
            .next()
            .and_then(|p| p.strip_prefix('-'))
            .ok_or_else(|| self.err("malformed old range in hunk header"))?;
        let new = parts
            .next()
            .and_then(|p| p.strip_prefix('+'))
            .ok_or_else(|| self.err("malformed new range in hunk header"))?;

        let (old_start, old_count) = self.parse_range(old)?;
        let (new_start, new_count) = self.parse_range(new)?;
        Ok((old_start, old_count, new_start, new_count))
    }

    fn parse_range(&self, range: &str) -> Result<(usize, usize)> {
        let (start, count) = match range.split_once(',') {
            Some((s, c)) => (s, c),
            None => (range, "1"),
        };
        let start = start
            .parse()
            .map_err(|_| self.err(format!("invalid range start '{start}'")))?;
        let count = count
            .parse()
            .map_err(|_| self.err(format!("invalid range count '{count}'")))?;
        Ok((start, count))
    }

    fn parse_body(
        &self,
        lines: &mut std::iter::Peekable<std::str::Lines<'_>>,
        old_count: usize,
        new_count: usize,
    ) -> Result<Vec<PatchLine>> {
        let mut body = Vec::new();
        let mut seen_old = 0usize;
        let mut seen_new = 0usize;

        while seen_old < old_count || seen_new < new_count {
            let Some(line) = lines.next() else {
                return Err(self.err("hunk body shorter than its header ranges"));
            };
            if line.starts_with('\\') {
                // "\ No newline at end of file" markers carry no content
                continue;
            }
            if line.is_empty() {
                // Tolerate a fully empty line as empty context
                seen_old += 1;
                seen_new += 1;
                body.push(PatchLine::Context(String::new()));
                continue;
            }
            match line.split_at_checked(1) {
                Some(("-", rest)) => {
                    seen_old += 1;
                    body.push(PatchLine::Removed(rest.to_string()));
                }
                Some(("+", rest)) => {
                    seen_new += 1;
                    body.push(PatchLine::Added(rest.to_string()));
                }
                Some((" ", rest)) => {
                    seen_old += 1;
                    seen_new += 1;
                    body.push(PatchLine::Context(rest.to_string()));
                }
                _ => {
                    return Err(self.err(format!("unexpected line in hunk body: '{line}'")));
                }
            }
            if seen_old > old_count || seen_new > new_count {
                return Err(self.err("hunk body longer than its header ranges"));
            }
        }

        Ok(body)
    }
}
