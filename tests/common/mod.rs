//! Shared fixtures for the patch/update integration tests
//!
//! Builds a three-revision directory mirror of one module. The SUCCEED
//! revision changes lines away from the locally patched region (and shifts it
//! down by one line); the FAIL revision rewrites the exact lines the local
//! patch touches.

use std::collections::BTreeSet;
use std::path::Path;

use tempfile::TempDir;

use modpatch::Remote;

pub const MODULE: &str = "bismark/align";
pub const ORG_SHA: &str = "22c7c12d";
pub const SUCCEED_SHA: &str = "f7d3a389";
pub const FAIL_SHA: &str = "b4596169";

pub fn remote() -> Remote {
    Remote::new(
        "https://git.example.com/nf-core/modules-test.git",
        Some("patch-tester".to_string()),
    )
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const MAIN_NF_ORG: &str = r#"process BISMARK_ALIGN {
    tag "$meta.id"
    label 'process_high'

    conda "bioconda::bismark=0.24.0"
    container "biocontainers/bismark:0.24.0"

    input:
    tuple val(meta), path(reads)
    path index

    output:
    tuple val(meta), path("*bam"), emit: bam
    tuple val(meta), path("*report.txt"), emit: report

    script:
    """
    bismark --genome $index $reads
    """
}
"#;

const META_YML: &str = r#"name: bismark_align
description: Performs alignment of BS-Seq reads using bismark
keywords:
  - bismark
  - align
  - methylation
"#;

fn main_nf_succeed() -> String {
    // A leading comment shifts the patched region; the script line changes too
    let shifted = format!("// Aligns BS-Seq reads with bismark\n{MAIN_NF_ORG}");
    shifted
        .replace("bismark=0.24.0", "bismark=0.25.0")
        .replace(
            "bismark --genome $index $reads",
            "bismark --genome $index $reads --bam",
        )
}

fn main_nf_fail() -> String {
    // Upstream rewrote the very lines the local patch removes
    MAIN_NF_ORG.replace(
        "    tuple val(meta), path(reads)\n    path index\n",
        "    tuple val(meta), path(reads), path(bai)\n",
    )
}

fn write_revision(mirror: &Path, revision: &str, main_nf: &str) {
    let dir = mirror.join(revision).join(MODULE);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("main.nf"), main_nf).unwrap();
    std::fs::write(dir.join("meta.yml"), META_YML).unwrap();
}

/// Build the revision mirror the [`modpatch::DirFetcher`] serves from
pub fn build_mirror() -> TempDir {
    let mirror = TempDir::new().unwrap();
    write_revision(mirror.path(), ORG_SHA, MAIN_NF_ORG);
    write_revision(mirror.path(), SUCCEED_SHA, &main_nf_succeed());
    write_revision(mirror.path(), FAIL_SHA, &main_nf_fail());
    mirror
}

/// The hand edit the original test applies: merge the index into the reads
/// tuple and drop its own line
pub fn modify_main_nf(path: &Path) {
    let content = std::fs::read_to_string(path).unwrap();
    let modified = content.replace(
        "    tuple val(meta), path(reads)\n    path index\n",
        "    tuple val(meta), path(reads), path(index)\n",
    );
    assert_ne!(content, modified, "fixture edit did not match");
    std::fs::write(path, modified).unwrap();
}

/// File names directly inside a directory, for file-set assertions
pub fn file_names(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect()
}

pub fn name_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}
