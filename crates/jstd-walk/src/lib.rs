//! # jstd-walk
//!
//! **Tier 2 (Utilities)**
//!
//! Filesystem traversal for the sensor: finding report files in the report
//! folder and locating the test source a report resolves to.
//!
//! ## What belongs here
//! * Report file selection (`TEST-*.xml`, then `TESTS-*.xml`)
//! * Test source lookup across several test directories
//!
//! ## What does NOT belong here
//! * XML parsing (use jstd-parsing)
//! * Decoding file contents
//! * File modification

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;

/// File name prefix of per-class report files.
pub const REPORT_PREFIX: &str = "TEST-";

/// File name prefix of aggregate report files, used when no per-class
/// report exists.
pub const SUITES_REPORT_PREFIX: &str = "TESTS-";

/// Extension every report file carries.
pub const REPORT_EXTENSION: &str = ".xml";

/// List report files under `dir`, sorted by path.
///
/// Per-class `TEST-*.xml` files are preferred; when there are none,
/// aggregate `TESTS-*.xml` files are returned instead. A missing directory
/// yields an empty list. Ignore files are not honoured since report folders
/// usually live under ignored build output.
pub fn list_reports(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let xml_files = list_xml_files(dir, recursive)?;
    let mut reports = select_with_prefix(&xml_files, REPORT_PREFIX);
    if reports.is_empty() {
        reports = select_with_prefix(&xml_files, SUITES_REPORT_PREFIX);
    }
    Ok(reports)
}

fn list_xml_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut builder = WalkBuilder::new(dir);
    builder.standard_filters(false);
    builder.follow_links(false);
    if !recursive {
        builder.max_depth(Some(1));
    }

    for entry in builder.build() {
        let entry =
            entry.with_context(|| format!("Failed to list reports in {}", dir.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.into_path();
        if file_name(&path).ends_with(REPORT_EXTENSION) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn select_with_prefix(files: &[PathBuf], prefix: &str) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|p| file_name(p).starts_with(prefix))
        .cloned()
        .collect()
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// Report identifier implied by a report file name.
///
/// `TEST-Chrome_1_Windows.PersonTest.xml` becomes
/// `Chrome_1_Windows.PersonTest`.
pub fn identifier_from_file_name(path: &Path) -> Option<String> {
    let name = file_name(path);
    let stem = name.strip_suffix(REPORT_EXTENSION)?;
    let stem = stem
        .strip_prefix(SUITES_REPORT_PREFIX)
        .or_else(|| stem.strip_prefix(REPORT_PREFIX))
        .unwrap_or(stem);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Locate `relative` in the first test directory that contains it.
///
/// Paths that are absolute or climb out of the directory never match.
pub fn find_test_source(test_dirs: &[PathBuf], relative: &str) -> Option<PathBuf> {
    let relative = jstd_path::contained_path(relative)?;
    test_dirs
        .iter()
        .map(|dir| dir.join(&relative))
        .find(|candidate| candidate.is_file())
}
