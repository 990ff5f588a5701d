//! Batch extraction into an exploded directory
//!
//! Walks a source root, extracts every function from files matching the
//! requested languages, and writes one artifact per function named by its
//! starting line and original extension. This is the hand-off contract to
//! the external signature builder: re-running over unchanged input yields
//! byte-identical artifacts in identical locations.
//!
//! Per-file failures — parse timeouts, unreadable files — are isolated:
//! they increment the skip count and never abort sibling files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::deadline::Deadline;
use crate::error::Result;
use crate::language::{Language, ALL_LANGUAGES};
use crate::locate::ExtractOptions;
use crate::parse::ParsedFile;

/// Options for one explode run.
#[derive(Debug, Clone)]
pub struct ExplodeOptions {
    /// Languages to extract; files classified as anything else are
    /// ignored.
    pub langs: Vec<Language>,
    /// Per-file extraction deadline.
    pub timeout: Option<Duration>,
    /// Keep functions whose subtree contains parse errors.
    pub keep_error_nodes: bool,
    /// Glob patterns for relative paths to include (empty means all).
    pub include: Vec<String>,
    /// Glob patterns for relative paths to exclude.
    pub exclude: Vec<String>,
}

impl Default for ExplodeOptions {
    fn default() -> Self {
        ExplodeOptions {
            langs: ALL_LANGUAGES.to_vec(),
            timeout: None,
            keep_error_nodes: true,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

/// Counts from one explode run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ExplodeSummary {
    /// Files classified into a requested language.
    pub files_seen: usize,
    /// Files fully extracted and written.
    pub files_exploded: usize,
    /// Files skipped due to a per-file error or timeout.
    pub files_skipped: usize,
    /// Function artifacts written.
    pub functions_written: usize,
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Whether a relative path passes the include/exclude filters.
fn path_selected(rel: &Path, include: &GlobSet, exclude: &GlobSet) -> bool {
    if exclude.is_match(rel) {
        return false;
    }
    include.is_empty() || include.is_match(rel)
}

/// Walk `src_root` in sorted order and collect classified candidates.
fn collect_candidates(
    src_root: &Path,
    opts: &ExplodeOptions,
    classify: &(dyn Fn(&Path) -> Option<Language> + Sync),
) -> Result<Vec<(PathBuf, Language)>> {
    let include = build_glob_set(&opts.include)?;
    let exclude = build_glob_set(&opts.exclude)?;

    let mut candidates = Vec::new();
    for entry in WalkDir::new(src_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(src_root) else {
            continue;
        };
        if !path_selected(rel, &include, &exclude) {
            continue;
        }
        let Some(lang) = classify(entry.path()) else {
            continue;
        };
        if opts.langs.contains(&lang) {
            candidates.push((rel.to_path_buf(), lang));
        }
    }
    Ok(candidates)
}

/// Extract one file and write its function artifacts.
fn explode_file(
    src_root: &Path,
    out_root: &Path,
    rel: &Path,
    lang: Language,
    opts: &ExplodeOptions,
) -> Result<usize> {
    let bytes = fs::read(src_root.join(rel))?;
    let file = ParsedFile::parse(bytes, lang)?;
    let records = file.functions(&ExtractOptions {
        keep_error_nodes: opts.keep_error_nodes,
        deadline: Deadline::from_timeout(opts.timeout),
    })?;

    let ext = rel
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    // The file's relative path becomes a directory holding one artifact
    // per function.
    let file_dir = out_root.join(rel);
    fs::create_dir_all(&file_dir)?;

    for record in &records {
        let artifact = file_dir.join(format!("{}{}", record.start_line(), ext));
        fs::write(artifact, record.code_bytes())?;
    }
    Ok(records.len())
}

/// Explode `src_root` into `out_root` using extension classification.
pub fn explode(src_root: &Path, out_root: &Path, opts: &ExplodeOptions) -> Result<ExplodeSummary> {
    explode_with_classifier(src_root, out_root, opts, &Language::from_path)
}

/// Explode with a caller-supplied language classifier (the interface the
/// external per-file classifier tool plugs into).
pub fn explode_with_classifier(
    src_root: &Path,
    out_root: &Path,
    opts: &ExplodeOptions,
    classify: &(dyn Fn(&Path) -> Option<Language> + Sync),
) -> Result<ExplodeSummary> {
    let candidates = collect_candidates(src_root, opts, classify)?;
    fs::create_dir_all(out_root)?;

    let summary = candidates
        .par_iter()
        .map(|(rel, lang)| {
            let mut summary = ExplodeSummary {
                files_seen: 1,
                ..Default::default()
            };
            match explode_file(src_root, out_root, rel, *lang, opts) {
                Ok(written) => {
                    summary.files_exploded = 1;
                    summary.functions_written = written;
                }
                Err(_) => summary.files_skipped = 1,
            }
            summary
        })
        .reduce(ExplodeSummary::default, |a, b| ExplodeSummary {
            files_seen: a.files_seen + b.files_seen,
            files_exploded: a.files_exploded + b.files_exploded,
            files_skipped: a.files_skipped + b.files_skipped,
            functions_written: a.functions_written + b.functions_written,
        });

    Ok(summary)
}
