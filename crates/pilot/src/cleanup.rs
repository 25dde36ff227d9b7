// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Removal of redundant workspace artifacts before the log archive is built.
//!
//! Every deletion is best-effort: failures are logged and counted, never
//! returned.

use glob::{MatchOptions, Pattern};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Top-level names that never belong in the log archive.
pub const REDUNDANT_PATTERNS: &[&str] = &[
    "AtlasProduction*",
    "AtlasPoint1",
    "AtlasTier0",
    "buildJob*",
    "CDRelease*",
    "csc*.log",
    "DBRelease*",
    "EvgenJobOptions",
    "external",
    "fort.*",
    "geant4",
    "geomDB",
    "geomDB_sqlite",
    "home",
    "o..pacman..o",
    "pacman-*",
    "python",
    "runAthena*",
    "share",
    "sources.*",
    "sqlite*",
    "sw",
    "tcf_*",
    "triggerDB",
    "trusted.caches",
    "workdir",
    "*.data*",
    "*.events",
    "*.py",
    "*.pyc",
    "*.root*",
    "JEM",
    "tmp*",
    "*.tmp",
    "*.TMP",
    "MC11JobOptions",
    "scratch",
    "jobState-*-test.pickle",
    "*.writing",
    "pwg*",
    "pwhg*",
    "*PROC*",
    "madevent",
    "HPC",
    "objectstore*.json",
    "saga",
    "radical",
    "ckpt*",
];

/// A catalog match whose name contains one of these is kept.
pub const PROTECTED_SUBSTRINGS: &[&str] = &["runargs", "runwrapper", "jobReport", "log."];

/// Per-process scratch trees left by the multi-process payload.
pub const WORKER_DIR_PATTERN: &str = "athenaMP-workers-*";

/// Files inside worker trees whose name contains one of these are removed.
pub const WORKER_JUNK_SUBSTRINGS: &[&str] = &["core", "tmp."];

/// Archives that would be dereferenced into the log archive if linked.
pub const LINKED_ARCHIVE_PATTERNS: &[&str] = &["*.a", "EventService_premerge_*.tar"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub removed: usize,
    pub failed: usize,
}

/// Clean `workdir`, never touching entries named in `keep`.
pub fn clean(workdir: &Path, keep: &[&str]) -> CleanupSummary {
    tracing::info!("removing redundant files prior to log creation");
    let mut cleaner = Cleaner {
        workdir,
        keep,
        summary: CleanupSummary::default(),
    };
    cleaner.worker_dirs();
    cleaner.linked_archives();
    cleaner.catalog();
    cleaner.broken_links();
    tracing::debug!(
        "cleanup removed {} entries, {} failures",
        cleaner.summary.removed,
        cleaner.summary.failed
    );
    cleaner.summary
}

/// True when the catalog marks `name` as redundant.
pub fn is_redundant(name: &str) -> bool {
    redundant(&compile(REDUNDANT_PATTERNS), name)
}

fn redundant(catalog: &[Pattern], name: &str) -> bool {
    matches_any(catalog, name) && !PROTECTED_SUBSTRINGS.iter().any(|p| name.contains(p))
}

struct Cleaner<'a> {
    workdir: &'a Path,
    keep: &'a [&'a str],
    summary: CleanupSummary,
}

impl Cleaner<'_> {
    fn worker_dirs(&mut self) {
        let pattern = compile(&[WORKER_DIR_PATTERN]);
        let doomed: Vec<PathBuf> = self
            .top_level()
            .into_iter()
            .filter(|(name, path)| matches_any(&pattern, name) && path.is_dir())
            .flat_map(|(_, dir)| {
                WalkDir::new(dir)
                    .follow_links(false)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| !e.file_type().is_dir())
                    .map(|e| e.into_path())
                    .collect::<Vec<_>>()
            })
            .filter(|path| {
                let name = file_name(path);
                WORKER_JUNK_SUBSTRINGS.iter().any(|s| name.contains(s))
                    || self.keep.iter().any(|k| name.contains(k))
            })
            .collect();
        for path in doomed {
            self.remove(&path);
        }
    }

    fn linked_archives(&mut self) {
        let patterns = compile(LINKED_ARCHIVE_PATTERNS);
        let doomed: Vec<PathBuf> = self
            .walk()
            .filter(|e| e.path_is_symlink() && matches_any(&patterns, &file_name(e.path())))
            .map(|e| e.into_path())
            .collect();
        for path in doomed {
            self.remove(&path);
        }
    }

    fn catalog(&mut self) {
        let catalog = compile(REDUNDANT_PATTERNS);
        let doomed: Vec<PathBuf> = self
            .top_level()
            .into_iter()
            .filter(|(name, _)| redundant(&catalog, name) && !self.keep.contains(&name.as_str()))
            .map(|(_, path)| path)
            .collect();
        for path in doomed {
            self.remove(&path);
        }
    }

    fn broken_links(&mut self) {
        let doomed: Vec<PathBuf> = self
            .walk()
            .filter(|e| e.path_is_symlink())
            .filter(|e| {
                let Ok(target) = std::fs::read_link(e.path()) else {
                    return false;
                };
                let target = match e.path().parent() {
                    Some(dir) if target.is_relative() => dir.join(target),
                    _ => target,
                };
                !target.exists()
            })
            .map(|e| e.into_path())
            .collect();
        for path in doomed {
            tracing::debug!("removing broken link {}", path.display());
            self.remove(&path);
        }
    }

    fn walk(&self) -> impl Iterator<Item = walkdir::DirEntry> {
        WalkDir::new(self.workdir)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
    }

    fn top_level(&self) -> Vec<(String, PathBuf)> {
        match std::fs::read_dir(self.workdir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
                .collect(),
            Err(e) => {
                tracing::error!("cannot list {}: {}", self.workdir.display(), e);
                Vec::new()
            }
        }
    }

    fn remove(&mut self, path: &Path) {
        let result = match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
            Ok(_) => std::fs::remove_file(path),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => self.summary.removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!("problem with deletion of {}: {}", path.display(), e);
                self.summary.failed += 1;
            }
        }
    }
}

fn compile(patterns: &[&str]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!("invalid cleanup pattern {}: {}", p, e);
                None
            }
        })
        .collect()
}

fn matches_any(patterns: &[Pattern], name: &str) -> bool {
    patterns
        .iter()
        .any(|p| p.matches_with(name, MATCH_OPTIONS))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
