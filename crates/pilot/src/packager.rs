// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log packaging: everything left in the working directory goes into one
//! gzip-compressed tar at the job's log-file path.
//!
//! A single attempt lives here; the caller owns the retry.

use flate2::write::GzEncoder;
use flate2::Compression;
use rp_core::format_secs;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("failed to create log archive {}: {source}", path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to add {} to log archive: {source}", path.display())]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to finish log archive {}: {source}", path.display())]
    Finish {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A file to archive: where it is, and its entry name in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedFile {
    pub path: PathBuf,
    pub name: PathBuf,
}

/// Result of a successful packing attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackReport {
    /// Archive written, or `None` when there was nothing to pack.
    pub archive: Option<PathBuf>,
    pub files: Vec<PackedFile>,
}

impl PackReport {
    /// Delete every packed source file, then any directory left empty.
    pub fn remove_sources(&self, workdir: &Path) {
        for file in &self.files {
            if let Err(e) = std::fs::remove_file(&file.path) {
                tracing::error!("problem with deletion of {}: {}", file.path.display(), e);
            }
        }
        remove_empty_dirs(workdir);
    }
}

/// Files under `workdir` to archive, skipping any whose name is listed in
/// `excluded`. Links to directories are not descended into.
pub fn collect_files(workdir: &Path, excluded: &[&str]) -> Vec<PackedFile> {
    WalkDir::new(workdir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            let file_type = e.file_type();
            if file_type.is_dir() {
                return false;
            }
            // Links are archived by content, so only links to files count.
            !file_type.is_symlink() || std::fs::metadata(e.path()).is_ok_and(|m| m.is_file())
        })
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            !excluded.iter().any(|x| *x == name)
        })
        .filter_map(|e| {
            let name = e.path().strip_prefix(workdir).ok()?.to_path_buf();
            Some(PackedFile {
                path: e.into_path(),
                name,
            })
        })
        .collect()
}

/// Write `files` into a new gzip tar at `archive`, following links.
pub fn write_archive(archive: &Path, files: &[PackedFile]) -> Result<(), PackError> {
    let file = File::create(archive).map_err(|source| PackError::Create {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(true);
    for f in files {
        builder
            .append_path_with_name(&f.path, &f.name)
            .map_err(|source| PackError::Append {
                path: f.path.clone(),
                source,
            })?;
    }
    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(|source| PackError::Finish {
            path: archive.to_path_buf(),
            source,
        })?;
    Ok(())
}

/// One packing attempt: archive everything not excluded into
/// `workdir/log_file`.
pub fn pack_logs(workdir: &Path, excluded: &[&str], log_file: &str) -> Result<PackReport, PackError> {
    let started = Instant::now();
    let mut excluded = excluded.to_vec();
    excluded.push(log_file);
    let files = collect_files(workdir, &excluded);
    if files.is_empty() {
        tracing::info!("nothing to pack in {}", workdir.display());
        return Ok(PackReport::default());
    }

    let archive = workdir.join(log_file);
    write_archive(&archive, &files)?;
    tracing::debug!(
        "pack of {} files into {} took: {} sec.",
        files.len(),
        archive.display(),
        format_secs(started.elapsed())
    );
    Ok(PackReport {
        archive: Some(archive),
        files,
    })
}

fn remove_empty_dirs(workdir: &Path) {
    let dirs = WalkDir::new(workdir)
        .min_depth(1)
        .contents_first(true)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir());
    for dir in dirs {
        // Non-empty directories stay.
        let _ = std::fs::remove_dir(dir.path());
    }
}

#[cfg(test)]
#[path = "packager_tests.rs"]
mod tests;
