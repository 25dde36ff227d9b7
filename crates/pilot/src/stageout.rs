// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage-out: bring produced files back to the communication point and
//! declare them to the external stager.

use crate::staging::Workspace;
use rp_core::{
    format_secs, FileDescriptor, FileKind, JobDescriptor, StageOutDeclaration, WorkReport,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to write stage-out declaration {}: {source}", path.display())]
pub struct DeclarationError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Copy outputs and the log archive from the scratch workdir back to the
/// communication point. Failures are logged; the file then counts as
/// missing at declaration time.
pub fn copy_back(workspace: &Workspace, job: &JobDescriptor) {
    if !workspace.is_scratch() {
        return;
    }
    let started = Instant::now();
    for name in job.stage_out_files() {
        let src = workspace.workdir().join(name);
        if !src.exists() {
            continue;
        }
        let dst = workspace.comm_point().join(name);
        if let Err(e) = std::fs::copy(&src, &dst) {
            tracing::error!("failed to copy {} to {}: {}", src.display(), dst.display(), e);
        }
    }
    tracing::info!(
        "copy of outputs took: {} sec.",
        format_secs(started.elapsed())
    );
}

/// Describe every produced file found in `dir`.
///
/// A declared output that is absent marks the job failed. The id comes from
/// the job descriptor, else from what the payload reported.
pub fn declare(job: &mut JobDescriptor, report: &WorkReport, dir: &Path) -> StageOutDeclaration {
    tracing::info!("declare stage-out");
    let mut declaration = StageOutDeclaration::new(job.job_id.clone());
    let mut missing = false;

    for name in job.stage_out_files() {
        tracing::debug!("file {} will be checked and declared for stage out", name);
        let path = dir.join(name);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                let kind = if job.is_log_file(name) {
                    FileKind::Log
                } else {
                    FileKind::Output
                };
                let id = job
                    .output_guid(name)
                    .or_else(|| report.output_guid(name))
                    .map(str::to_string);
                declaration.push(
                    &job.job_id,
                    FileDescriptor {
                        kind,
                        path,
                        size: meta.len(),
                        id,
                    },
                );
            }
            _ if job.output_files.contains_key(name) => {
                tracing::warn!("declared output {} is missing", name);
                missing = true;
            }
            _ => tracing::info!("log file {} was not produced", name),
        }
    }

    if missing {
        job.fail();
    }
    declaration
}

/// Write `declaration` to `path`. Returns `false` when there was nothing to
/// declare and no file was written.
pub fn write_declaration(
    declaration: &StageOutDeclaration,
    path: &Path,
) -> Result<bool, DeclarationError> {
    if declaration.is_empty() {
        tracing::info!("no files to stage out");
        return Ok(false);
    }
    declaration
        .to_json()
        .map_err(std::io::Error::other)
        .and_then(|json| std::fs::write(path, json))
        .map_err(|source| DeclarationError {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!("stage-out declared in {}", path.display());
    Ok(true)
}

#[cfg(test)]
#[path = "stageout_tests.rs"]
mod tests;
