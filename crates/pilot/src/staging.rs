// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace preparation: move the job onto the fast local area when the
//! node has one, or run it in place from the communication point.

use crate::config::{PilotConfig, ReferenceFile};
use rp_core::{format_secs, JobDescriptor};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to link {} to {}: {source}", link.display(), target.display())]
    Link {
        link: PathBuf,
        target: PathBuf,
        source: std::io::Error,
    },
}

/// Where the payload runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    comm_point: PathBuf,
    workdir: PathBuf,
    reference_link: Option<PathBuf>,
}

impl Workspace {
    /// Degraded mode: run directly in the communication point.
    pub fn in_place(comm_point: &Path) -> Self {
        Self {
            comm_point: comm_point.to_path_buf(),
            workdir: comm_point.to_path_buf(),
            reference_link: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn at(comm_point: &Path, workdir: &Path) -> Self {
        Self {
            comm_point: comm_point.to_path_buf(),
            workdir: workdir.to_path_buf(),
            reference_link: None,
        }
    }

    pub fn comm_point(&self) -> &Path {
        &self.comm_point
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// True when the job was moved off the communication point.
    pub fn is_scratch(&self) -> bool {
        self.workdir != self.comm_point
    }

    /// Remove the reference-tree link so nothing later walks into the
    /// shared tree. Idempotent.
    pub fn release_reference_link(&mut self) {
        let Some(link) = self.reference_link.take() else {
            return;
        };
        match std::fs::remove_file(&link) {
            Ok(()) => tracing::debug!("removed reference link {}", link.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to remove reference link {}: {}", link.display(), e),
        }
    }
}

/// Prepare the working directory for `job`.
///
/// With the scratch area present: create its `tmp/`, copy the reference
/// files, create `scratch/<job id>`, copy every input there and link the
/// reference tree into it. Without it the job runs from `comm_point`.
pub fn prepare(
    config: &PilotConfig,
    comm_point: &Path,
    job: &mut JobDescriptor,
) -> Result<Workspace, StagingError> {
    let scratch = &config.scratch_dir;
    if !scratch.is_dir() {
        tracing::info!(
            "scratch directory ({}) does not exist, running in {}",
            scratch.display(),
            comm_point.display()
        );
        return Ok(Workspace::in_place(comm_point));
    }

    let started = Instant::now();
    create_dir(&scratch.join("tmp"))?;
    for file in &config.reference_files {
        copy_reference(scratch, file)?;
    }

    let workdir = scratch.join(job.job_id.as_str());
    create_dir(&workdir)?;
    job.stage_inputs_into(&workdir);
    for input in job.input_files.values() {
        let Some(staged) = &input.staged_path else {
            continue;
        };
        copy_file(&input.local_path, staged)?;
    }

    let reference_link = match &config.reference_tree {
        Some(tree) => {
            let link = workdir.join(&tree.link_name);
            match std::os::unix::fs::symlink(&tree.target, &link) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!("reference link {} already present", link.display());
                }
                Err(source) => {
                    return Err(StagingError::Link {
                        link,
                        target: tree.target.clone(),
                        source,
                    })
                }
            }
            Some(link)
        }
        None => None,
    };

    tracing::info!(
        "staging to {} took {} sec.",
        workdir.display(),
        format_secs(started.elapsed())
    );
    Ok(Workspace {
        comm_point: comm_point.to_path_buf(),
        workdir,
        reference_link,
    })
}

fn copy_reference(scratch: &Path, file: &ReferenceFile) -> Result<(), StagingError> {
    let dest = scratch.join(&file.dest);
    if let Some(parent) = dest.parent() {
        create_dir(parent)?;
    }
    copy_file(&file.source, &dest)
}

fn create_dir(path: &Path) -> Result<(), StagingError> {
    std::fs::create_dir_all(path).map_err(|source| StagingError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<(), StagingError> {
    std::fs::copy(from, to)
        .map(|bytes| tracing::debug!("copied {} ({} bytes)", from.display(), bytes))
        .map_err(|source| StagingError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
