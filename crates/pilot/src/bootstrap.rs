// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rank bootstrap: from a rank to one job and its communication point.

use crate::exit::NO_JOB_EXIT_CODE;
use rp_core::{AssignmentError, CatalogError, JobAssignment, JobCatalog, JobDescriptor, JobId};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error("no job for rank {rank}: assignment lists {jobs} jobs")]
    NoJob { rank: usize, jobs: usize },
    #[error("communication point {} for job {job_id} is not a directory", path.display())]
    MissingCommPoint { job_id: JobId, path: PathBuf },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl BootstrapError {
    /// Process exit code: the OS error number for an unreadable assignment,
    /// else 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::Assignment(e) => e.raw_os_error().unwrap_or(NO_JOB_EXIT_CODE),
            _ => NO_JOB_EXIT_CODE,
        }
    }
}

/// This rank's job and the directory it exchanges files through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    pub rank: usize,
    pub job_id: JobId,
    pub comm_point: PathBuf,
}

impl Bootstrap {
    /// Look up `rank` in the assignment at `assignment` (relative paths are
    /// taken from `launch_dir`) and locate the job's communication point,
    /// `launch_dir/<job id>`.
    pub fn resolve(
        launch_dir: &Path,
        assignment: &Path,
        rank: usize,
    ) -> Result<Self, BootstrapError> {
        let assignment = JobAssignment::load(&launch_dir.join(assignment))?;
        let Some(job_id) = assignment.resolve(rank).cloned() else {
            return Err(BootstrapError::NoJob {
                rank,
                jobs: assignment.len(),
            });
        };

        let comm_point = launch_dir.join(job_id.as_str());
        if !comm_point.is_dir() {
            return Err(BootstrapError::MissingCommPoint {
                job_id,
                path: comm_point,
            });
        }

        tracing::info!(
            "rank {} of {} runs job {} in {}",
            rank,
            assignment.len(),
            job_id,
            comm_point.display()
        );
        Ok(Self {
            rank,
            job_id,
            comm_point,
        })
    }

    /// Load this job's descriptor from the catalog in the communication
    /// point.
    pub fn load_job(&self, catalog: &str) -> Result<JobDescriptor, BootstrapError> {
        let catalog = JobCatalog::load(&self.comm_point.join(catalog))?;
        let job = catalog.descriptor(&self.job_id, &self.comm_point)?;
        tracing::debug!(
            "loaded job {}: {} inputs, {} outputs",
            job.job_id,
            job.input_files.len(),
            job.output_files.len()
        );
        Ok(job)
    }

    /// Path of a fixed-name exchange file in the communication point.
    pub fn comm_file(&self, name: &str) -> PathBuf {
        self.comm_point.join(name)
    }
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
