// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal outcome of a pipeline run.
//!
//! Steps return a `PipelineExit` instead of calling `std::process::exit()`
//! directly; `main()` finishes it, which publishes the last report first.

use crate::publish::publish;
use rp_core::{Clock, WorkReport};
use std::path::PathBuf;

/// Workspace preparation or payload-summary copy failed.
pub const STAGING_ERROR_CODE: i32 = 1103;
/// Log archive could not be written after retrying.
pub const PACKAGING_ERROR_CODE: i32 = 1164;
/// No job for this rank, or its descriptor could not be loaded.
pub const NO_JOB_EXIT_CODE: i32 = 1;

#[derive(Debug)]
pub struct PipelineExit {
    pub code: i32,
    /// Report to publish before exiting, and where.
    pub publish: Option<(WorkReport, PathBuf)>,
}

impl PipelineExit {
    /// Pipeline completed; job status lives in the report.
    pub fn ok(report: WorkReport, path: PathBuf) -> Self {
        Self {
            code: 0,
            publish: Some((report, path)),
        }
    }

    pub fn fatal(code: i32, report: WorkReport, path: PathBuf) -> Self {
        Self {
            code,
            publish: Some((report, path)),
        }
    }

    /// Exit without publishing anything.
    pub fn bare(code: i32) -> Self {
        Self {
            code,
            publish: None,
        }
    }

    /// Publish the final report, if any, and return the process exit code.
    pub fn finish(self, clock: &impl Clock) -> i32 {
        if let Some((mut report, path)) = self.publish {
            if report.is_empty() {
                tracing::debug!("empty work report, nothing to publish");
            } else if let Err(e) = publish(&mut report, &path, clock) {
                tracing::error!("{}", e);
            }
        }
        self.code
    }
}

#[cfg(test)]
#[path = "exit_tests.rs"]
mod tests;
