// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch error types.

use std::path::PathBuf;

/// Errors that prevent the payload from running at all.
///
/// A payload that runs and exits non-zero is not an error; see
/// [`crate::LaunchOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Output capture file could not be created.
    #[error("failed to open {path} for payload output: {source}")]
    RedirectFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Interpreter not found or could not be spawned.
    #[error("failed to spawn `{shell}`: {source}")]
    SpawnFailed {
        shell: String,
        source: std::io::Error,
    },

    /// Waiting on the child failed.
    #[error("failed to wait for payload: {0}")]
    WaitFailed(#[source] std::io::Error),
}
