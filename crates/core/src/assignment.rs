// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rank-to-job assignment, precomputed upstream and read once per rank.

use crate::job::JobId;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("failed to read job assignment {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed job assignment {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl AssignmentError {
    /// OS error number behind a read failure, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            AssignmentError::Io { source, .. } => source.raw_os_error(),
            AssignmentError::Json { .. } => None,
        }
    }
}

/// Upstream producers write ids either as JSON strings or bare integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for JobId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => JobId::new(s),
            RawId::Number(n) => JobId::new(n.to_string()),
        }
    }
}

/// Job ids indexed by rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobAssignment {
    ids: Vec<JobId>,
}

impl JobAssignment {
    pub fn new(ids: Vec<JobId>) -> Self {
        Self { ids }
    }

    pub fn load(path: &Path) -> Result<Self, AssignmentError> {
        let text = std::fs::read_to_string(path).map_err(|source| AssignmentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| AssignmentError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: Vec<RawId> = serde_json::from_str(text)?;
        Ok(Self {
            ids: raw.into_iter().map(JobId::from).collect(),
        })
    }

    /// The job for `rank`, or `None` when the allocation has more ranks
    /// than jobs.
    pub fn resolve(&self, rank: usize) -> Option<&JobId> {
        self.ids.get(rank)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
#[path = "assignment_tests.rs"]
mod tests;
