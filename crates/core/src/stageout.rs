// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage-out declaration handed to the external stage-out collaborator
//! (`event_status.dump.json`).

use crate::job::JobId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Log,
    Output,
}

crate::simple_display! {
    FileKind {
        Log => "log",
        Output => "output",
    }
}

/// One produced file, verified present on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub path: PathBuf,
    #[serde(rename = "fsize")]
    pub size: u64,
    #[serde(rename = "guid", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Job id to its ordered file descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageOutDeclaration {
    entries: IndexMap<JobId, Vec<FileDescriptor>>,
}

impl StageOutDeclaration {
    pub fn new(job_id: JobId) -> Self {
        let mut entries = IndexMap::new();
        entries.insert(job_id, Vec::new());
        Self { entries }
    }

    pub fn push(&mut self, job_id: &JobId, descriptor: FileDescriptor) {
        self.entries
            .entry(job_id.clone())
            .or_default()
            .push(descriptor);
    }

    pub fn files(&self, job_id: &JobId) -> &[FileDescriptor] {
        self.entries
            .get(job_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True when no job has any file to stage out.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[path = "stageout_tests.rs"]
mod tests;
