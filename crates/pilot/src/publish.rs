// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work-report publishing for the external poller.

use rp_core::{offset_timestamp, Clock, WorkReport};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to publish work report to {path}: {source}")]
pub struct PublishError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Stamp `report` with the current local time and replace the file at
/// `path`. The poller only ever sees a complete file: the JSON goes to a
/// sibling temp file that is then renamed over the target.
pub fn publish(report: &mut WorkReport, path: &Path, clock: &impl Clock) -> Result<(), PublishError> {
    report.stamp(offset_timestamp(&clock.local_now()));
    let tmp_path = path.with_extension("json.tmp");

    let written = report
        .to_json()
        .map_err(std::io::Error::other)
        .and_then(|json| std::fs::write(&tmp_path, json.as_bytes()))
        .and_then(|()| std::fs::rename(&tmp_path, path));

    match written {
        Ok(()) => {
            tracing::debug!(
                "published work report ({}) to {}",
                report.status().unwrap_or("unknown"),
                path.display()
            );
            Ok(())
        }
        Err(source) => {
            let _ = std::fs::remove_file(&tmp_path);
            Err(PublishError {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

#[cfg(test)]
#[path = "publish_tests.rs"]
mod tests;
