// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload summary (`jobReport.json`) loading and hand-off to the
//! communication point.

use rp_core::format_secs;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("failed to read payload summary {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed payload summary {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write payload summary {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn read(path: &Path) -> Result<Value, SummaryError> {
    let text = std::fs::read_to_string(path).map_err(|source| SummaryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SummaryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Parsed summary, or `None` if it cannot be read. Failures are logged.
pub fn load_summary(path: &Path) -> Option<Value> {
    match read(path) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

/// Empty every `executor[*].logfileReport`; those carry full log excerpts
/// the poller has no use for.
pub fn shrink(summary: &mut Value) {
    let Some(executors) = summary.get_mut("executor").and_then(Value::as_array_mut) else {
        return;
    };
    for executor in executors.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(report) = executor.get_mut("logfileReport") {
            *report = Value::Object(serde_json::Map::new());
        }
    }
}

/// Copy the summary at `src` to `dst`, shrunk.
pub fn copy_summary(src: &Path, dst: &Path) -> Result<(), SummaryError> {
    tracing::info!("copy of payload report [{}] to {}", src.display(), dst.display());
    let started = Instant::now();

    let mut summary = read(src)?;
    shrink(&mut summary);
    let json = serde_json::to_string(&summary).map_err(|source| SummaryError::Json {
        path: dst.to_path_buf(),
        source,
    })?;
    std::fs::write(dst, json).map_err(|source| SummaryError::Write {
        path: dst.to_path_buf(),
        source,
    })?;

    tracing::info!(
        "copy of payload report file took: {} sec.",
        format_secs(started.elapsed())
    );
    Ok(())
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
