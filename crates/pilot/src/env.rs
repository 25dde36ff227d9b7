// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the pilot.

use std::path::PathBuf;
use std::time::Duration;

/// Variables naming this process's rank, in lookup order. The first is
/// ours; the rest are set by common MPI launchers and batch systems.
pub const RANK_VARS: &[&str] = &[
    "RP_RANK",
    "PMI_RANK",
    "PMIX_RANK",
    "OMPI_COMM_WORLD_RANK",
    "SLURM_PROCID",
    "ALPS_APP_PE",
];

/// Rank assigned by the launcher, if any variable carries one.
pub fn rank() -> Option<usize> {
    RANK_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok()?.trim().parse().ok())
}

/// Fast local area override (`RP_SCRATCH_DIR`).
pub fn scratch_dir() -> Option<PathBuf> {
    std::env::var("RP_SCRATCH_DIR")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Shared-filesystem prefix dropped from search paths (`RP_SHARED_PREFIX`).
pub fn shared_prefix() -> Option<String> {
    std::env::var("RP_SHARED_PREFIX").ok()
}

/// Delay before the log packing retry (`RP_PACK_RETRY_DELAY_MS`).
pub fn pack_retry_delay() -> Option<Duration> {
    std::env::var("RP_PACK_RETRY_DELAY_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Core count forced on the payload (`ATHENA_PROC_NUMBER`).
pub fn core_count() -> Option<u32> {
    std::env::var("ATHENA_PROC_NUMBER")
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Log filter directive (`RP_LOG`, default `debug`).
pub fn log_filter() -> String {
    std::env::var("RP_LOG")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "debug".to_string())
}

/// Name of the node this rank runs on.
pub fn hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
