// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Search-path filtering for the payload environment.
//!
//! Entries on the shared parallel filesystem make every library lookup
//! and interpreter import hit the metadata servers from thousands of
//! ranks at once, so they are dropped before the payload starts.

/// Colon-separated search paths that are filtered.
pub const SEARCH_PATH_VARS: &[&str] = &["PATH", "PYTHONPATH", "LD_LIBRARY_PATH", "MODULEPATH"];

/// Drop every entry of a colon-separated path list starting with `prefix`.
pub fn filter_search_path(value: &str, prefix: &str) -> String {
    value
        .split(':')
        .filter(|entry| prefix.is_empty() || !entry.starts_with(prefix))
        .collect::<Vec<_>>()
        .join(":")
}

/// Filtered values for every search-path variable set in this process.
pub fn filtered_search_paths(prefix: &str) -> Vec<(String, String)> {
    SEARCH_PATH_VARS
        .iter()
        .filter_map(|name| {
            let value = std::env::var(name).ok()?;
            let filtered = filter_search_path(&value, prefix);
            if filtered != value {
                tracing::debug!(var = name, "dropped shared-filesystem entries");
            }
            Some((name.to_string(), filtered))
        })
        .collect()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
