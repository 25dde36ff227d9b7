// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp formats shared with the external poller.

use chrono::{DateTime, FixedOffset, Utc};
use std::time::Duration;

/// ISO-8601 local time with the UTC offset sign and minutes,
/// e.g. `2024-03-01T07:00:00-05:00`.
pub fn offset_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// UTC time as recorded on job start/end, e.g. `2024-03-01 12:00:00`.
pub fn utc_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Seconds with millisecond precision, for log lines.
pub fn format_secs(elapsed: Duration) -> String {
    format!("{:.3}", elapsed.as_secs_f64())
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
