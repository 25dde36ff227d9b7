// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync {
    /// Monotonic instant, for elapsed-time measurements.
    fn now(&self) -> Instant;
    /// Wall-clock time in UTC.
    fn utc_now(&self) -> DateTime<Utc>;
    /// Wall-clock time in the host's local offset.
    fn local_now(&self) -> DateTime<FixedOffset>;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<Instant>>,
    wall: Arc<Mutex<DateTime<Utc>>>,
    offset: Arc<Mutex<FixedOffset>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
            wall: Arc::new(Mutex::new(
                Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default(),
            )),
            offset: Arc::new(Mutex::new(Utc.fix())),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        *self.current.lock() += duration;
        let delta = chrono::Duration::from_std(duration).unwrap_or_default();
        let mut wall = self.wall.lock();
        *wall += delta;
    }

    /// Set the wall-clock time
    pub fn set_utc(&self, at: DateTime<Utc>) {
        *self.wall.lock() = at;
    }

    /// Set the local UTC offset, in seconds east of UTC
    pub fn set_offset_secs(&self, secs: i32) {
        if let Some(offset) = FixedOffset::east_opt(secs) {
            *self.offset.lock() = offset;
        }
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        *self.wall.lock()
    }

    fn local_now(&self) -> DateTime<FixedOffset> {
        let offset = *self.offset.lock();
        self.wall.lock().with_timezone(&offset)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
