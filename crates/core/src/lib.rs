// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-core: Domain types for the rankpilot per-rank job wrapper

pub mod macros;

pub mod assignment;
pub mod clock;
pub mod extract;
pub mod job;
pub mod report;
pub mod stageout;
pub mod time_fmt;

pub use assignment::{AssignmentError, JobAssignment};
pub use clock::{Clock, FakeClock, SystemClock};
pub use extract::{copy_path, extract, walk, OutputFileInfo, PayloadReport, DEFAULT_CORE_COUNT};
pub use job::{CatalogError, InputFile, JobCatalog, JobDescriptor, JobId, JobState, OutputFile};
pub use report::{keys, WorkReport, STATUS_STARTING};
pub use stageout::{FileDescriptor, FileKind, StageOutDeclaration};
pub use time_fmt::{format_secs, offset_timestamp, utc_timestamp};
