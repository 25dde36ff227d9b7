// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-shell: payload command construction and blocking child-process launch

mod command;
mod env;
mod error;
mod launch;

pub use command::{PayloadCommand, DEFAULT_INPUT_FLAG, DEFAULT_STRIPPED_TOKENS};
pub use env::{filter_search_path, filtered_search_paths, SEARCH_PATH_VARS};
pub use error::LaunchError;
pub use launch::{LaunchOutcome, PayloadLauncher};
