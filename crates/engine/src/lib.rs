// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Gantry worker engine: job execution and the poll loop

mod error;
mod executor;
mod gantry;
mod job;

pub use error::{GantryError, JobError};
pub use executor::{ExecutionResult, JobExecutor};
pub use gantry::{log_report, Gantry, DEFAULT_POLL_INTERVAL};
pub use job::JobRunner;
