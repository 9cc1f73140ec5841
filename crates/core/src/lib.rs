// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gantry-core: shared types for the gantry worker
//!
//! This crate provides:
//! - The environment mapping carried by every message
//! - Messages and deliveries as handed over by a queue transport
//! - The structured completion report produced for every job
//! - A clock abstraction for testable visibility timeouts

pub mod clock;
pub mod env;
pub mod message;
pub mod report;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use env::{Env, EnvError};
pub use message::{Delivery, Message, ENTRYPOINT};
pub use report::{JobReport, JobStatus};
