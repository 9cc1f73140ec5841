// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod consume;
pub mod publish;

use crate::config::Config;
use anyhow::{Context, Result};
use gantry_adapters::{SpoolQueueAdapter, SpoolSettings, TracedQueueAdapter};

/// Open the configured spool, wrapped for tracing
pub fn open_queue(config: &Config) -> Result<TracedQueueAdapter<SpoolQueueAdapter>> {
    let settings = SpoolSettings {
        visibility_timeout: config.visibility_timeout,
        receive_wait: config.receive_wait,
        ..SpoolSettings::default()
    };
    let spool = SpoolQueueAdapter::open(&config.queue_dir, settings)
        .with_context(|| format!("can not open queue at {}", config.queue_dir.display()))?;
    Ok(TracedQueueAdapter::new(spool))
}
