// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gantry consume` - Run queued payloads until shut down

use crate::config::Config;
use crate::shutdown::install_shutdown_handler;
use anyhow::Result;
use clap::Args;
use gantry_engine::{Gantry, JobExecutor, JobRunner};
use gantry_payload::{ArchiveCodec, PathPolicy};
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ConsumeArgs {
    /// Poll once and exit
    #[arg(long)]
    pub once: bool,

    /// How long a received message stays hidden from other workers (e.g. 5m)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub visibility_timeout: Option<Duration>,

    /// Time between polls (e.g. 60s)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub poll_interval: Option<Duration>,

    /// Reject payload entries that would land outside the scratch directory
    #[arg(long)]
    pub contain_paths: bool,
}

pub async fn handle(args: ConsumeArgs, config: &Config) -> Result<()> {
    let queue = super::open_queue(config)?;

    let policy = if config.contain_paths {
        PathPolicy::Contained
    } else {
        PathPolicy::Permissive
    };
    let runner = JobRunner::new(
        ArchiveCodec::new().with_path_policy(policy),
        JobExecutor::new(config.kill_grace),
    );
    let gantry = Gantry::new(queue, runner).with_poll_interval(config.poll_interval);

    let cancel = install_shutdown_handler()?;

    tracing::info!(
        queue_dir = %config.queue_dir.display(),
        visibility_timeout_secs = config.visibility_timeout.as_secs(),
        contain_paths = config.contain_paths,
        once = args.once,
        "starting consumer"
    );

    if args.once {
        gantry.handle_message_if_exists(&cancel).await?;
        return Ok(());
    }

    gantry.run(&cancel).await?;
    Ok(())
}
