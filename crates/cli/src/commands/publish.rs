// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gantry publish` - Package a directory and enqueue it

use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use gantry_adapters::QueueAdapter;
use gantry_core::env::parse_binding;
use gantry_core::Env;
use gantry_payload::ArchiveCodec;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Directory to package; must contain an executable entrypoint.sh
    #[arg(long)]
    pub dir: PathBuf,

    /// Environment for the entrypoint, as KEY=VALUE (repeatable)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_binding)]
    pub env: Vec<(String, String)>,
}

pub async fn handle(args: PublishArgs, config: &Config) -> Result<()> {
    let env: Env = args.env.into_iter().collect();

    let payload = ArchiveCodec::new()
        .encode(&args.dir)
        .with_context(|| format!("can not package {}", args.dir.display()))?;

    let queue = super::open_queue(config)?;
    let id = queue
        .publish(&env, &payload)
        .await
        .context("publish failed")?;

    println!("Published: {}", id);
    Ok(())
}
