// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gantry - queue-driven remote execution worker

mod commands;
mod config;
mod logging;
mod shutdown;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{consume, publish};
use config::{Config, LogFormat, Overrides};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gantry",
    version,
    about = "Gantry - run packaged directories delivered through a message queue"
)]
struct Cli {
    /// Queue spool directory
    #[arg(long, global = true)]
    queue_dir: Option<PathBuf>,

    /// TOML config file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "output", global = true, value_enum)]
    output: Option<LogFormat>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Package a directory and publish it with an environment
    Publish(publish::PublishArgs),
    /// Receive and run published payloads
    Consume(consume::ConsumeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut flags = Overrides {
        queue_dir: cli.queue_dir,
        log_format: cli.output,
        debug: cli.debug,
        ..Overrides::default()
    };
    if let Commands::Consume(args) = &cli.command {
        flags.visibility_timeout = args.visibility_timeout;
        flags.poll_interval = args.poll_interval;
        flags.contain_paths = args.contain_paths;
    }
    let config = Config::load(cli.config.as_deref(), flags)?;

    let _log_guard = logging::setup_logging(&config)?;

    match cli.command {
        Commands::Publish(args) => publish::handle(args, &config).await,
        Commands::Consume(args) => consume::handle(args, &config).await,
    }
}
