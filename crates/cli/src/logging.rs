// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup

use crate::config::{Config, LogFormat};
use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive; `RUST_LOG` replaces it when set
fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber
///
/// Logs go to stderr, or to `log_file` through a non-blocking writer. The
/// returned guard flushes that writer on drop and must live until exit.
pub fn setup_logging(config: &Config) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.debug)));

    let (writer, guard) = match &config.log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir,
                _ => std::path::Path::new("."),
            };
            std::fs::create_dir_all(dir)
                .with_context(|| format!("can not create log directory {}", dir.display()))?;
            let name = path
                .file_name()
                .with_context(|| format!("log file has no name: {}", path.display()))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };
    let ansi = config.log_file.is_none() && std::io::stderr().is_terminal();

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(writer).with_ansi(ansi))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
    }
    .context("can not install log subscriber")?;

    Ok(guard)
}
