// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal-driven shutdown

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Cancel the returned token on the first SIGTERM or SIGINT
///
/// Every suspension point of the worker observes this token: the receive
/// long-poll, the running entrypoint and the wait between polls.
pub fn install_shutdown_handler() -> Result<CancellationToken> {
    let mut sigterm = signal(SignalKind::terminate()).context("can not install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("can not install SIGINT handler")?;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => tracing::info!("received SIGINT, shutting down"),
        }
        trigger.cancel();
    });

    Ok(token)
}
