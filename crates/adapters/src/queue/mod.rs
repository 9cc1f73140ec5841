// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message queue adapters

mod spool;

pub use spool::{SpoolQueueAdapter, SpoolSettings};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeQueueAdapter, QueueCall};

use async_trait::async_trait;
use gantry_core::{Delivery, Env};
use std::path::PathBuf;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
    #[error("message not found: {0}")]
    NotFound(String),
    #[error("receipt expired for message {0}, it may have been redelivered")]
    ReceiptExpired(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl QueueError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| QueueError::Io { path, source }
    }
}

/// Adapter for a message queue transport
///
/// Deliveries are handed out one at a time. A delivery that is not
/// acknowledged before the transport's visibility timeout lapses becomes
/// receivable again, possibly by another consumer.
#[async_trait]
pub trait QueueAdapter: Clone + Send + Sync + 'static {
    /// Receive at most one message
    ///
    /// May wait up to the transport's long-poll window for a message to
    /// arrive. Returns `Ok(None)` when nothing arrived or `cancel` fired.
    async fn receive_one(&self, cancel: &CancellationToken) -> Result<Option<Delivery>, QueueError>;

    /// Durably remove a delivered message from the queue
    async fn acknowledge(&self, delivery: Delivery) -> Result<(), QueueError>;

    /// Publish a payload with its environment, returning the message id
    async fn publish(&self, env: &Env, payload: &[u8]) -> Result<String, QueueError>;
}
