// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::queue::{QueueAdapter, QueueError};
use async_trait::async_trait;
use gantry_core::{Delivery, Env};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Wrapper that adds tracing to any QueueAdapter
#[derive(Clone)]
pub struct TracedQueueAdapter<Q> {
    inner: Q,
}

impl<Q> TracedQueueAdapter<Q> {
    pub fn new(inner: Q) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<Q: QueueAdapter> QueueAdapter for TracedQueueAdapter<Q> {
    async fn receive_one(&self, cancel: &CancellationToken) -> Result<Option<Delivery>, QueueError> {
        let span = tracing::debug_span!("queue.receive");
        async {
            let start = std::time::Instant::now();
            let result = self.inner.receive_one(cancel).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(Some(delivery)) => tracing::debug!(
                    message_id = delivery.id(),
                    receive_count = delivery.receive_count(),
                    payload_len = delivery.message().payload.len(),
                    elapsed_ms,
                    "received message"
                ),
                Ok(None) => tracing::trace!(elapsed_ms, "no message"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "receive failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn acknowledge(&self, delivery: Delivery) -> Result<(), QueueError> {
        let span = tracing::debug_span!("queue.acknowledge", message_id = delivery.id());
        async move {
            if delivery.receive_count() > 1 {
                tracing::debug!(
                    receive_count = delivery.receive_count(),
                    "acknowledging redelivered message"
                );
            }

            let start = std::time::Instant::now();
            let result = self.inner.acknowledge(delivery).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "acknowledged"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "acknowledge failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn publish(&self, env: &Env, payload: &[u8]) -> Result<String, QueueError> {
        let span = tracing::info_span!("queue.publish", payload_len = payload.len());
        async {
            tracing::info!(env = %env, "starting");

            // Precondition: a payload always carries at least the archive framing
            if payload.is_empty() {
                tracing::error!("refusing to publish an empty payload");
                return Err(QueueError::Transport("payload is empty".to_string()));
            }

            let start = std::time::Instant::now();
            let result = self.inner.publish(env, payload).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(id) => tracing::info!(message_id = %id, elapsed_ms, "published"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "publish failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
