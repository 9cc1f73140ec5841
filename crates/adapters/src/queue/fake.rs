// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake queue adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{QueueAdapter, QueueError};
use async_trait::async_trait;
use gantry_core::{Delivery, Env, Message};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Recorded queue call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    Receive,
    Acknowledge { id: String, receipt: String },
    Publish { env: Env, payload_len: usize },
}

#[derive(Default)]
struct FakeQueueState {
    pending: VecDeque<Message>,
    in_flight: HashMap<String, String>,
    acknowledged: Vec<String>,
    calls: Vec<QueueCall>,
    receive_error: Option<String>,
    fail_acknowledgments: bool,
    next_id: u64,
}

/// In-memory queue adapter for testing
///
/// Messages are handed out in push order. A received message stays in flight
/// until acknowledged; nothing is ever redelivered.
#[derive(Clone, Default)]
pub struct FakeQueueAdapter {
    inner: Arc<Mutex<FakeQueueState>>,
}

impl FakeQueueAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeQueueState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue a message as if a publisher had sent it
    pub fn push(&self, message: Message) {
        self.state().pending.push_back(message);
    }

    /// Make the next receive fail with a transport error
    pub fn fail_next_receive(&self, reason: impl Into<String>) {
        self.state().receive_error = Some(reason.into());
    }

    /// Make every acknowledgment fail from now on
    pub fn fail_acknowledgments(&self) {
        self.state().fail_acknowledgments = true;
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<QueueCall> {
        self.state().calls.clone()
    }

    /// Ids of acknowledged messages, in acknowledgment order
    pub fn acknowledged(&self) -> Vec<String> {
        self.state().acknowledged.clone()
    }

    /// Number of messages not yet received
    pub fn pending(&self) -> usize {
        self.state().pending.len()
    }

    /// Number of messages received but not acknowledged
    pub fn in_flight(&self) -> usize {
        self.state().in_flight.len()
    }
}

#[async_trait]
impl QueueAdapter for FakeQueueAdapter {
    async fn receive_one(&self, cancel: &CancellationToken) -> Result<Option<Delivery>, QueueError> {
        let mut state = self.state();
        state.calls.push(QueueCall::Receive);

        if let Some(reason) = state.receive_error.take() {
            return Err(QueueError::Transport(reason));
        }
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let Some(message) = state.pending.pop_front() else {
            return Ok(None);
        };
        state.next_id += 1;
        let receipt = format!("receipt-{}", state.next_id);
        state.in_flight.insert(message.id.clone(), receipt.clone());
        Ok(Some(Delivery::new(message, receipt)))
    }

    async fn acknowledge(&self, delivery: Delivery) -> Result<(), QueueError> {
        let mut state = self.state();
        state.calls.push(QueueCall::Acknowledge {
            id: delivery.id().to_string(),
            receipt: delivery.receipt().to_string(),
        });

        if state.fail_acknowledgments {
            return Err(QueueError::Transport("acknowledge refused".to_string()));
        }
        match state.in_flight.get(delivery.id()) {
            None => Err(QueueError::NotFound(delivery.id().to_string())),
            Some(receipt) if receipt != delivery.receipt() => {
                Err(QueueError::ReceiptExpired(delivery.id().to_string()))
            }
            Some(_) => {
                state.in_flight.remove(delivery.id());
                state.acknowledged.push(delivery.id().to_string());
                Ok(())
            }
        }
    }

    async fn publish(&self, env: &Env, payload: &[u8]) -> Result<String, QueueError> {
        let mut state = self.state();
        state.calls.push(QueueCall::Publish {
            env: env.clone(),
            payload_len: payload.len(),
        });

        state.next_id += 1;
        let id = format!("msg-{}", state.next_id);
        state
            .pending
            .push_back(Message::new(id.clone(), env.clone(), payload.to_vec()));
        Ok(id)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
