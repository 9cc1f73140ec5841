// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages and deliveries
//!
//! A [`Message`] is the unit of work a publisher sends. A [`Delivery`] is one
//! receipt of that message by one consumer: it carries the receipt handle a
//! transport needs to acknowledge it. Acknowledging consumes the delivery, so
//! a delivery can be acknowledged at most once.

use crate::env::Env;
use chrono::{DateTime, Utc};

/// Name of the file every payload must carry at its root
pub const ENTRYPOINT: &str = "entrypoint.sh";

/// A unit of work as published to a queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Transport-assigned identifier
    pub id: String,
    /// When the transport accepted the message, if it reported it
    pub sent_at: Option<DateTime<Utc>>,
    /// Environment the payload runs with
    pub env: Env,
    /// Encoded archive
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(id: impl Into<String>, env: Env, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            sent_at: None,
            env,
            payload,
        }
    }

    pub fn with_sent_at(self, sent_at: DateTime<Utc>) -> Self {
        Self {
            sent_at: Some(sent_at),
            ..self
        }
    }
}

/// A message received by a consumer, pending acknowledgment
#[derive(Debug)]
pub struct Delivery {
    message: Message,
    receipt: String,
    receive_count: u32,
}

impl Delivery {
    pub fn new(message: Message, receipt: impl Into<String>) -> Self {
        Self {
            message,
            receipt: receipt.into(),
            receive_count: 1,
        }
    }

    /// Record how many times the transport has handed this message out
    pub fn with_receive_count(self, receive_count: u32) -> Self {
        Self {
            receive_count,
            ..self
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn id(&self) -> &str {
        &self.message.id
    }

    /// Handle the transport uses to acknowledge this particular receipt
    pub fn receipt(&self) -> &str {
        &self.receipt
    }

    /// 1 on first delivery, higher after a visibility timeout lapsed
    pub fn receive_count(&self) -> u32 {
        self.receive_count
    }
}
