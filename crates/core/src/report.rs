// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured completion report
//!
//! Every received message produces exactly one report, whatever happened to
//! it. It is the primary operational signal of the worker.

use crate::env::Env;
use crate::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How a job ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Entrypoint exited 0
    Succeeded,
    /// Entrypoint exited non-zero or could not be launched
    Failed,
    /// Entrypoint was killed because the worker is shutting down
    Cancelled,
    /// Payload could not be decoded
    CorruptArchive,
    /// Payload has no `entrypoint.sh` at its root
    MissingEntrypoint,
    /// `entrypoint.sh` lacks the owner-executable bit
    NotExecutable,
    /// Worker could not allocate resources for the job
    Resource,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::CorruptArchive => "corrupt_archive",
            JobStatus::MissingEntrypoint => "missing_entrypoint",
            JobStatus::NotExecutable => "not_executable",
            JobStatus::Resource => "resource",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Succeeded)
    }

    /// Whether the entrypoint was actually started
    pub fn did_execute(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub message_id: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub env: Env,
    pub status: JobStatus,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Underlying error text for anything other than a clean exit
    pub error: Option<String>,
    pub elapsed_ms: u64,
    /// Whether the transport confirmed the acknowledgment
    pub acknowledged: bool,
}

impl JobReport {
    /// Start a report for a message; outcome fields are filled in later
    pub fn for_message(message: &Message, status: JobStatus) -> Self {
        Self {
            message_id: message.id.clone(),
            sent_at: message.sent_at,
            env: message.env.clone(),
            status,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            error: None,
            elapsed_ms: 0,
            acknowledged: false,
        }
    }

    pub fn with_error(self, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..self
        }
    }

    pub fn with_elapsed(self, elapsed: Duration) -> Self {
        Self {
            elapsed_ms: elapsed.as_millis() as u64,
            ..self
        }
    }

    pub fn success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
