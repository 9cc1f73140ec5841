// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use gantry_adapters::QueueError;
use gantry_core::JobStatus;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a job never got to run its entrypoint
#[derive(Debug, Error)]
pub enum JobError {
    #[error("message {message_id}: payload has no entrypoint.sh at its root")]
    MissingEntrypoint { message_id: String },
    #[error("message {message_id}: entrypoint.sh is not executable by its owner")]
    NotExecutable { message_id: String },
    #[error("message {message_id}: can not stat {}: {source}", path.display())]
    Inspect {
        message_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JobError {
    /// Report status for a job that ended with this error
    pub fn status(&self) -> JobStatus {
        match self {
            JobError::MissingEntrypoint { .. } => JobStatus::MissingEntrypoint,
            JobError::NotExecutable { .. } => JobStatus::NotExecutable,
            JobError::Inspect { .. } => JobStatus::Failed,
        }
    }
}

/// Errors that stop the poll loop
#[derive(Debug, Error)]
pub enum GantryError {
    #[error("receive failed: {0}")]
    Transport(#[from] QueueError),
    #[error("can not create scratch directory: {0}")]
    Resource(#[source] std::io::Error),
}
