// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One message, one job: scratch directory, decode, execute

use crate::error::GantryError;
use crate::executor::JobExecutor;
use gantry_core::{JobReport, JobStatus, Message};
use gantry_payload::ArchiveCodec;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const SCRATCH_PREFIX: &str = "gantry-payload";

/// Turns a message into a completion report
#[derive(Debug, Clone, Default)]
pub struct JobRunner {
    codec: ArchiveCodec,
    executor: JobExecutor,
    /// Parent of scratch directories; the system temp dir when unset
    scratch_root: Option<PathBuf>,
}

impl JobRunner {
    pub fn new(codec: ArchiveCodec, executor: JobExecutor) -> Self {
        Self {
            codec,
            executor,
            scratch_root: None,
        }
    }

    pub fn with_scratch_root(self, root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: Some(root.into()),
            ..self
        }
    }

    /// Allocate a fresh, uniquely named scratch directory
    ///
    /// The directory and everything in it is removed when the guard drops.
    pub fn scratch_dir(&self) -> Result<TempDir, GantryError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(GantryError::Resource)
    }

    /// Decode the payload into `scratch` and run its entrypoint
    ///
    /// Every per-message failure ends up in the report; nothing here is
    /// fatal to the caller.
    pub async fn run(
        &self,
        message: &Message,
        scratch: &Path,
        cancel: &CancellationToken,
    ) -> JobReport {
        match self.codec.decode(&message.payload, scratch) {
            Ok(summary) => tracing::debug!(
                message_id = %message.id,
                files = summary.files,
                directories = summary.directories,
                skipped = summary.skipped,
                "payload decoded"
            ),
            Err(e) => {
                return JobReport::for_message(message, JobStatus::CorruptArchive)
                    .with_error(format!("message {}: {}", message.id, e));
            }
        }

        match self
            .executor
            .run(&message.id, scratch, &message.env, cancel)
            .await
        {
            Ok(result) => JobReport {
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
                error: result.error,
                ..JobReport::for_message(message, result.status)
            },
            Err(e) => JobReport::for_message(message, e.status()).with_error(e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
