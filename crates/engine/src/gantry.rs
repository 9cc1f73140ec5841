// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll loop
//!
//! Polls once immediately and then once per tick. Each poll receives at
//! most one message, runs it to completion and acknowledges it, so a worker
//! never has more than one job in flight.

use crate::error::GantryError;
use crate::job::JobRunner;
use gantry_adapters::QueueAdapter;
use gantry_core::{Delivery, JobReport, JobStatus};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default time between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Queue-driven worker
pub struct Gantry<Q> {
    queue: Q,
    runner: JobRunner,
    poll_interval: Duration,
}

impl<Q: QueueAdapter> Gantry<Q> {
    pub fn new(queue: Q, runner: JobRunner) -> Self {
        Self {
            queue,
            runner,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..self
        }
    }

    /// Poll until `cancel` fires or a fatal error occurs
    pub async fn run(&self, cancel: &CancellationToken) -> Result<(), GantryError> {
        tracing::info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "gantry started"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        // A long job should not be followed by a burst of catch-up polls
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.handle_message_if_exists(cancel).await?;
            if cancel.is_cancelled() {
                break;
            }
        }

        tracing::info!("gantry stopped");
        Ok(())
    }

    /// One poll attempt: receive at most one message and process it
    ///
    /// Returns the job's report, or None when nothing was received.
    pub async fn handle_message_if_exists(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<JobReport>, GantryError> {
        let Some(delivery) = self.queue.receive_one(cancel).await? else {
            tracing::debug!("no message");
            return Ok(None);
        };
        self.process(delivery, cancel).await.map(Some)
    }

    async fn process(
        &self,
        delivery: Delivery,
        cancel: &CancellationToken,
    ) -> Result<JobReport, GantryError> {
        let start = Instant::now();
        let message = delivery.message().clone();
        tracing::info!(
            message_id = %message.id,
            receive_count = delivery.receive_count(),
            payload_len = message.payload.len(),
            "processing message"
        );

        let scratch = match self.runner.scratch_dir() {
            Ok(scratch) => scratch,
            Err(e) => {
                let mut report = JobReport::for_message(&message, JobStatus::Resource)
                    .with_error(e.to_string())
                    .with_elapsed(start.elapsed());
                report.acknowledged = self.acknowledge(delivery).await;
                log_report(&report);
                return Err(e);
            }
        };

        let report = self.runner.run(&message, scratch.path(), cancel).await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            tracing::warn!(
                message_id = %message.id,
                path = %scratch_path.display(),
                error = %e,
                "failed to remove scratch directory"
            );
        }

        let mut report = report.with_elapsed(start.elapsed());
        report.acknowledged = self.acknowledge(delivery).await;
        log_report(&report);
        Ok(report)
    }

    /// Acknowledge regardless of job outcome; failures are logged only
    async fn acknowledge(&self, delivery: Delivery) -> bool {
        let message_id = delivery.id().to_string();
        match self.queue.acknowledge(delivery).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    message_id = %message_id,
                    error = %e,
                    "acknowledge failed, message will be redelivered"
                );
                false
            }
        }
    }
}

/// Emit the single completion record of a job
pub fn log_report(report: &JobReport) {
    let sent_at = report.sent_at.map(|t| t.to_rfc3339());
    macro_rules! emit {
        ($level:ident) => {
            tracing::$level!(
                message_id = %report.message_id,
                sent_at = sent_at.as_deref(),
                status = %report.status,
                success = report.success(),
                exit_code = report.exit_code,
                stderr = %report.stderr,
                stdout = %report.stdout,
                error = report.error.as_deref(),
                env = %report.env,
                elapsed_ms = report.elapsed_ms,
                acknowledged = report.acknowledged,
                "job completed"
            )
        };
    }
    if report.success() {
        emit!(info);
    } else {
        emit!(warn);
    }
}

#[cfg(test)]
#[path = "gantry_tests.rs"]
mod tests;
