// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem spool queue
//!
//! Each message is a pair of files under `<root>/messages`: a JSON record
//! holding its metadata and delivery state, and the raw payload bytes.
//! Claims and acknowledgments run under an exclusive lock on
//! `<root>/spool.lock`, so any number of worker processes can share a spool.

use super::{QueueAdapter, QueueError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use gantry_core::{Clock, Delivery, Env, Message, SystemClock};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const MESSAGES_DIR: &str = "messages";
const LOCK_FILE: &str = "spool.lock";
const RECORD_EXT: &str = "json";
const PAYLOAD_EXT: &str = "payload";

/// Delivery timing of a spool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpoolSettings {
    /// How long a received message stays hidden from other consumers
    pub visibility_timeout: Duration,
    /// How long `receive_one` waits for a message to arrive
    pub receive_wait: Duration,
    /// Re-check interval while waiting
    pub poll_step: Duration,
}

impl Default for SpoolSettings {
    fn default() -> Self {
        Self {
            visibility_timeout: Duration::from_secs(300),
            receive_wait: Duration::from_secs(20),
            poll_step: Duration::from_millis(250),
        }
    }
}

/// On-disk message record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpoolRecord {
    id: String,
    sent_at: DateTime<Utc>,
    env: Env,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    receipt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    visible_after: Option<DateTime<Utc>>,
    #[serde(default)]
    receive_count: u32,
}

impl SpoolRecord {
    fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.visible_after.is_none_or(|t| t <= now)
    }
}

/// Held while mutating the spool; the lock is released when the file closes
struct SpoolLock {
    _file: File,
}

/// Queue adapter backed by a spool directory
#[derive(Clone)]
pub struct SpoolQueueAdapter<C: Clock = SystemClock> {
    root: PathBuf,
    settings: SpoolSettings,
    clock: C,
}

impl SpoolQueueAdapter<SystemClock> {
    /// Open (creating if needed) the spool at `root`
    pub fn open(root: impl Into<PathBuf>, settings: SpoolSettings) -> Result<Self, QueueError> {
        Self::with_clock(root, settings, SystemClock)
    }
}

impl<C: Clock> SpoolQueueAdapter<C> {
    pub fn with_clock(
        root: impl Into<PathBuf>,
        settings: SpoolSettings,
        clock: C,
    ) -> Result<Self, QueueError> {
        let root = root.into();
        let messages = root.join(MESSAGES_DIR);
        fs::create_dir_all(&messages).map_err(QueueError::io(&messages))?;
        Ok(Self {
            root,
            settings,
            clock,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> SpoolSettings {
        self.settings
    }

    /// Number of messages in the spool, visible or not
    pub fn depth(&self) -> Result<usize, QueueError> {
        Ok(self.record_paths()?.len())
    }

    fn messages_dir(&self) -> PathBuf {
        self.root.join(MESSAGES_DIR)
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.messages_dir().join(format!("{}.{}", id, RECORD_EXT))
    }

    fn payload_path(&self, id: &str) -> PathBuf {
        self.messages_dir().join(format!("{}.{}", id, PAYLOAD_EXT))
    }

    fn lock(&self) -> Result<SpoolLock, QueueError> {
        let path = self.root.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(QueueError::io(&path))?;
        file.lock_exclusive().map_err(QueueError::io(&path))?;
        Ok(SpoolLock { _file: file })
    }

    fn record_paths(&self) -> Result<Vec<PathBuf>, QueueError> {
        let dir = self.messages_dir();
        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir).map_err(QueueError::io(&dir))? {
            let path = entry.map_err(QueueError::io(&dir))?.path();
            if path.extension().is_some_and(|e| e == RECORD_EXT) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Claim the oldest visible message, if any
    fn try_claim(&self) -> Result<Option<Delivery>, QueueError> {
        let _lock = self.lock()?;
        let now = self.clock.now();

        let mut visible = Vec::new();
        for path in self.record_paths()? {
            match read_record(&path) {
                Ok(record) if record.is_visible(now) => visible.push((path, record)),
                Ok(_) => {}
                // Removed by a consumer that does not take the lock, or torn
                Err(e) => tracing::warn!(error = %e, "skipping unreadable spool record"),
            }
        }
        visible.sort_by(|(_, a), (_, b)| a.sent_at.cmp(&b.sent_at).then(a.id.cmp(&b.id)));

        let Some((path, mut record)) = visible.into_iter().next() else {
            return Ok(None);
        };

        let receipt = uuid::Uuid::new_v4().to_string();
        let visible_after = chrono::Duration::from_std(self.settings.visibility_timeout)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        record.receipt = Some(receipt.clone());
        record.visible_after = Some(visible_after);
        record.receive_count += 1;
        write_record(&path, &record)?;

        let payload_path = self.payload_path(&record.id);
        let payload = match fs::read(&payload_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(message_id = %record.id, "received message without payload");
                Vec::new()
            }
            Err(e) => return Err(QueueError::Io { path: payload_path, source: e }),
        };

        tracing::debug!(
            message_id = %record.id,
            visibility_timeout_secs = self.settings.visibility_timeout.as_secs(),
            "claimed message, invisible to other consumers until the timeout lapses"
        );

        let message = Message::new(record.id, record.env, payload).with_sent_at(record.sent_at);
        Ok(Some(
            Delivery::new(message, receipt).with_receive_count(record.receive_count),
        ))
    }
}

#[async_trait]
impl<C: Clock> QueueAdapter for SpoolQueueAdapter<C> {
    async fn receive_one(&self, cancel: &CancellationToken) -> Result<Option<Delivery>, QueueError> {
        let deadline = tokio::time::Instant::now() + self.settings.receive_wait;
        loop {
            if let Some(delivery) = self.try_claim()? {
                return Ok(Some(delivery));
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let step = self.settings.poll_step.min(deadline - now);
            tokio::select! {
                _ = cancel.cancelled() => return Ok(None),
                _ = tokio::time::sleep(step) => {}
            }
        }
    }

    async fn acknowledge(&self, delivery: Delivery) -> Result<(), QueueError> {
        let _lock = self.lock()?;
        let id = delivery.id();
        let path = self.record_path(id);

        let record = match read_record(&path) {
            Ok(record) => record,
            Err(QueueError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                return Err(QueueError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e),
        };
        if record.receipt.as_deref() != Some(delivery.receipt()) {
            return Err(QueueError::ReceiptExpired(id.to_string()));
        }

        fs::remove_file(&path).map_err(QueueError::io(&path))?;
        let payload_path = self.payload_path(id);
        match fs::remove_file(&payload_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(QueueError::Io { path: payload_path, source: e }),
        }
        Ok(())
    }

    async fn publish(&self, env: &Env, payload: &[u8]) -> Result<String, QueueError> {
        let record = SpoolRecord {
            id: uuid::Uuid::new_v4().to_string(),
            sent_at: self.clock.now(),
            env: env.clone(),
            receipt: None,
            visible_after: None,
            receive_count: 0,
        };

        // Payload first: a record is only ever visible with its payload beside it
        let payload_path = self.payload_path(&record.id);
        fs::write(&payload_path, payload).map_err(QueueError::io(&payload_path))?;
        write_record(&self.record_path(&record.id), &record)?;

        Ok(record.id)
    }
}

fn read_record(path: &Path) -> Result<SpoolRecord, QueueError> {
    let json = fs::read_to_string(path).map_err(QueueError::io(path))?;
    serde_json::from_str(&json).map_err(|e| QueueError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Replace a record atomically
fn write_record(path: &Path, record: &SpoolRecord) -> Result<(), QueueError> {
    let json = serde_json::to_string_pretty(record).map_err(|e| QueueError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).map_err(QueueError::io(&tmp))?;
    fs::rename(&tmp, path).map_err(QueueError::io(path))?;
    Ok(())
}

#[cfg(test)]
#[path = "spool_tests.rs"]
mod tests;
