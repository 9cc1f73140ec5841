// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entrypoint execution
//!
//! Runs `entrypoint.sh` from a decoded payload as a child process with an
//! explicit working directory and exactly the message environment. The
//! worker's own working directory and environment are never touched.

use crate::error::JobError;
use gantry_core::{Env, JobStatus, ENTRYPOINT};
use gantry_payload::OWNER_EXEC;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Outcome of a launched (or attempted) entrypoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// `Succeeded`, `Failed` or `Cancelled`
    pub status: JobStatus,
    /// None when the process could not be launched or was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Launch or wait failure, or the reason a non-zero exit was reported
    pub error: Option<String>,
}

impl ExecutionResult {
    fn launch_failed(err: std::io::Error) -> Self {
        Self {
            status: JobStatus::Failed,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(format!("can not launch {}: {}", ENTRYPOINT, err)),
        }
    }

    pub fn success(&self) -> bool {
        self.status.is_success()
    }
}

/// Runs entrypoints
#[derive(Debug, Clone)]
pub struct JobExecutor {
    kill_grace: Duration,
}

impl Default for JobExecutor {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl JobExecutor {
    /// `kill_grace` bounds how long a killed child may take to be reaped
    /// and to release its output pipes
    pub fn new(kill_grace: Duration) -> Self {
        Self { kill_grace }
    }

    /// Run `scratch/entrypoint.sh` with `env` as its entire environment
    ///
    /// A missing or non-executable entrypoint is an error; anything that
    /// happens once launching is attempted is reported in the result.
    pub async fn run(
        &self,
        message_id: &str,
        scratch: &Path,
        env: &Env,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, JobError> {
        let entrypoint = scratch.join(ENTRYPOINT);
        let metadata = match tokio::fs::metadata(&entrypoint).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(JobError::MissingEntrypoint {
                    message_id: message_id.to_string(),
                });
            }
            Err(source) => {
                return Err(JobError::Inspect {
                    message_id: message_id.to_string(),
                    path: entrypoint,
                    source,
                });
            }
        };
        if !metadata.is_file() || metadata.permissions().mode() & OWNER_EXEC == 0 {
            return Err(JobError::NotExecutable {
                message_id: message_id.to_string(),
            });
        }

        let mut child = match Command::new(&entrypoint)
            .current_dir(scratch)
            .env_clear()
            .envs(env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return Ok(ExecutionResult::launch_failed(e)),
        };
        tracing::debug!(message_id, pid = child.id(), "entrypoint started");

        let stdout = Capture::spawn(child.stdout.take());
        let stderr = Capture::spawn(child.stderr.take());

        let (waited, cancelled) = tokio::select! {
            waited = child.wait() => (waited, false),
            _ = cancel.cancelled() => {
                tracing::info!(message_id, "cancelled, killing entrypoint");
                if let Err(e) = child.start_kill() {
                    tracing::warn!(message_id, error = %e, "failed to kill entrypoint");
                }
                let waited = match tokio::time::timeout(self.kill_grace, child.wait()).await {
                    Ok(waited) => waited,
                    Err(_) => Err(std::io::Error::new(
                        ErrorKind::TimedOut,
                        "entrypoint not reaped within the kill grace period",
                    )),
                };
                (waited, true)
            }
        };

        // Descendants of the entrypoint may still hold the pipes open
        let stdout = stdout.finish(cancel, self.kill_grace).await;
        let stderr = stderr.finish(cancel, self.kill_grace).await;

        if stdout.is_empty() && stderr.is_empty() && !cancelled {
            tracing::warn!(
                message_id,
                "entrypoint produced no output, check that it starts with a shebang"
            );
        }

        let result = match waited {
            Ok(status) => ExecutionResult {
                status: if cancelled {
                    JobStatus::Cancelled
                } else if status.success() {
                    JobStatus::Succeeded
                } else {
                    JobStatus::Failed
                },
                exit_code: status.code(),
                error: exit_error(status, cancelled),
                stdout,
                stderr,
            },
            Err(e) => ExecutionResult {
                status: if cancelled {
                    JobStatus::Cancelled
                } else {
                    JobStatus::Failed
                },
                exit_code: None,
                error: Some(format!("can not wait for {}: {}", ENTRYPOINT, e)),
                stdout,
                stderr,
            },
        };
        Ok(result)
    }
}

fn exit_error(status: ExitStatus, cancelled: bool) -> Option<String> {
    if cancelled {
        return Some(format!("cancelled by shutdown ({})", status));
    }
    if status.success() {
        return None;
    }
    Some(format!("{} {}", ENTRYPOINT, status))
}

/// Output of one child stream, collected in the background
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

impl Capture {
    fn spawn<R: AsyncRead + Unpin + Send + 'static>(stream: Option<R>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let task = stream.map(|mut stream| {
            let buf = Arc::clone(&buf);
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .extend_from_slice(&chunk[..n]),
                    }
                }
            })
        });
        Self { buf, task }
    }

    /// Wait for the stream to close and return what was read
    ///
    /// Once `cancel` fires the stream gets at most `grace` more before the
    /// reader is abandoned.
    async fn finish(mut self, cancel: &CancellationToken, grace: Duration) -> String {
        if let Some(mut task) = self.task.take() {
            tokio::select! {
                _ = &mut task => {}
                _ = cancel.cancelled() => {
                    if tokio::time::timeout(grace, &mut task).await.is_err() {
                        task.abort();
                    }
                }
            }
        }
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
