// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gantry_core::Env;
use gantry_payload::PathPolicy;
use std::fs;
use std::os::unix::fs::PermissionsExt;

fn payload_with(files: &[(&str, &str, u32)]) -> Vec<u8> {
    let src = TempDir::new().unwrap();
    for (path, contents, mode) in files {
        let path = src.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(*mode)).unwrap();
    }
    ArchiveCodec::new().encode(src.path()).unwrap()
}

fn message(payload: Vec<u8>) -> Message {
    Message::new("job-1", Env::new(), payload)
}

#[tokio::test]
async fn runs_decoded_entrypoint() {
    let runner = JobRunner::default();
    let scratch = runner.scratch_dir().unwrap();
    let msg = message(payload_with(&[
        ("entrypoint.sh", "#!/bin/sh\ncat data/input.txt >&2\n", 0o755),
        ("data/input.txt", "from the payload", 0o644),
    ]));

    let report = runner
        .run(&msg, scratch.path(), &CancellationToken::new())
        .await;

    assert_eq!(report.status, JobStatus::Succeeded, "{report:?}");
    assert_eq!(report.stderr, "from the payload");
    assert_eq!(report.message_id, "job-1");
}

#[tokio::test]
async fn corrupt_payload_is_reported() {
    let runner = JobRunner::default();
    let scratch = runner.scratch_dir().unwrap();
    let msg = message(b"definitely not an archive".to_vec());

    let report = runner
        .run(&msg, scratch.path(), &CancellationToken::new())
        .await;

    assert_eq!(report.status, JobStatus::CorruptArchive);
    assert!(report.error.unwrap().contains("job-1"));
}

#[tokio::test]
async fn missing_entrypoint_is_reported() {
    let runner = JobRunner::default();
    let scratch = runner.scratch_dir().unwrap();
    let msg = message(payload_with(&[("README", "no entrypoint here", 0o644)]));

    let report = runner
        .run(&msg, scratch.path(), &CancellationToken::new())
        .await;

    assert_eq!(report.status, JobStatus::MissingEntrypoint);
    assert!(report.error.unwrap().contains("job-1"));
    assert_eq!(report.exit_code, None);
}

#[tokio::test]
async fn contained_policy_rejects_escaping_payload_as_corrupt() {
    let runner = JobRunner::new(
        ArchiveCodec::new().with_path_policy(PathPolicy::Contained),
        JobExecutor::default(),
    );
    let scratch = runner.scratch_dir().unwrap();
    // An absolute path cannot be produced by encode, so craft one by hand
    let mut builder = tar::Builder::new(flate2::write::GzEncoder::new(
        Vec::new(),
        flate2::Compression::default(),
    ));
    let mut header = tar::Header::new_old();
    header.as_old_mut().name[..13].copy_from_slice(b"../escaped.sh");
    header.set_size(0);
    header.set_mode(0o755);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();
    builder.append(&header, std::io::empty()).unwrap();
    let gz = builder.into_inner().unwrap().finish().unwrap();
    let payload = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, gz);

    let report = runner
        .run(&message(payload.into_bytes()), scratch.path(), &CancellationToken::new())
        .await;

    assert_eq!(report.status, JobStatus::CorruptArchive);
    assert!(!scratch.path().parent().unwrap().join("escaped.sh").exists());
}

#[test]
fn scratch_dirs_are_unique_and_removed_on_drop() {
    let root = TempDir::new().unwrap();
    let runner = JobRunner::default().with_scratch_root(root.path());

    let a = runner.scratch_dir().unwrap();
    let b = runner.scratch_dir().unwrap();
    assert_ne!(a.path(), b.path());
    assert!(a.path().starts_with(root.path()));
    assert!(a
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("gantry-payload"));

    let path = a.path().to_path_buf();
    drop(a);
    assert!(!path.exists());
}

#[test]
fn scratch_dir_failure_is_a_resource_error() {
    let runner = JobRunner::default().with_scratch_root("/nonexistent/scratch/root");

    let err = runner.scratch_dir().unwrap_err();
    assert!(matches!(err, GantryError::Resource(_)), "{err:?}");
}
