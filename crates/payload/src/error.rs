// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the payload codec

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a payload
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("corrupt archive: {0}")]
    CorruptArchive(String),
    #[error("unsafe entry path: {0}")]
    UnsafePath(String),
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PayloadError {
    pub(crate) fn corrupt(context: &str, err: impl std::fmt::Display) -> Self {
        PayloadError::CorruptArchive(format!("{}: {}", context, err))
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| PayloadError::Io { path, source }
    }
}
