// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archive entries and path policy

use crate::PayloadError;
use std::path::{Component, Path, PathBuf};

/// Owner-executable permission bit
pub const OWNER_EXEC: u32 = 0o100;

/// Kind of an archive entry the codec understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One entry of an encoded payload, as listed without extracting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path relative to the packaged directory's contents
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Permission bits (`0o7777` mask)
    pub mode: u32,
    /// Content length; 0 for directories
    pub size: u64,
}

impl ArchiveEntry {
    pub fn is_owner_executable(&self) -> bool {
        self.mode & OWNER_EXEC != 0
    }
}

/// How decode treats entry paths that point outside the destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathPolicy {
    /// Write every entry where its recorded path says
    #[default]
    Permissive,
    /// Reject absolute paths and `..` components
    Contained,
}

impl PathPolicy {
    pub(crate) fn check<'a>(&self, path: &'a Path) -> Result<&'a Path, PayloadError> {
        if *self == PathPolicy::Permissive {
            return Ok(path);
        }
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(PayloadError::UnsafePath(path.display().to_string()));
        }
        Ok(path)
    }
}
