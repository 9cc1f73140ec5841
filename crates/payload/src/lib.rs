// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Payload archive codec
//!
//! Turns a directory into a self-contained blob (tar, gzip, and by default a
//! base64 layer for text-only transports) and back, keeping relative paths,
//! file contents and permission bits.

mod codec;
mod entry;
mod error;

pub use codec::{ArchiveCodec, DecodeSummary, TransportEncoding};
pub use entry::{ArchiveEntry, EntryKind, PathPolicy, OWNER_EXEC};
pub use error::PayloadError;
