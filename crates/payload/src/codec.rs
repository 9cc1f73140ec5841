// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory ⇄ payload transcoding

use crate::entry::{ArchiveEntry, EntryKind, PathPolicy};
use crate::PayloadError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::borrow::Cow;
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{Read, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tar::{Archive, Builder, EntryType, Header};

const MODE_MASK: u32 = 0o7777;

/// Text-safe layer wrapped around the compressed archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportEncoding {
    /// Standard-alphabet base64, for transports that only carry text
    #[default]
    Base64,
    /// Raw gzip bytes
    None,
}

impl TransportEncoding {
    fn apply(self, compressed: Vec<u8>) -> Vec<u8> {
        match self {
            TransportEncoding::Base64 => STANDARD.encode(compressed).into_bytes(),
            TransportEncoding::None => compressed,
        }
    }

    fn remove(self, payload: &[u8]) -> Result<Cow<'_, [u8]>, PayloadError> {
        match self {
            TransportEncoding::Base64 => {
                // Line breaks are tolerated, as MIME-style encoders insert them
                let text: Vec<u8> = payload
                    .iter()
                    .copied()
                    .filter(|b| !b.is_ascii_whitespace())
                    .collect();
                STANDARD
                    .decode(text)
                    .map(Cow::Owned)
                    .map_err(|e| PayloadError::corrupt("base64 layer", e))
            }
            TransportEncoding::None => Ok(Cow::Borrowed(payload)),
        }
    }
}

/// Counts of what a decode wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub files: usize,
    pub directories: usize,
    /// Entries of a kind the codec does not extract (links, devices, ...)
    pub skipped: usize,
}

/// Encodes directories into payloads and decodes payloads into directories
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveCodec {
    encoding: TransportEncoding,
    paths: PathPolicy,
}

impl ArchiveCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(self, encoding: TransportEncoding) -> Self {
        Self { encoding, ..self }
    }

    pub fn with_path_policy(self, paths: PathPolicy) -> Self {
        Self { paths, ..self }
    }

    /// Pack the contents of `src` into a payload
    ///
    /// Entry paths are relative to `src` itself, so the directory's own name
    /// never appears in the archive. Directories get their own entries so
    /// empty ones survive the trip.
    pub fn encode(&self, src: &Path) -> Result<Vec<u8>, PayloadError> {
        if src.as_os_str().is_empty() {
            return Err(PayloadError::InvalidInput(
                "source directory not specified".to_string(),
            ));
        }
        let metadata = fs::metadata(src).map_err(|e| {
            PayloadError::InvalidInput(format!("can not stat {}: {}", src.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(PayloadError::InvalidInput(format!(
                "{} is not a directory",
                src.display()
            )));
        }

        let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let mut summary = DecodeSummary::default();
        append_tree(&mut builder, src, Path::new(""), &mut summary)?;

        let gz = builder.into_inner().map_err(PayloadError::io(src))?;
        let compressed = gz.finish().map_err(PayloadError::io(src))?;

        tracing::debug!(
            src = %src.display(),
            files = summary.files,
            directories = summary.directories,
            skipped = summary.skipped,
            compressed_len = compressed.len(),
            "encoded payload"
        );

        Ok(self.encoding.apply(compressed))
    }

    /// Unpack a payload under `dest`
    ///
    /// Directories are created as needed, files are overwritten and get the
    /// recorded permission bits. Entries of other kinds, and entries whose
    /// header can not be interpreted, are skipped; damage to the container
    /// itself aborts the whole decode.
    pub fn decode(&self, payload: &[u8], dest: &Path) -> Result<DecodeSummary, PayloadError> {
        let compressed = self.encoding.remove(payload)?;
        let mut archive = Archive::new(GzDecoder::new(&compressed[..]));
        let entries = archive
            .entries()
            .map_err(|e| PayloadError::corrupt("archive", e))?;

        let mut summary = DecodeSummary::default();
        for entry in entries {
            let mut entry = entry.map_err(|e| PayloadError::corrupt("archive entry", e))?;
            let rel = match entry.path() {
                Ok(rel) => rel.into_owned(),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping entry with unreadable path");
                    summary.skipped += 1;
                    continue;
                }
            };
            let rel = self.paths.check(&rel)?;
            let target = dest.join(rel);

            match entry.header().entry_type() {
                EntryType::Directory => {
                    fs::create_dir_all(&target).map_err(PayloadError::io(&target))?;
                    summary.directories += 1;
                }
                EntryType::Regular | EntryType::Continuous => {
                    let mode = match entry.header().mode() {
                        Ok(mode) => mode & MODE_MASK,
                        Err(e) => {
                            tracing::debug!(
                                path = %rel.display(),
                                error = %e,
                                "skipping entry with unreadable mode"
                            );
                            summary.skipped += 1;
                            continue;
                        }
                    };
                    let mut contents = Vec::with_capacity(entry.size() as usize);
                    entry
                        .read_to_end(&mut contents)
                        .map_err(|e| PayloadError::corrupt("entry contents", e))?;
                    write_file(&target, mode, &contents)?;
                    summary.files += 1;
                }
                other => {
                    tracing::debug!(path = %rel.display(), kind = ?other, "skipping entry");
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }

    /// List the entries of a payload without extracting it
    pub fn list(&self, payload: &[u8]) -> Result<Vec<ArchiveEntry>, PayloadError> {
        let compressed = self.encoding.remove(payload)?;
        let mut archive = Archive::new(GzDecoder::new(&compressed[..]));
        let entries = archive
            .entries()
            .map_err(|e| PayloadError::corrupt("archive", e))?;

        let mut listed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PayloadError::corrupt("archive entry", e))?;
            let kind = match entry.header().entry_type() {
                EntryType::Directory => EntryKind::Directory,
                EntryType::Regular | EntryType::Continuous => EntryKind::File,
                _ => continue,
            };
            // Same entries decode would skip
            let (Ok(path), Ok(mode)) = (entry.path(), entry.header().mode()) else {
                continue;
            };
            listed.push(ArchiveEntry {
                path: path.into_owned(),
                kind,
                mode: mode & MODE_MASK,
                size: entry.size(),
            });
        }
        Ok(listed)
    }
}

/// Append the children of `dir` under the archive path `rel`, depth first
fn append_tree<W: Write>(
    builder: &mut Builder<W>,
    dir: &Path,
    rel: &Path,
    summary: &mut DecodeSummary,
) -> Result<(), PayloadError> {
    let mut children = fs::read_dir(dir)
        .map_err(PayloadError::io(dir))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(PayloadError::io(dir))?;
    // Stable order keeps payloads reproducible for the same tree
    children.sort_by_key(|c| c.file_name());

    for child in children {
        let path = child.path();
        let rel_path = rel.join(child.file_name());
        let file_type = child.file_type().map_err(PayloadError::io(&path))?;
        let metadata = child.metadata().map_err(PayloadError::io(&path))?;

        let mut header = Header::new_gnu();
        header.set_mode(metadata.permissions().mode() & MODE_MASK);
        header.set_mtime(
            metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0),
        );

        if file_type.is_dir() {
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
            builder
                .append_data(&mut header, &rel_path, std::io::empty())
                .map_err(PayloadError::io(&path))?;
            summary.directories += 1;
            append_tree(builder, &path, &rel_path, summary)?;
        } else if file_type.is_file() {
            header.set_entry_type(EntryType::Regular);
            header.set_size(metadata.len());
            let file = File::open(&path).map_err(PayloadError::io(&path))?;
            builder
                .append_data(&mut header, &rel_path, file)
                .map_err(PayloadError::io(&path))?;
            summary.files += 1;
        } else {
            tracing::debug!(path = %path.display(), "skipping non-regular file");
            summary.skipped += 1;
        }
    }

    Ok(())
}

fn write_file(target: &Path, mode: u32, contents: &[u8]) -> Result<(), PayloadError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(PayloadError::io(parent))?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(target)
        .map_err(PayloadError::io(target))?;
    file.write_all(contents).map_err(PayloadError::io(target))?;
    // `mode` above is filtered by the umask and ignored for existing files
    fs::set_permissions(target, Permissions::from_mode(mode)).map_err(PayloadError::io(target))?;
    Ok(())
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
