//! Snapshot compression
//!
//! Archives are the bzip2 byte image of a snapshot file. Compression is
//! deterministic for a given level, and decompression reproduces the
//! snapshot byte for byte.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use etg_core::version::{ArtifactKind, VersionId};

use crate::errors::{artifact_missing, io_error, Result};
use crate::fs::write_atomically;
use crate::snapshot_store::SnapshotStore;

/// Sizes observed while converting one artifact into the other
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub version: VersionId,
    pub path: PathBuf,
    pub snapshot_bytes: u64,
    pub archive_bytes: u64,
}

/// Converts snapshots to archives and back
#[derive(Debug, Clone)]
pub struct Archiver {
    store: SnapshotStore,
    level: Compression,
}

impl Archiver {
    pub fn new(store: SnapshotStore) -> Self {
        Self {
            store,
            level: Compression::best(),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Compress snapshot `version` into its archive path
    ///
    /// # Errors
    ///
    /// `NotFound` if the snapshot file is absent.
    pub fn compress(&self, version: VersionId) -> Result<ArchiveReport> {
        let source = self.store.path_for(version, ArtifactKind::Snapshot);
        let target = self.store.path_for(version, ArtifactKind::Archive);
        if !source.is_file() {
            return Err(artifact_missing(version, ArtifactKind::Snapshot));
        }

        let mut input = File::open(&source).map_err(|e| io_error("compress", e))?;
        let level = self.level;
        let snapshot_bytes = write_atomically(&target, "compress", |file| {
            let mut encoder = BzEncoder::new(file, level);
            let copied = io::copy(&mut input, &mut encoder)?;
            encoder.finish()?;
            Ok(copied)
        })?;

        let archive_bytes = file_len(&target)?;
        tracing::debug!(
            version = %version,
            snapshot_bytes,
            archive_bytes,
            "Compressed snapshot"
        );

        Ok(ArchiveReport {
            version,
            path: target,
            snapshot_bytes,
            archive_bytes,
        })
    }

    /// Decompress archive `version` into its snapshot path
    ///
    /// # Errors
    ///
    /// `NotFound` if the archive file is absent; `Io` if it is not valid bzip2.
    pub fn decompress(&self, version: VersionId) -> Result<ArchiveReport> {
        let source = self.store.path_for(version, ArtifactKind::Archive);
        let target = self.store.path_for(version, ArtifactKind::Snapshot);
        if !source.is_file() {
            return Err(artifact_missing(version, ArtifactKind::Archive));
        }

        let input = File::open(&source).map_err(|e| io_error("decompress", e))?;
        let snapshot_bytes = write_atomically(&target, "decompress", |file| {
            let mut decoder = MultiBzDecoder::new(input);
            io::copy(&mut decoder, file)
        })?;

        let archive_bytes = file_len(&source)?;
        tracing::debug!(
            version = %version,
            snapshot_bytes,
            archive_bytes,
            "Decompressed archive"
        );

        Ok(ArchiveReport {
            version,
            path: target,
            snapshot_bytes,
            archive_bytes,
        })
    }
}

fn file_len(path: &std::path::Path) -> Result<u64> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| io_error("archive_metadata", e))
}

/// Compress an in-memory buffer with the archive codec
pub fn compress_bytes(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// Decompress an in-memory archive buffer
pub fn decompress_bytes(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    MultiBzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}
