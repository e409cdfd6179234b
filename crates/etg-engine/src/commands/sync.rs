//! Remote archive mirroring.
//!
//! Archives are uploaded under their local file names. After every push the
//! remote keeps only the newest `keep` archives; names that do not parse as
//! archive versions are never touched.

#![allow(clippy::result_large_err)]

use std::fs;

use etg_core::blob::BlobStore;
use etg_core::errors::{ExError, ExErrorKind};
use etg_core::version::{ArtifactKind, VersionId};
use etg_core::{log_op_end, log_op_error, log_op_start};
use etg_store::archive::ArchiveReport;
use etg_store::errors::{artifact_missing, io_error, no_versions, Result};
use etg_store::fs::temp_path_for;
use etg_store::snapshot_store::{requested_version, resolve_in, versions_in};
use etg_store::Archiver;

/// Remote archives kept after a push unless configured otherwise
pub const DEFAULT_KEEP: usize = 2;

/// Outcome of one push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub version: VersionId,
    pub object: String,
    /// True when the archive had to be built from the snapshot first
    pub compressed: bool,
    /// Remote versions removed by retention
    pub deleted: Vec<VersionId>,
}

/// Outcome of one pull
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    pub version: VersionId,
    pub object: String,
    pub snapshot: ArchiveReport,
}

/// Mirrors local archives to a blob store with bounded retention
pub struct RemoteSync<'a> {
    archiver: Archiver,
    blob: &'a dyn BlobStore,
    keep: usize,
}

impl<'a> RemoteSync<'a> {
    /// ## Errors
    ///
    /// `InvalidInput` when `keep` is zero.
    pub fn new(archiver: Archiver, blob: &'a dyn BlobStore, keep: usize) -> Result<Self> {
        if keep == 0 {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("remote_sync")
                .with_message("Retention must keep at least one archive"));
        }
        Ok(Self {
            archiver,
            blob,
            keep,
        })
    }

    pub fn keep(&self) -> usize {
        self.keep
    }

    /// Upload archive `requested` (or the newest local version), then
    /// enforce retention on the remote.
    ///
    /// The archive is built from the snapshot when only the snapshot exists.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: neither archive nor snapshot exists for the version
    /// - `Transport`: the upload, listing or a delete failed
    pub fn push(&self, requested: Option<u32>) -> Result<PushReport> {
        log_op_start!("remote_push", requested = ?requested, container = self.blob.container());
        let start = std::time::Instant::now();

        let report = self.push_impl(requested).map_err(|e| {
            log_op_error!(
                "remote_push",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "remote_push",
            duration_ms = start.elapsed().as_millis() as u64,
            version = %report.version,
            compressed = report.compressed,
            deleted = report.deleted.len()
        );

        Ok(report)
    }

    fn push_impl(&self, requested: Option<u32>) -> Result<PushReport> {
        let store = self.archiver.store();
        let version = match requested {
            Some(n) => requested_version(n)?,
            None => {
                let newest = store
                    .latest(ArtifactKind::Archive)?
                    .max(store.latest(ArtifactKind::Snapshot)?);
                newest.ok_or_else(|| {
                    no_versions(ArtifactKind::Snapshot, &store.root().display().to_string())
                })?
            }
        };

        let compressed = if store.exists(version, ArtifactKind::Archive) {
            false
        } else if store.exists(version, ArtifactKind::Snapshot) {
            self.archiver.compress(version)?;
            true
        } else {
            return Err(artifact_missing(version, ArtifactKind::Archive));
        };

        let object = version.file_name(ArtifactKind::Archive);
        self.blob
            .upload(&store.path_for(version, ArtifactKind::Archive), &object)
            .map_err(|e| e.with_version(version))?;
        tracing::debug!(object = %object, container = self.blob.container(), "Uploaded archive");

        let deleted = self.retain()?;

        Ok(PushReport {
            version,
            object,
            compressed,
            deleted,
        })
    }

    /// Delete all but the newest `keep` remote archives, by numeric version.
    ///
    /// Returns the deleted versions, oldest first.
    pub fn retain(&self) -> Result<Vec<VersionId>> {
        log_op_start!("remote_retain", keep = self.keep);
        let start = std::time::Instant::now();

        let deleted = self.retain_impl().map_err(|e| {
            log_op_error!(
                "remote_retain",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "remote_retain",
            duration_ms = start.elapsed().as_millis() as u64,
            deleted = deleted.len()
        );

        Ok(deleted)
    }

    fn retain_impl(&self) -> Result<Vec<VersionId>> {
        let versions = versions_in(self.blob.list()?, ArtifactKind::Archive);
        if versions.len() <= self.keep {
            return Ok(Vec::new());
        }

        let doomed = versions[..versions.len() - self.keep].to_vec();
        for version in &doomed {
            let object = version.file_name(ArtifactKind::Archive);
            self.blob.delete(&object)?;
            tracing::debug!(object = %object, "Deleted remote archive");
        }
        Ok(doomed)
    }

    /// Download remote archive `requested` (or the newest remote one) into
    /// the local archive directory and decompress it.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: the remote holds no such archive
    /// - `Transport`: listing or download failed
    pub fn pull(&self, requested: Option<u32>) -> Result<PullReport> {
        log_op_start!("remote_pull", requested = ?requested, container = self.blob.container());
        let start = std::time::Instant::now();

        let report = self.pull_impl(requested).map_err(|e| {
            log_op_error!(
                "remote_pull",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "remote_pull",
            duration_ms = start.elapsed().as_millis() as u64,
            version = %report.version,
            snapshot_bytes = report.snapshot.snapshot_bytes
        );

        Ok(report)
    }

    fn pull_impl(&self, requested: Option<u32>) -> Result<PullReport> {
        let versions = versions_in(self.blob.list()?, ArtifactKind::Archive);
        let version = resolve_in(
            &versions,
            ArtifactKind::Archive,
            requested,
            self.blob.container(),
        )?;

        let store = self.archiver.store();
        store.ensure_dirs()?;
        let object = version.file_name(ArtifactKind::Archive);
        let target = store.path_for(version, ArtifactKind::Archive);
        let temp = temp_path_for(&target);

        if let Err(e) = self.blob.download(&object, &temp) {
            let _ = fs::remove_file(&temp);
            return Err(e.with_version(version));
        }
        fs::rename(&temp, &target).map_err(|e| io_error("remote_pull", e))?;
        tracing::debug!(object = %object, path = %target.display(), "Downloaded archive");

        let snapshot = self.archiver.decompress(version)?;

        Ok(PullReport {
            version,
            object,
            snapshot,
        })
    }
}
