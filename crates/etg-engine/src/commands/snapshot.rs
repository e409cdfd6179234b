//! Snapshot update and fork.
//!
//! An update merges one card batch into a snapshot inside a single
//! transaction; a fork (increment) copies a snapshot's bytes into the next
//! version number.

#![allow(clippy::result_large_err)]

use std::fs;
use std::path::Path;

use etg_core::errors::{ExError, ExErrorKind};
use etg_core::model::CardBatch;
use etg_core::version::{ArtifactKind, VersionId};
use etg_core::{log_op_end, log_op_error, log_op_start};
use etg_store::errors::Result;
use etg_store::fs::atomic_copy;
use etg_store::migrations::apply_pending;
use etg_store::query::{self, TableOverview};
use etg_store::{db, MergeReport, SnapshotStore, TableMerger};

/// Outcome of one update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub version: VersionId,
    /// True when this update created the snapshot file
    pub created: bool,
    pub merge: MergeReport,
}

/// Applies card batches to local snapshots
#[derive(Debug, Clone)]
pub struct SnapshotUpdater {
    store: SnapshotStore,
    merger: TableMerger,
}

impl SnapshotUpdater {
    pub fn new(store: SnapshotStore, merger: TableMerger) -> Self {
        Self { store, merger }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Merge `batch` into snapshot `requested`, or the latest snapshot.
    ///
    /// With no snapshots on disk and no explicit version, version 1 is
    /// created. All three tables are merged in one transaction.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: the requested snapshot does not exist
    /// - `Transaction`: a table merge failed; nothing was changed
    pub fn update(&self, batch: &CardBatch, requested: Option<u32>) -> Result<UpdateReport> {
        log_op_start!("snapshot_update", records = batch.len(), utc = %batch.utc);
        let start = std::time::Instant::now();

        let report = self.update_impl(batch, requested).map_err(|e| {
            log_op_error!(
                "snapshot_update",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "snapshot_update",
            duration_ms = start.elapsed().as_millis() as u64,
            version = %report.version,
            created = report.created,
            prices_pruned = report.merge.prices_pruned
        );

        Ok(report)
    }

    fn update_impl(&self, batch: &CardBatch, requested: Option<u32>) -> Result<UpdateReport> {
        let (version, created) = match requested {
            Some(n) => (self.store.resolve(ArtifactKind::Snapshot, Some(n))?, false),
            None => match self.store.latest(ArtifactKind::Snapshot)? {
                Some(latest) => (latest, false),
                None => (VersionId::FIRST, true),
            },
        };

        self.store.ensure_dirs()?;
        let path = self.store.path_for(version, ArtifactKind::Snapshot);

        match merge_into(&path, &self.merger, batch) {
            Ok(merge) => Ok(UpdateReport {
                version,
                created,
                merge,
            }),
            Err(e) => {
                // A snapshot this call created must not outlive the failed update
                if created {
                    if let Err(remove_err) = fs::remove_file(&path) {
                        tracing::debug!(error = %remove_err, "Could not remove new snapshot");
                    }
                }
                Err(e.with_version(version))
            }
        }
    }

    /// Fork snapshot `requested` (or the latest) into the next version.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no source snapshot
    /// - `AlreadyExists`: the next version is already on disk
    pub fn increment(&self, requested: Option<u32>) -> Result<VersionId> {
        log_op_start!("snapshot_increment", requested = ?requested);
        let start = std::time::Instant::now();

        let target = self.increment_impl(requested).map_err(|e| {
            log_op_error!(
                "snapshot_increment",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "snapshot_increment",
            duration_ms = start.elapsed().as_millis() as u64,
            version = %target
        );

        Ok(target)
    }

    fn increment_impl(&self, requested: Option<u32>) -> Result<VersionId> {
        let source = self.store.resolve(ArtifactKind::Snapshot, requested)?;
        let target = source.next();
        if target == source || self.store.exists(target, ArtifactKind::Snapshot) {
            return Err(ExError::new(ExErrorKind::AlreadyExists)
                .with_op("snapshot_increment")
                .with_version(target)
                .with_message(format!(
                    "'{}' already exists",
                    target.file_name(ArtifactKind::Snapshot)
                )));
        }

        let bytes = atomic_copy(
            &self.store.path_for(source, ArtifactKind::Snapshot),
            &self.store.path_for(target, ArtifactKind::Snapshot),
        )?;
        tracing::debug!(source = %source, target = %target, bytes, "Forked snapshot");

        Ok(target)
    }

    /// Table overview of snapshot `requested` (or the latest)
    pub fn info(
        &self,
        requested: Option<u32>,
        head: usize,
    ) -> Result<(VersionId, Vec<TableOverview>)> {
        let version = self.store.resolve(ArtifactKind::Snapshot, requested)?;
        let conn = db::open(self.store.path_for(version, ArtifactKind::Snapshot))?;
        let overview = query::info(&conn, head).map_err(|e| e.with_version(version))?;
        Ok((version, overview))
    }

    /// Reclaim free pages in snapshot `requested` (or the latest)
    pub fn vacuum(&self, requested: Option<u32>) -> Result<VersionId> {
        log_op_start!("snapshot_vacuum", requested = ?requested);
        let start = std::time::Instant::now();

        let result = self
            .store
            .resolve(ArtifactKind::Snapshot, requested)
            .and_then(|version| {
                let conn = db::open(self.store.path_for(version, ArtifactKind::Snapshot))?;
                query::vacuum(&conn).map_err(|e| e.with_version(version))?;
                Ok(version)
            });

        match result {
            Ok(version) => {
                log_op_end!(
                    "snapshot_vacuum",
                    duration_ms = start.elapsed().as_millis() as u64,
                    version = %version
                );
                Ok(version)
            }
            Err(e) => {
                log_op_error!(
                    "snapshot_vacuum",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(e)
            }
        }
    }
}

/// Open `path`, bring its schema up to date and merge, all in one transaction
fn merge_into(path: &Path, merger: &TableMerger, batch: &CardBatch) -> Result<MergeReport> {
    let mut conn = db::open(path)?;
    let tx = conn.transaction().map_err(|e| {
        ExError::new(ExErrorKind::Transaction)
            .with_op("snapshot_begin")
            .with_message(e.to_string())
    })?;

    apply_pending(&tx).map_err(|e| {
        ExError::new(ExErrorKind::Transaction)
            .with_op("ensure_schema")
            .with_message("Snapshot tables could not be brought up to date")
            .with_source(e)
    })?;
    let report = merger.merge(&tx, batch)?;

    tx.commit().map_err(|e| {
        ExError::new(ExErrorKind::Transaction)
            .with_op("snapshot_commit")
            .with_message(e.to_string())
    })?;
    Ok(report)
}
