//! Compress and decompress local artifacts with boundary logging.

#![allow(clippy::result_large_err)]

use etg_core::version::ArtifactKind;
use etg_core::{log_op_end, log_op_error, log_op_start};
use etg_store::archive::ArchiveReport;
use etg_store::errors::Result;
use etg_store::Archiver;

/// Compress snapshot `requested` (or the latest snapshot) into its archive
///
/// ## Errors
///
/// - `NotFound`: no such snapshot, or no snapshots at all
/// - `Io`: the archive could not be written
pub fn snapshot_zip(archiver: &Archiver, requested: Option<u32>) -> Result<ArchiveReport> {
    log_op_start!("snapshot_zip", requested = ?requested);
    let start = std::time::Instant::now();

    let report = archiver
        .store()
        .resolve(ArtifactKind::Snapshot, requested)
        .and_then(|version| archiver.compress(version))
        .map_err(|e| {
            log_op_error!(
                "snapshot_zip",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "snapshot_zip",
        duration_ms = start.elapsed().as_millis() as u64,
        version = %report.version,
        archive_bytes = report.archive_bytes
    );

    Ok(report)
}

/// Decompress archive `requested` (or the latest archive) into its snapshot
///
/// ## Errors
///
/// - `NotFound`: no such archive, or no archives at all
/// - `Io`: the archive is corrupt or the snapshot could not be written
pub fn snapshot_unzip(archiver: &Archiver, requested: Option<u32>) -> Result<ArchiveReport> {
    log_op_start!("snapshot_unzip", requested = ?requested);
    let start = std::time::Instant::now();

    let report = archiver
        .store()
        .resolve(ArtifactKind::Archive, requested)
        .and_then(|version| archiver.decompress(version))
        .map_err(|e| {
            log_op_error!(
                "snapshot_unzip",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "snapshot_unzip",
        duration_ms = start.elapsed().as_millis() as u64,
        version = %report.version,
        snapshot_bytes = report.snapshot_bytes
    );

    Ok(report)
}
