//! Error helpers for etg-store
//!
//! Wraps etg-core ExError with store-specific constructors

use etg_core::errors::{ExError, ExErrorKind};
use etg_core::version::{ArtifactKind, VersionId};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ))
}

/// Create a missing artifact error
pub fn artifact_missing(version: VersionId, kind: ArtifactKind) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op("resolve_version")
        .with_version(version)
        .with_message(format!(
            "There is no {} '{}'",
            kind,
            version.file_name(kind)
        ))
}

/// Create an error for an empty artifact directory
pub fn no_versions(kind: ArtifactKind, location: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op("resolve_version")
        .with_message(format!("No {} versions found in '{}'", kind, location))
}

/// Create a merge failure error for one table
pub fn merge_failed(table: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Transaction)
        .with_op("merge_table")
        .with_table(table)
        .with_message(err.to_string())
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
