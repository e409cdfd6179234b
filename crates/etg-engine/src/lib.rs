//! ETG Engine - Orchestration layer
//!
//! Coordinates the store primitives into the operations the CLI exposes:
//! updating and forking snapshots, archiving them, and mirroring archives to
//! a remote blob store with bounded retention.

pub mod commands;

pub use commands::archive::{snapshot_unzip, snapshot_zip};
pub use commands::snapshot::{SnapshotUpdater, UpdateReport};
pub use commands::sync::{PullReport, PushReport, RemoteSync, DEFAULT_KEEP};
