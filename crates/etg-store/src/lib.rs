//! ETG Store - local persistence for versioned snapshots
//!
//! Provides:
//! - SQLite connection management and embedded schema migrations
//! - Compile-time table descriptions and the transactional table merger
//! - `SnapshotStore` for listing and resolving snapshot/archive files
//! - `Archiver` for bzip2 compression round-tripping
//! - Read queries used by the CLI (`info`, joins, date ranges, vacuum)

pub mod archive;
pub mod db;
pub mod errors;
pub mod fs;
pub mod merge;
pub mod migrations;
pub mod query;
pub mod schema;
pub mod snapshot_store;

// Re-export key types
pub use archive::Archiver;
pub use errors::Result;
pub use merge::{MergeReport, TableMerger};
pub use snapshot_store::SnapshotStore;
