//! ETG Core - shared vocabulary for the snapshot manager
//!
//! This crate provides the types every other ETG crate speaks in:
//! - `VersionId` and `ArtifactKind`, the naming/ordering contract for
//!   snapshot and archive files
//! - The structured error facility (`ExError`, `ExErrorKind`)
//! - The logging facility (profiles, `log_op_*` macros, test capture)
//! - The card batch model produced by the data source
//! - Collaborator seams (`CardSource`, `BlobStore`)

pub mod blob;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod sensitive;
pub mod source;
pub mod version;

// Re-export commonly used types
pub use blob::{BlobStore, MemoryBlobStore};
pub use errors::{ExError, ExErrorKind, Result};
pub use model::{CardBatch, CardRecord, ImageUris, PriceQuotes};
pub use sensitive::Sensitive;
pub use source::CardSource;
pub use version::{ArtifactKind, VersionId, VersionParseError};
