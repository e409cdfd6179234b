//! Checksum validation for migrations
//!
//! A migration whose SQL changed after it was applied to a snapshot is an
//! error, not a silent re-run.

use sha2::{Digest, Sha256};

/// Compute the hex SHA256 of a migration's SQL
pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
