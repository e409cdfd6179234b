//! Snapshot schema migrations
//!
//! Provides:
//! - Ordered SQL migrations embedded at compile time
//! - Checksums recorded per applied migration and verified on every open
//! - Idempotent application, inside the caller's transaction if needed

mod checksums;
mod embedded;
mod runner;

pub use embedded::{get_migrations, Migration};
pub use runner::{applied_migrations, apply_migrations, apply_pending};
