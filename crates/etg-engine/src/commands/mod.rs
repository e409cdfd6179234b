//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! Every public operation here logs its own boundaries:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, online) use only `tracing::debug!()` for internal details.

pub mod archive;
pub mod snapshot;
pub mod sync;
