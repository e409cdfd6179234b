//! Structured logging facility for ETG
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Canonical field and event names (`schema`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use etg_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```
//!
//! Orchestrating commands log their boundaries with the macros; lower layers
//! only use `tracing::debug!` for internal details.

pub mod init;
pub mod macros;
pub mod schema;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
