//! Error helpers for etg-online
//!
//! Every network failure surfaces as `Transport`; a missing remote object is
//! `NotFound` so callers can tell the two apart.

use etg_core::errors::{ExError, ExErrorKind};
use reqwest::StatusCode;

/// Create a transport error from a failed request
pub fn http_error(op: &str, err: reqwest::Error) -> ExError {
    ExError::new(ExErrorKind::Transport)
        .with_op(op.to_string())
        .with_message(err.to_string())
}

/// Create an error for an unsuccessful HTTP status
pub fn status_error(op: &str, url: &str, status: StatusCode) -> ExError {
    let kind = if status == StatusCode::NOT_FOUND {
        ExErrorKind::NotFound
    } else {
        ExErrorKind::Transport
    };
    ExError::new(kind)
        .with_op(op.to_string())
        .with_message(format!("Request to {} failed, got: {}", url, status))
}

/// Create a transport error for a directory-backed container
pub fn store_io_error(op: &str, path: &std::path::Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Transport)
        .with_op(op.to_string())
        .with_message(format!("{}: {}", path.display(), err))
}

/// Create an IO error for a local file touched by a transfer
pub fn local_io_error(op: &str, path: &std::path::Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(op.to_string())
        .with_message(format!("{}: {}", path.display(), err))
}
