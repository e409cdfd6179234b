//! Atomic write primitives
//!
//! Uses temp→rename so a snapshot or archive path never holds a partially
//! written file. Temp files are named `<file>.tmp`, which never parses as a
//! version and is therefore invisible to listings.

use crate::errors::{io_error, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Temp path used while `target` is being written
pub fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Fill a temp file through `fill`, then rename it over `target`.
///
/// On any failure the temp file is removed and `target` is left untouched.
/// Returns whatever `fill` returns (typically a byte count).
pub fn write_atomically<F>(target: &Path, op: &str, fill: F) -> Result<u64>
where
    F: FnOnce(&mut File) -> io::Result<u64>,
{
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(op, e))?;
    }

    let temp_path = temp_path_for(target);
    let result = File::create(&temp_path)
        .and_then(|mut file| {
            let written = fill(&mut file)?;
            file.sync_all()?;
            Ok(written)
        })
        .and_then(|written| fs::rename(&temp_path, target).map(|_| written));

    match result {
        Ok(written) => Ok(written),
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(io_error(op, e))
        }
    }
}

/// Atomically copy `source` to `target`, byte for byte
pub fn atomic_copy(source: &Path, target: &Path) -> Result<u64> {
    let mut input = File::open(source).map_err(|e| io_error("atomic_copy", e))?;
    write_atomically(target, "atomic_copy", |file| io::copy(&mut input, file))
}
