//! Local snapshot and archive files
//!
//! Layout under the data root:
//!
//! ```text
//! <root>/db/etg_v<n>.db    snapshots
//! <root>/zip/etg_v<n>.bz2  archives
//! ```
//!
//! Version resolution works on plain name listings so the same rules apply
//! to a directory on disk and to a remote container listing.

use std::fs;
use std::path::{Path, PathBuf};

use etg_core::errors::{ExError, ExErrorKind};
use etg_core::version::{parse_file_name, ArtifactKind, VersionId};

use crate::errors::{artifact_missing, io_error, no_versions, Result};

/// Versions named in `names` for `kind`, ascending; unparsable names skipped
pub fn versions_in<I, S>(names: I, kind: ArtifactKind) -> Vec<VersionId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut versions: Vec<VersionId> = names
        .into_iter()
        .filter_map(|name| match parse_file_name(name.as_ref()) {
            Ok((version, found)) if found == kind => Some(version),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(name = name.as_ref(), error = %err, "Skipping unversioned file");
                None
            }
        })
        .collect();
    versions.sort();
    versions.dedup();
    versions
}

/// Resolve a requested version (or the latest) against a name listing
pub fn resolve_in(
    versions: &[VersionId],
    kind: ArtifactKind,
    requested: Option<u32>,
    location: &str,
) -> Result<VersionId> {
    match requested {
        Some(n) => {
            let version = requested_version(n)?;
            if versions.contains(&version) {
                Ok(version)
            } else {
                Err(artifact_missing(version, kind))
            }
        }
        None => versions
            .iter()
            .max()
            .copied()
            .ok_or_else(|| no_versions(kind, location)),
    }
}

/// Validate a user-supplied version number
pub fn requested_version(n: u32) -> Result<VersionId> {
    VersionId::new(n).ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("resolve_version")
            .with_message("Versions start at 1")
    })
}

/// Snapshot/archive directories under one injected data root
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding artifacts of `kind`
    pub fn dir(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Deterministic path for a version's artifact
    pub fn path_for(&self, version: VersionId, kind: ArtifactKind) -> PathBuf {
        self.dir(kind).join(version.file_name(kind))
    }

    pub fn exists(&self, version: VersionId, kind: ArtifactKind) -> bool {
        self.path_for(version, kind).is_file()
    }

    /// Create both artifact directories
    pub fn ensure_dirs(&self) -> Result<()> {
        for kind in [ArtifactKind::Snapshot, ArtifactKind::Archive] {
            fs::create_dir_all(self.dir(kind)).map_err(|e| io_error("ensure_dirs", e))?;
        }
        Ok(())
    }

    /// Versions present on disk for `kind`, ascending
    ///
    /// A missing directory is an empty listing, not an error.
    pub fn list_versions(&self, kind: ArtifactKind) -> Result<Vec<VersionId>> {
        let dir = self.dir(kind);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list_versions", e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error("list_versions", e))?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        Ok(versions_in(names, kind))
    }

    /// Highest version present for `kind`, or `None` when there are none
    pub fn latest(&self, kind: ArtifactKind) -> Result<Option<VersionId>> {
        Ok(self.list_versions(kind)?.into_iter().max())
    }

    /// The requested version if its file exists, else the latest
    ///
    /// # Errors
    ///
    /// `NotFound` when the requested file is absent or no versions exist.
    pub fn resolve(&self, kind: ArtifactKind, requested: Option<u32>) -> Result<VersionId> {
        match requested {
            Some(n) => {
                let version = requested_version(n)?;
                if self.exists(version, kind) {
                    Ok(version)
                } else {
                    Err(artifact_missing(version, kind))
                }
            }
            None => {
                let versions = self.list_versions(kind)?;
                resolve_in(&versions, kind, None, &self.dir(kind).display().to_string())
            }
        }
    }
}
