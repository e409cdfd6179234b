//! Version identifiers encoded in snapshot and archive filenames
//!
//! Every artifact on disk (and every object in the remote container) is named
//! `etg_v<n>.<ext>`. The integer `n` is the only thing that orders versions;
//! the extension only says which kind of artifact the file is.

use std::fmt;
use thiserror::Error;

/// Literal prefix shared by every artifact filename
pub const FILE_PREFIX: &str = "etg";

/// The two artifact kinds kept for each version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Uncompressed SQLite database (`.db`)
    Snapshot,
    /// bzip2-compressed byte image of a snapshot (`.bz2`)
    Archive,
}

impl ArtifactKind {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Snapshot => "db",
            ArtifactKind::Archive => "bz2",
        }
    }

    /// Directory name under the data root
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArtifactKind::Snapshot => "db",
            ArtifactKind::Archive => "zip",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "db" => Some(ArtifactKind::Snapshot),
            "bz2" => Some(ArtifactKind::Archive),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Snapshot => write!(f, "snapshot"),
            ArtifactKind::Archive => write!(f, "archive"),
        }
    }
}

/// Reasons a filename is not a valid artifact name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    /// Name does not split into exactly prefix, version and extension
    #[error("'{name}' is not of the form etg_v<n>.<ext>")]
    Malformed { name: String },

    /// First segment is not the literal prefix
    #[error("'{name}' does not start with 'etg_'")]
    Prefix { name: String },

    /// Version segment is not `v` followed by a canonical positive integer
    #[error("'{name}' has an invalid version segment '{segment}'")]
    Version { name: String, segment: String },

    /// Extension is neither `db` nor `bz2`
    #[error("'{name}' has unknown extension '{ext}'")]
    Extension { name: String, ext: String },
}

/// Totally ordered version number, `n >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionId(u32);

impl VersionId {
    pub const FIRST: VersionId = VersionId(1);

    /// Build a version from its integer, rejecting zero
    pub fn new(n: u32) -> Option<Self> {
        (n >= 1).then_some(Self(n))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// The version an increment forks into
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Parse a filename, ignoring which kind of artifact it names
    pub fn parse(filename: &str) -> Result<Self, VersionParseError> {
        parse_file_name(filename).map(|(version, _)| version)
    }

    /// Canonical filename for this version and artifact kind
    pub fn file_name(self, kind: ArtifactKind) -> String {
        format(self.0, kind.extension())
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Format `etg_v<n>.<ext>`
pub fn format(n: u32, ext: &str) -> String {
    format!("{}_v{}.{}", FILE_PREFIX, n, ext)
}

/// Parse `etg_v<n>.<ext>` into its version and artifact kind
///
/// Leading zeros are rejected so that parsing and formatting are inverses.
pub fn parse_file_name(filename: &str) -> Result<(VersionId, ArtifactKind), VersionParseError> {
    let segments: Vec<&str> = filename.split(['_', '.']).collect();
    let [prefix, version, ext] = segments.as_slice() else {
        return Err(VersionParseError::Malformed {
            name: filename.to_string(),
        });
    };

    if *prefix != FILE_PREFIX {
        return Err(VersionParseError::Prefix {
            name: filename.to_string(),
        });
    }

    let bad_version = || VersionParseError::Version {
        name: filename.to_string(),
        segment: version.to_string(),
    };
    let digits = version.strip_prefix('v').ok_or_else(bad_version)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || digits.starts_with('0')
    {
        return Err(bad_version());
    }
    let n: u32 = digits.parse().map_err(|_| bad_version())?;

    let kind = ArtifactKind::from_extension(ext).ok_or_else(|| VersionParseError::Extension {
        name: filename.to_string(),
        ext: ext.to_string(),
    })?;

    Ok((VersionId(n), kind))
}
