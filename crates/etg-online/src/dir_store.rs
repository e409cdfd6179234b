//! A local directory used as a blob container
//!
//! Handy for air-gapped mirrors and for exercising push/pull without a
//! cloud account. Writes go through temp files, so listings never show a
//! half-written object.

use std::fs;
use std::path::{Path, PathBuf};

use etg_core::blob::BlobStore;
use etg_core::errors::{ExError, ExErrorKind};
use etg_core::Result;
use etg_store::fs::atomic_copy;

use crate::errors::{local_io_error, store_io_error};

pub struct DirBlobStore {
    root: PathBuf,
    name: String,
}

impl DirBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root.display().to_string();
        Self { root, name }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, name: &str) -> Result<PathBuf> {
        let plain = Path::new(name)
            .file_name()
            .map(|f| f == name)
            .unwrap_or(false);
        if !plain {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("blob_object")
                .with_message(format!("'{}' is not a plain object name", name)));
        }
        Ok(self.root.join(name))
    }
}

impl BlobStore for DirBlobStore {
    fn container(&self) -> &str {
        &self.name
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(store_io_error("blob_list", &self.root, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| store_io_error("blob_list", &self.root, e))?;
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if !name.ends_with(".tmp") => names.push(name),
                _ => {}
            }
        }
        names.sort();
        Ok(names)
    }

    fn upload(&self, local: &Path, name: &str) -> Result<()> {
        let target = self.object_path(name)?;
        fs::metadata(local).map_err(|e| local_io_error("blob_upload", local, e))?;
        let bytes = atomic_copy(local, &target).map_err(|e| {
            ExError::new(ExErrorKind::Transport)
                .with_op("blob_upload")
                .with_message(format!("Could not store '{}' in '{}'", name, self.name))
                .with_source(e)
        })?;
        tracing::debug!(object = name, bytes, container = %self.name, "Stored object");
        Ok(())
    }

    fn download(&self, name: &str, local: &Path) -> Result<()> {
        let source = self.object_path(name)?;
        if !source.is_file() {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("blob_download")
                .with_message(format!("No object '{}' in '{}'", name, self.name)));
        }
        fs::copy(&source, local).map_err(|e| store_io_error("blob_download", &source, e))?;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let target = self.object_path(name)?;
        match fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_io_error("blob_delete", &target, e)),
        }
    }
}
