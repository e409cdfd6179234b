//! Remote blob store interface
//!
//! Archives are mirrored into a single named container under the same
//! `etg_v<n>.bz2` names they carry locally.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use crate::errors::{ExError, ExErrorKind, Result};

/// Opaque object store holding archives by name.
pub trait BlobStore: Send + Sync {
    /// Name of the container (bucket, directory) objects live in
    fn container(&self) -> &str;

    /// List every object name in the container.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Transport` if the store cannot be listed.
    fn list(&self) -> Result<Vec<String>>;

    /// Upload a local file under `name`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Io` if the local file cannot be read and
    /// `ExErrorKind::Transport` if the upload fails.
    fn upload(&self, local: &Path, name: &str) -> Result<()>;

    /// Download object `name` into a local file.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::NotFound` if the object does not exist and
    /// `ExErrorKind::Transport` if the download fails.
    fn download(&self, name: &str, local: &Path) -> Result<()>;

    /// Delete object `name`.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Transport` if the delete fails.
    fn delete(&self, name: &str) -> Result<()>;
}

/// In-process blob store, used by tests
pub struct MemoryBlobStore {
    name: String,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    /// Store an object directly, bypassing `upload`
    pub fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(name.into(), bytes);
        }
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(name).cloned()
    }

    /// Object names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn poisoned() -> ExError {
        ExError::new(ExErrorKind::Internal).with_message("memory blob store lock poisoned")
    }
}

impl BlobStore for MemoryBlobStore {
    fn container(&self) -> &str {
        &self.name
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.names())
    }

    fn upload(&self, local: &Path, name: &str) -> Result<()> {
        let bytes = fs::read(local).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("blob_upload")
                .with_message(format!("{}: {}", local.display(), e))
        })?;
        self.objects
            .lock()
            .map_err(|_| Self::poisoned())?
            .insert(name.to_string(), bytes);
        Ok(())
    }

    fn download(&self, name: &str, local: &Path) -> Result<()> {
        let bytes = self.get(name).ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op("blob_download")
                .with_message(format!("No object '{}' in '{}'", name, self.name))
        })?;
        fs::write(local, bytes).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("blob_download")
                .with_message(format!("{}: {}", local.display(), e))
        })
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.objects
            .lock()
            .map_err(|_| Self::poisoned())?
            .remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_upload_download() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("in.bz2");
        let dst = dir.path().join("out.bz2");
        fs::write(&src, b"archive bytes").unwrap();

        let store = MemoryBlobStore::new("etg-data");
        store.upload(&src, "etg_v1.bz2").unwrap();
        store.download("etg_v1.bz2", &dst).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), b"archive bytes");
        assert_eq!(store.list().unwrap(), vec!["etg_v1.bz2".to_string()]);
    }

    #[test]
    fn test_memory_store_missing_object() {
        let dir = TempDir::new().unwrap();
        let store = MemoryBlobStore::new("etg-data");
        let err = store
            .download("etg_v9.bz2", &dir.path().join("x"))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_memory_store_delete() {
        let store = MemoryBlobStore::new("etg-data");
        store.insert("etg_v1.bz2", vec![1]);
        store.insert("etg_v2.bz2", vec![2]);
        store.delete("etg_v1.bz2").unwrap();
        assert_eq!(store.names(), vec!["etg_v2.bz2".to_string()]);
    }
}
