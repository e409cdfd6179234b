//! Subcommand implementations
//!
//! Each module exposes clap argument structs and `execute` functions that
//! delegate to the engine.

pub mod archive;
pub mod remote;
pub mod snapshot;

use std::path::PathBuf;

use clap::Args;
use etg_core::blob::BlobStore;
use etg_core::Sensitive;
use etg_online::{DirBlobStore, GcsBlobStore};
use etg_store::SnapshotStore;

use crate::config::{Config, RemoteBackend};

/// Version selector shared by every subcommand
#[derive(Debug, Args)]
pub struct VersionArgs {
    /// Version number; defaults to the latest
    #[arg(short = 'v', long = "version")]
    pub version: Option<u32>,
}

/// Resolved configuration handed to every command
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub store: SnapshotStore,
}

impl Context {
    pub fn new(config: Config, data_root: Option<PathBuf>) -> Self {
        let root = data_root.unwrap_or_else(|| config.storage.data_root.clone());
        Self {
            store: SnapshotStore::new(root),
            config,
        }
    }

    /// The configured remote archive container
    pub fn blob_store(&self) -> etg_core::Result<Box<dyn BlobStore>> {
        let remote = &self.config.remote;
        match remote.backend {
            RemoteBackend::Dir => Ok(Box::new(DirBlobStore::new(remote.dir.clone()))),
            RemoteBackend::Gcs => {
                let token = std::env::var(&remote.token_env).ok().map(Sensitive::new);
                if token.is_none() {
                    tracing::debug!(
                        token_env = %remote.token_env,
                        "No bearer token set, using anonymous access"
                    );
                }
                Ok(Box::new(GcsBlobStore::new(remote.bucket.clone(), token)?))
            }
        }
    }
}
