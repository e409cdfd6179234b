//! ETG Online - network and filesystem collaborators
//!
//! Implementations of the core seams:
//! - `CardSource`: `ScryfallSource` (bulk-data API) and `JsonFileSource`
//!   (a previously saved bulk file)
//! - `BlobStore`: `GcsBlobStore` (Cloud Storage JSON API) and `DirBlobStore`
//!   (a local directory standing in for a bucket)

pub mod dir_store;
pub mod errors;
pub mod gcs;
pub mod json_file;
pub mod scryfall;

pub use dir_store::DirBlobStore;
pub use gcs::GcsBlobStore;
pub use json_file::JsonFileSource;
pub use scryfall::ScryfallSource;

use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("etg/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client shared by the online collaborators
///
/// # Errors
///
/// Returns `Transport` if the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> etg_core::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| errors::http_error("http_client", e))
}
