//! Scryfall bulk-data source
//!
//! Two requests: the bulk descriptor names a `download_uri`, which serves the
//! full card array as one JSON document. Scryfall regenerates bulk files once
//! a day, so fetching more often only repeats the same data.

use std::time::Duration;

use etg_core::model::CardRecord;
use etg_core::source::CardSource;
use etg_core::Result;
use serde::Deserialize;

use crate::errors::{http_error, status_error};
use crate::http_client;

/// Descriptor of the "default cards" bulk file
pub const DEFAULT_BULK_URL: &str = "https://api.scryfall.com/bulk-data/default_cards";

/// Bulk files run to hundreds of megabytes
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Deserialize)]
struct BulkDescriptor {
    download_uri: String,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Fetches the default-cards bulk file over HTTPS
pub struct ScryfallSource {
    bulk_url: String,
    client: reqwest::blocking::Client,
}

impl ScryfallSource {
    /// # Errors
    ///
    /// Returns `Transport` if the HTTP client cannot be built.
    pub fn new(bulk_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            bulk_url: bulk_url.into(),
            client: http_client(DOWNLOAD_TIMEOUT)?,
        })
    }

    pub fn bulk_url(&self) -> &str {
        &self.bulk_url
    }

    fn descriptor(&self) -> Result<BulkDescriptor> {
        let response = self
            .client
            .get(&self.bulk_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|e| http_error("bulk_descriptor", e))?;
        if !response.status().is_success() {
            return Err(status_error("bulk_descriptor", &self.bulk_url, response.status()));
        }
        response
            .json::<BulkDescriptor>()
            .map_err(|e| http_error("bulk_descriptor", e))
    }
}

impl CardSource for ScryfallSource {
    fn fetch(&self) -> Result<Vec<CardRecord>> {
        let descriptor = self.descriptor()?;
        tracing::debug!(
            download_uri = %descriptor.download_uri,
            updated_at = ?descriptor.updated_at,
            "Resolved bulk file"
        );

        let response = self
            .client
            .get(&descriptor.download_uri)
            .send()
            .map_err(|e| http_error("bulk_download", e))?;
        if !response.status().is_success() {
            return Err(status_error(
                "bulk_download",
                &descriptor.download_uri,
                response.status(),
            ));
        }

        let bytes = response
            .bytes()
            .map_err(|e| http_error("bulk_download", e))?;
        let records: Vec<CardRecord> = serde_json::from_slice(&bytes)?;
        tracing::debug!(records = records.len(), bytes = bytes.len(), "Downloaded bulk file");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("scryfall bulk data ({})", self.bulk_url)
    }
}
