//! Google Cloud Storage through the JSON API
//!
//! Authentication is a bearer token obtained out of band (for example
//! `gcloud auth print-access-token`). Without a token only public buckets
//! can be read.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use etg_core::blob::BlobStore;
use etg_core::errors::{ExError, ExErrorKind};
use etg_core::{Result, Sensitive};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::errors::{http_error, local_io_error, status_error};
use crate::http_client;

const API_BASE: &str = "https://storage.googleapis.com/storage/v1/";
const UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1/";
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(900);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    name: String,
}

/// One bucket, addressed through the Cloud Storage JSON API
pub struct GcsBlobStore {
    bucket: String,
    token: Option<Sensitive<String>>,
    client: Client,
}

impl GcsBlobStore {
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty bucket name and `Transport` if
    /// the HTTP client cannot be built.
    pub fn new(bucket: impl Into<String>, token: Option<Sensitive<String>>) -> Result<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("gcs_connect")
                .with_message("Bucket name is empty"));
        }
        Ok(Self {
            bucket,
            token,
            client: http_client(TRANSFER_TIMEOUT)?,
        })
    }

    /// `.../b/<bucket>/o`
    fn objects_url(&self) -> Result<Url> {
        build_url(API_BASE, &["b", &self.bucket, "o"])
    }

    /// `.../b/<bucket>/o/<name>` with the name as a single encoded segment
    fn object_url(&self, name: &str) -> Result<Url> {
        build_url(API_BASE, &["b", &self.bucket, "o", name])
    }

    fn upload_url(&self, name: &str) -> Result<Url> {
        let mut url = build_url(UPLOAD_BASE, &["b", &self.bucket, "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", name);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        }
    }

    fn send(&self, op: &str, request: RequestBuilder) -> Result<Response> {
        self.authorized(request)
            .send()
            .map_err(|e| http_error(op, e))
    }
}

fn build_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| {
        ExError::new(ExErrorKind::Internal)
            .with_op("gcs_url")
            .with_message(e.to_string())
    })?;
    url.path_segments_mut()
        .map_err(|_| {
            ExError::new(ExErrorKind::Internal)
                .with_op("gcs_url")
                .with_message(format!("'{}' cannot carry a path", base))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

impl BlobStore for GcsBlobStore {
    fn container(&self) -> &str {
        &self.bucket
    }

    fn list(&self) -> Result<Vec<String>> {
        let url = self.objects_url()?;
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .query(&[("fields", "items(name),nextPageToken")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = self.send("blob_list", request)?;
            if !response.status().is_success() {
                return Err(status_error("blob_list", url.as_str(), response.status()));
            }
            let page: ObjectList = response.json().map_err(|e| http_error("blob_list", e))?;
            names.extend(page.items.into_iter().map(|item| item.name));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(bucket = %self.bucket, objects = names.len(), "Listed bucket");
        Ok(names)
    }

    fn upload(&self, local: &Path, name: &str) -> Result<()> {
        let file = File::open(local).map_err(|e| local_io_error("blob_upload", local, e))?;
        let url = self.upload_url(name)?;
        let request = self
            .client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(file);

        let response = self.send("blob_upload", request)?;
        if !response.status().is_success() {
            return Err(status_error("blob_upload", url.as_str(), response.status()));
        }
        tracing::debug!(bucket = %self.bucket, object = name, "Uploaded object");
        Ok(())
    }

    fn download(&self, name: &str, local: &Path) -> Result<()> {
        let url = self.object_url(name)?;
        let request = self.client.get(url.clone()).query(&[("alt", "media")]);

        let mut response = self.send("blob_download", request)?;
        if !response.status().is_success() {
            return Err(status_error("blob_download", url.as_str(), response.status()));
        }

        let mut file = File::create(local).map_err(|e| local_io_error("blob_download", local, e))?;
        let bytes = response
            .copy_to(&mut file)
            .map_err(|e| http_error("blob_download", e))?;
        tracing::debug!(bucket = %self.bucket, object = name, bytes, "Downloaded object");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let url = self.object_url(name)?;
        let response = self.send("blob_delete", self.client.delete(url.clone()))?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                tracing::debug!(bucket = %self.bucket, object = name, "Object already gone");
                Ok(())
            }
            status => Err(status_error("blob_delete", url.as_str(), status)),
        }
    }
}
