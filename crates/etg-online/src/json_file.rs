//! Card source reading a saved bulk file from disk

use std::fs;
use std::path::PathBuf;

use etg_core::errors::{ExError, ExErrorKind};
use etg_core::model::CardRecord;
use etg_core::source::CardSource;
use etg_core::Result;

use crate::errors::local_io_error;

/// Reads a JSON array of card objects, as served by the bulk-data API
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CardSource for JsonFileSource {
    fn fetch(&self) -> Result<Vec<CardRecord>> {
        let bytes = fs::read(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExError::new(ExErrorKind::NotFound)
                    .with_op("read_card_file")
                    .with_message(format!("No card file at '{}'", self.path.display()))
            } else {
                local_io_error("read_card_file", &self.path, e)
            }
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("read_card_file")
                .with_message(format!("{}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        format!("card file {}", self.path.display())
    }
}
