//! Card data source interface

use crate::errors::Result;
use crate::model::CardRecord;

/// Producer of the bulk card payload.
///
/// The caller stamps the returned records with an observation date to form
/// a `CardBatch`; sources only fetch and decode.
pub trait CardSource {
    /// Fetch every card record the source currently publishes.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Transport` when the source cannot be reached and
    /// `ExErrorKind::Serialization` when the payload cannot be decoded.
    fn fetch(&self) -> Result<Vec<CardRecord>>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;
}
