//! Card batch model
//!
//! One `CardRecord` per printing, as delivered by the bulk card payload. Only
//! the fields the snapshot tables store are modelled; everything else in the
//! payload is ignored on deserialization.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{ExError, ExErrorKind, Result};

/// Separator used when list-valued fields are stored as text
pub const LIST_SEPARATOR: &str = ",";

/// Nested image URI object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageUris {
    pub small: Option<String>,
    pub normal: Option<String>,
    pub large: Option<String>,
    pub png: Option<String>,
    pub art_crop: Option<String>,
    pub border_crop: Option<String>,
}

/// Nested price object; the payload sends decimal strings or null
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceQuotes {
    #[serde(deserialize_with = "de_price")]
    pub usd: Option<f64>,
    #[serde(deserialize_with = "de_price")]
    pub usd_foil: Option<f64>,
    #[serde(deserialize_with = "de_price")]
    pub usd_etched: Option<f64>,
    #[serde(deserialize_with = "de_price")]
    pub eur: Option<f64>,
    #[serde(deserialize_with = "de_price")]
    pub eur_foil: Option<f64>,
    #[serde(deserialize_with = "de_price")]
    pub tix: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

fn de_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawPrice>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawPrice::Number(value)) => Ok(Some(value)),
        Some(RawPrice::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid price '{}'", text))),
    }
}

/// One card printing from the bulk payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub border_color: Option<String>,
    #[serde(default)]
    pub promo_types: Option<Vec<String>>,
    #[serde(default)]
    pub frame_effects: Option<Vec<String>>,
    #[serde(default)]
    pub image_status: Option<String>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub prices: PriceQuotes,
}

impl CardRecord {
    /// Minimal record, mostly useful for building batches in tests
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            set_name: None,
            border_color: None,
            promo_types: None,
            frame_effects: None,
            image_status: None,
            image_uris: None,
            prices: PriceQuotes::default(),
        }
    }

    pub fn promo_types_text(&self) -> Option<String> {
        self.promo_types.as_ref().map(|v| v.join(LIST_SEPARATOR))
    }

    pub fn frame_effects_text(&self) -> Option<String> {
        self.frame_effects.as_ref().map(|v| v.join(LIST_SEPARATOR))
    }
}

/// Records fetched in one call, stamped with their observation date
#[derive(Debug, Clone, PartialEq)]
pub struct CardBatch {
    pub utc: NaiveDate,
    pub records: Vec<CardRecord>,
}

impl CardBatch {
    pub fn new(records: Vec<CardRecord>, utc: NaiveDate) -> Self {
        Self { utc, records }
    }

    /// Decode a bulk JSON array of cards
    pub fn from_json_slice(bytes: &[u8], utc: NaiveDate) -> Result<Self> {
        let records: Vec<CardRecord> = serde_json::from_slice(bytes).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("decode_card_batch")
                .with_message(format!("Invalid card payload: {}", e))
        })?;
        Ok(Self::new(records, utc))
    }

    /// Observation date as stored in the `utc` column
    pub fn utc_text(&self) -> String {
        self.utc.format("%Y-%m-%d").to_string()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
