//! Table merge for one card batch
//!
//! Rows are staged into temporary tables through prepared statements and then
//! moved into the snapshot tables with one set-based statement per table:
//!
//! - `Cards`, `Images`: upsert by id, latest metadata wins
//! - `Prices`: plain append (a repeated `(id, utc)` is an error), followed by
//!   pruning every row outside the retention window
//!
//! The merger never commits. Callers run it inside a transaction they own so
//! that a failure in any table leaves all three untouched.

use chrono::{Duration, NaiveDate};
use etg_core::model::{CardBatch, CardRecord};
use rusqlite::types::Value;
use rusqlite::Connection;

use crate::errors::{merge_failed, Result};
use crate::schema::{TableSchema, CARDS, IMAGES, PRICES};

/// Days of price history kept in a snapshot
pub const PRICE_RETENTION_DAYS: i64 = 30;

/// Row counts produced by one merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub cards: usize,
    pub images: usize,
    pub prices_appended: usize,
    pub prices_pruned: usize,
}

/// Applies card batches to an open snapshot connection
#[derive(Debug, Clone)]
pub struct TableMerger {
    today: NaiveDate,
}

impl TableMerger {
    /// Merger pruning relative to `today`
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Merger pruning relative to the current UTC date
    pub fn for_now() -> Self {
        Self::new(chrono::Utc::now().date_naive())
    }

    /// Rows with `utc` on or before this date are pruned
    pub fn prune_cutoff(&self) -> NaiveDate {
        self.today - Duration::days(PRICE_RETENTION_DAYS)
    }

    /// Merge all three tables. The caller owns the surrounding transaction.
    pub fn merge(&self, conn: &Connection, batch: &CardBatch) -> Result<MergeReport> {
        let cards = self.merge_cards(conn, batch)?;
        let images = self.merge_images(conn, batch)?;
        let prices_appended = self.append_prices(conn, batch)?;
        let prices_pruned = self.prune_prices(conn)?;

        let report = MergeReport {
            cards,
            images,
            prices_appended,
            prices_pruned,
        };
        tracing::debug!(?report, utc = %batch.utc, "Merged card batch");
        Ok(report)
    }

    /// Upsert card metadata
    pub fn merge_cards(&self, conn: &Connection, batch: &CardBatch) -> Result<usize> {
        stage_and_merge(conn, &CARDS, true, &batch.records, |card| {
            vec![
                Value::from(card.id.clone()),
                Value::from(card.name.clone()),
                Value::from(card.set_name.clone()),
                Value::from(card.border_color.clone()),
                Value::from(card.promo_types_text()),
                Value::from(card.frame_effects_text()),
            ]
        })
    }

    /// Upsert flattened image URIs
    pub fn merge_images(&self, conn: &Connection, batch: &CardBatch) -> Result<usize> {
        stage_and_merge(conn, &IMAGES, true, &batch.records, |card| {
            let uris = card.image_uris.clone().unwrap_or_default();
            vec![
                Value::from(card.id.clone()),
                Value::from(card.image_status.clone()),
                Value::from(uris.small),
                Value::from(uris.normal),
                Value::from(uris.large),
                Value::from(uris.png),
                Value::from(uris.art_crop),
                Value::from(uris.border_crop),
            ]
        })
    }

    /// Append one price observation per card, stamped with the batch date
    pub fn append_prices(&self, conn: &Connection, batch: &CardBatch) -> Result<usize> {
        let utc = batch.utc_text();
        stage_and_merge(conn, &PRICES, false, &batch.records, |card| {
            let p = &card.prices;
            vec![
                Value::from(card.id.clone()),
                Value::from(utc.clone()),
                Value::from(p.usd),
                Value::from(p.usd_foil),
                Value::from(p.usd_etched),
                Value::from(p.eur),
                Value::from(p.eur_foil),
                Value::from(p.tix),
            ]
        })
    }

    /// Delete every price row outside the retention window
    pub fn prune_prices(&self, conn: &Connection) -> Result<usize> {
        let cutoff = self.prune_cutoff().format("%Y-%m-%d").to_string();
        let sql = format!("DELETE FROM {} WHERE utc <= ?1", PRICES.name);
        conn.execute(&sql, [&cutoff])
            .map_err(|e| merge_failed(PRICES.name, e))
    }
}

/// Stage `records` into the table's temp table, merge, and drop the temp table
fn stage_and_merge<F>(
    conn: &Connection,
    table: &TableSchema,
    replace: bool,
    records: &[CardRecord],
    row: F,
) -> Result<usize>
where
    F: Fn(&CardRecord) -> Vec<Value>,
{
    let fail = |e: rusqlite::Error| merge_failed(table.name, e);

    conn.execute(&table.create_staging_sql(), []).map_err(fail)?;
    {
        let mut insert = conn.prepare(&table.insert_staging_sql()).map_err(fail)?;
        for record in records {
            let values = row(record);
            insert
                .execute(rusqlite::params_from_iter(values.iter()))
                .map_err(fail)?;
        }
    }
    let merged = conn.execute(&table.merge_sql(replace), []).map_err(fail)?;
    conn.execute(&table.drop_staging_sql(), []).map_err(fail)?;

    tracing::debug!(table = table.name, rows = merged, "Merged staged rows");
    Ok(merged)
}
