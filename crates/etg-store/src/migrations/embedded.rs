//! Embedded SQL migrations
//!
//! Migrations are embedded at compile time using include_str!

use rusqlite::Connection;

/// Migration metadata
pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
    /// Detects a schema that already has this migration's effect, for
    /// snapshots written without a `schema_version` ledger.
    /// A satisfied migration is recorded without running its SQL.
    pub satisfied: Option<fn(&Connection) -> rusqlite::Result<bool>>,
}

/// Get all embedded migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_base_tables",
            sql: include_str!("../../migrations/001_base_tables.sql"),
            satisfied: None,
        },
        Migration {
            id: "002_card_list_columns",
            sql: include_str!("../../migrations/002_card_list_columns.sql"),
            satisfied: Some(cards_has_list_columns),
        },
    ]
}

fn cards_has_list_columns(conn: &Connection) -> rusqlite::Result<bool> {
    let present: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info('Cards')
         WHERE name IN ('promo_types', 'frame_effects')",
        [],
        |row| row.get(0),
    )?;
    Ok(present == 2)
}
