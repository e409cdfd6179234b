//! Read-side queries over a snapshot
//!
//! Consumers only ever read snapshots through a join of known tables or a
//! price date range. `info` and `vacuum` are maintenance helpers for the CLI.

use chrono::NaiveDate;
use etg_core::errors::{ExError, ExErrorKind};
use rusqlite::types::Value;
use rusqlite::{Connection, Statement};

use crate::errors::{from_rusqlite, Result};
use crate::schema::{table_named, ALL_TABLES};

/// Column names plus rows of dynamically typed values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Overview of one table: columns, leading rows and total count
#[derive(Debug, Clone, PartialEq)]
pub struct TableOverview {
    pub table: &'static str,
    pub head: QueryResult,
    pub row_count: i64,
}

/// Render one value for terminal output
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

fn collect(stmt: &mut Statement<'_>, params: &[&dyn rusqlite::ToSql]) -> Result<QueryResult> {
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();
    let rows = stmt
        .query_map(params, |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .map_err(from_rusqlite)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(from_rusqlite)?;
    Ok(QueryResult { columns, rows })
}

/// Inner join of the named tables on `id`, in the order given
///
/// # Errors
///
/// `InvalidInput` for an empty list or a table that is not part of a snapshot.
pub fn join_tables(conn: &Connection, tables: &[&str]) -> Result<QueryResult> {
    let schemas = tables
        .iter()
        .map(|name| {
            table_named(name).ok_or_else(|| {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("join_tables")
                    .with_message(format!("Unknown table '{}'", name))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let (first, rest) = schemas.split_first().ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("join_tables")
            .with_message("No tables requested")
    })?;

    let mut sql = format!("SELECT * FROM {}", first.name);
    for schema in rest {
        sql.push_str(&format!(" INNER JOIN {} USING(id)", schema.name));
    }

    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
    collect(&mut stmt, &[])
}

/// Cards joined with their prices observed between `start` and `end`
/// inclusive; `end` defaults to today (UTC)
pub fn date_range(
    conn: &Connection,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<QueryResult> {
    let end = end.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let start = start.format("%Y-%m-%d").to_string();
    let end = end.format("%Y-%m-%d").to_string();

    let mut stmt = conn
        .prepare(
            "SELECT * FROM Cards INNER JOIN Prices USING(id)
             WHERE utc BETWEEN ?1 AND ?2
             ORDER BY utc, id",
        )
        .map_err(from_rusqlite)?;
    collect(&mut stmt, &[&start, &end])
}

/// First `head` rows and the row count of every snapshot table
pub fn info(conn: &Connection, head: usize) -> Result<Vec<TableOverview>> {
    let limit = i64::try_from(head).unwrap_or(i64::MAX);
    ALL_TABLES
        .iter()
        .map(|table| {
            let mut stmt = conn
                .prepare(&format!("SELECT * FROM {} LIMIT ?1", table.name))
                .map_err(from_rusqlite)?;
            let head = collect(&mut stmt, &[&limit])?;
            let row_count = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table.name), [], |row| {
                    row.get(0)
                })
                .map_err(from_rusqlite)?;
            Ok(TableOverview {
                table: table.name,
                head,
                row_count,
            })
        })
        .collect()
}

/// Reclaim space left by pruned price rows
pub fn vacuum(conn: &Connection) -> Result<()> {
    conn.execute_batch("VACUUM").map_err(from_rusqlite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;

    fn seeded() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO Cards (id, name) VALUES ('a', 'Alpha'), ('b', 'Beta');
            INSERT INTO Images (id, small) VALUES ('a', 'a.jpg');
            INSERT INTO Prices (id, utc, usd) VALUES
                ('a', '2024-05-01', 1.0),
                ('a', '2024-05-02', 1.5),
                ('b', '2024-05-03', 0.5);
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_join_cards_images() {
        let conn = seeded();
        let result = join_tables(&conn, &["Cards", "images"]).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert!(result.columns.contains(&"small".to_string()));
    }

    #[test]
    fn test_join_rejects_unknown_table() {
        let conn = seeded();
        let err = join_tables(&conn, &["Cards; DROP TABLE Cards"]).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert!(join_tables(&conn, &[]).is_err());
    }

    #[test]
    fn test_date_range_inclusive() {
        let conn = seeded();
        let start = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let result = date_range(&conn, start, Some(end)).unwrap();
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_info_counts() {
        let conn = seeded();
        let overview = info(&conn, 1).unwrap();
        let counts: Vec<(&str, i64)> = overview.iter().map(|o| (o.table, o.row_count)).collect();
        assert_eq!(counts, vec![("Cards", 2), ("Images", 1), ("Prices", 3)]);
        assert!(overview.iter().all(|o| o.head.rows.len() <= 1));
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&Value::Null), "NULL");
        assert_eq!(render_value(&Value::Text("x".into())), "x");
        assert_eq!(render_value(&Value::Blob(vec![0; 3])), "<3 bytes>");
    }
}
