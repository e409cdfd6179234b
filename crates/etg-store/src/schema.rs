//! Fixed table descriptions
//!
//! Every table and column name that reaches a SQL string comes from these
//! constants; row values are always bound as parameters.

/// SQLite storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Real,
}

impl ColumnType {
    fn sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Text,
    }
}

const fn real(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Real,
    }
}

/// A snapshot table and its staging counterpart
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub staging: &'static str,
    pub columns: &'static [Column],
}

pub const CARDS: TableSchema = TableSchema {
    name: "Cards",
    staging: "TempCards",
    columns: &[
        text("id"),
        text("name"),
        text("set_name"),
        text("border_color"),
        text("promo_types"),
        text("frame_effects"),
    ],
};

pub const IMAGES: TableSchema = TableSchema {
    name: "Images",
    staging: "TempImages",
    columns: &[
        text("id"),
        text("image_status"),
        text("small"),
        text("normal"),
        text("large"),
        text("png"),
        text("art_crop"),
        text("border_crop"),
    ],
};

pub const PRICES: TableSchema = TableSchema {
    name: "Prices",
    staging: "TempPrices",
    columns: &[
        text("id"),
        text("utc"),
        real("usd"),
        real("usd_foil"),
        real("usd_etched"),
        real("eur"),
        real("eur_foil"),
        real("tix"),
    ],
};

/// Tables in merge order
pub const ALL_TABLES: [TableSchema; 3] = [CARDS, IMAGES, PRICES];

/// Look up a table by name, case-insensitively
pub fn table_named(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

impl TableSchema {
    /// `id, name, ...`
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `?1, ?2, ...`
    fn placeholders(&self) -> String {
        (1..=self.columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn create_staging_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.ty.sql()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TEMP TABLE {} ({})", self.staging, columns)
    }

    pub fn insert_staging_sql(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.staging,
            self.column_list(),
            self.placeholders()
        )
    }

    /// Move staged rows into the table; `replace` turns it into an upsert
    pub fn merge_sql(&self, replace: bool) -> String {
        let verb = if replace {
            "INSERT OR REPLACE"
        } else {
            "INSERT"
        };
        let columns = self.column_list();
        format!(
            "{} INTO {} ({}) SELECT {} FROM {}",
            verb, self.name, columns, columns, self.staging
        )
    }

    pub fn drop_staging_sql(&self) -> String {
        format!("DROP TABLE temp.{}", self.staging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sql_upsert() {
        assert_eq!(
            CARDS.merge_sql(true),
            "INSERT OR REPLACE INTO Cards (id, name, set_name, border_color, promo_types, frame_effects) \
             SELECT id, name, set_name, border_color, promo_types, frame_effects FROM TempCards"
        );
    }

    #[test]
    fn test_merge_sql_append() {
        assert!(PRICES.merge_sql(false).starts_with("INSERT INTO Prices"));
    }

    #[test]
    fn test_staging_sql_uses_types() {
        let sql = PRICES.create_staging_sql();
        assert!(sql.starts_with("CREATE TEMP TABLE TempPrices"));
        assert!(sql.contains("usd REAL"));
        assert!(sql.contains("utc TEXT"));
        assert_eq!(PRICES.insert_staging_sql().matches('?').count(), 8);
    }

    #[test]
    fn test_table_lookup() {
        assert_eq!(table_named("prices").unwrap().name, "Prices");
        assert!(table_named("Legalities").is_none());
    }
}
