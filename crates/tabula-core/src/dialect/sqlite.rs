//! SQLite dialect.

use super::{decimal_args, Dialect};
use crate::schema::{ColumnSpec, ColumnType, GenericType};

/// SQLite dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn column_type_name(&self, column: &ColumnSpec) -> String {
        match column.data_type {
            GenericType::String => column
                .length
                .map_or_else(|| String::from("TEXT"), |n| format!("VARCHAR({n})")),
            GenericType::Integer => String::from("INTEGER"),
            GenericType::Decimal => {
                let (p, s) = decimal_args(column);
                format!("DECIMAL({p}, {s})")
            }
            GenericType::DateTime => String::from("DATETIME"),
            GenericType::Boolean => String::from("BOOLEAN"),
        }
    }

    fn storage_type_name(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Numeric => "NUMERIC",
            // Stored with NUMERIC affinity
            ColumnType::Boolean => "BOOLEAN",
        }
    }

    fn autoincrement_keyword(&self) -> &'static str {
        "AUTOINCREMENT"
    }

    fn autoincrement_after_primary_key(&self) -> bool {
        true
    }

    fn placeholder(&self, index: usize) -> String {
        format!("?{}", index + 1)
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        &["AUTOINCREMENT", "PRAGMA", "VACUUM"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        let d = SqliteDialect::new();
        assert_eq!(
            d.column_type_name(&ColumnSpec::new("a", GenericType::String)),
            "TEXT"
        );
        assert_eq!(
            d.column_type_name(&ColumnSpec::new("a", GenericType::String).length(40)),
            "VARCHAR(40)"
        );
        assert_eq!(
            d.column_type_name(&ColumnSpec::new("a", GenericType::Decimal)),
            "DECIMAL(18, 2)"
        );
        assert_eq!(
            d.column_type_name(&ColumnSpec::new("a", GenericType::Boolean)),
            "BOOLEAN"
        );
    }

    #[test]
    fn test_identity_follows_primary_key() {
        let d = SqliteDialect::new();
        let id = ColumnSpec::new("id", GenericType::Integer)
            .primary_key()
            .auto_increment();
        assert_eq!(
            d.column_definition(&id),
            "\"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT"
        );
    }

    #[test]
    fn test_placeholder_is_one_based() {
        let d = SqliteDialect::new();
        assert_eq!(d.placeholder(0), "?1");
        assert_eq!(d.placeholder(9), "?10");
    }

    #[test]
    fn test_quote_identifier() {
        let d = SqliteDialect::new();
        assert_eq!(d.quote_identifier("users"), "\"users\"");
        assert_eq!(d.quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
