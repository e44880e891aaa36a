//! PostgreSQL dialect.

use super::{decimal_args, Dialect};
use crate::schema::{ColumnSpec, ColumnType, GenericType};
use crate::value::SqlValue;

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn column_type_name(&self, column: &ColumnSpec) -> String {
        match column.data_type {
            GenericType::String => column
                .length
                .map_or_else(|| String::from("TEXT"), |n| format!("VARCHAR({n})")),
            GenericType::Integer => String::from("INTEGER"),
            GenericType::Decimal => {
                let (p, s) = decimal_args(column);
                format!("NUMERIC({p}, {s})")
            }
            GenericType::DateTime => String::from("TIMESTAMP"),
            GenericType::Boolean => String::from("BOOLEAN"),
        }
    }

    fn storage_type_name(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "DOUBLE PRECISION",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BYTEA",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Boolean => "BOOLEAN",
        }
    }

    fn autoincrement_keyword(&self) -> &'static str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index + 1)
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        &["ANALYSE", "ANALYZE", "LIMIT", "OFFSET", "RETURNING", "USER"]
    }

    fn format_literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
            other => other.to_sql_inline(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        let d = PostgresDialect::new();
        assert_eq!(
            d.column_type_name(&ColumnSpec::new("a", GenericType::DateTime)),
            "TIMESTAMP"
        );
        assert_eq!(
            d.column_type_name(&ColumnSpec::new("a", GenericType::Decimal)),
            "NUMERIC(18, 2)"
        );
    }

    #[test]
    fn test_identity_column() {
        let d = PostgresDialect::new();
        let id = ColumnSpec::new("id", GenericType::Integer)
            .primary_key()
            .auto_increment();
        assert_eq!(
            d.column_definition(&id),
            "\"id\" INTEGER GENERATED BY DEFAULT AS IDENTITY NOT NULL PRIMARY KEY"
        );
    }

    #[test]
    fn test_boolean_literal() {
        let d = PostgresDialect::new();
        assert_eq!(d.format_literal(&SqlValue::Bool(true)), "TRUE");
        assert_eq!(d.format_literal(&SqlValue::Int(5)), "5");
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(PostgresDialect::new().placeholder(0), "$1");
    }
}
