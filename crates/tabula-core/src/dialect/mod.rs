//! SQL Dialect support.
//!
//! Each backend spells types, identity columns, quoting and placeholders a
//! little differently. A [`Dialect`] captures those differences; everything
//! else (builders, the schema compiler) is written once against the trait.

mod postgres;
mod sqlite;
mod sqlserver;

pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

use crate::schema::{identifier, ColumnSpec, ColumnType};
use crate::value::SqlValue;

/// Default precision for decimal columns declared without one.
pub const DEFAULT_DECIMAL_PRECISION: u8 = 18;
/// Default scale for decimal columns declared without one.
pub const DEFAULT_DECIMAL_SCALE: u8 = 2;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync + std::fmt::Debug {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Quotes an identifier, doubling any embedded quote character.
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Backend type for a generic column, including length or
    /// precision/scale.
    fn column_type_name(&self, column: &ColumnSpec) -> String;

    /// Backend type for a builder-level storage class.
    fn storage_type_name(&self, column_type: ColumnType) -> &'static str;

    /// Keyword marking a backend-generated integer column.
    fn autoincrement_keyword(&self) -> &'static str;

    /// Whether the identity keyword must follow `PRIMARY KEY` (SQLite) rather
    /// than the type.
    fn autoincrement_after_primary_key(&self) -> bool {
        false
    }

    /// Placeholder for the parameter at zero-based `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Reserved words specific to this dialect, on top of
    /// [`identifier::RESERVED_WORDS`].
    fn reserved_words(&self) -> &'static [&'static str] {
        &[]
    }

    /// Returns true if `name` is usable as a table or column name.
    fn is_valid_identifier(&self, name: &str) -> bool {
        identifier::is_valid_identifier(name, self.reserved_words())
    }

    /// Renders one column of a compiled `CREATE TABLE`:
    /// `quoted type [identity] NULL|NOT NULL [PRIMARY KEY]`.
    ///
    /// Primary-key and identity columns are always `NOT NULL`.
    fn column_definition(&self, column: &ColumnSpec) -> String {
        let identity = column.is_auto_incrementing;
        let trailing_identity = identity && self.autoincrement_after_primary_key();

        let mut parts = vec![
            self.quote_identifier(&column.name),
            self.column_type_name(column),
        ];
        if identity && !trailing_identity {
            parts.push(self.autoincrement_keyword().to_string());
        }
        if column.is_nullable && !column.is_primary_key && !identity {
            parts.push(String::from("NULL"));
        } else {
            parts.push(String::from("NOT NULL"));
        }
        if column.is_primary_key || trailing_identity {
            parts.push(String::from("PRIMARY KEY"));
        }
        if trailing_identity {
            parts.push(self.autoincrement_keyword().to_string());
        }
        parts.join(" ")
    }

    /// Renders a value as an inline literal, for `DEFAULT` clauses.
    fn format_literal(&self, value: &SqlValue) -> String {
        value.to_sql_inline()
    }
}

pub(crate) fn decimal_args(column: &ColumnSpec) -> (u8, u8) {
    (
        column.precision.unwrap_or(DEFAULT_DECIMAL_PRECISION),
        column.scale.unwrap_or(DEFAULT_DECIMAL_SCALE),
    )
}
