//! SQL Server dialect.

use super::{decimal_args, Dialect};
use crate::schema::{ColumnSpec, ColumnType, GenericType};

/// SQL Server (T-SQL) dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl SqlServerDialect {
    /// Creates a new SQL Server dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn column_type_name(&self, column: &ColumnSpec) -> String {
        match column.data_type {
            GenericType::String => column
                .length
                .map_or_else(|| String::from("NVARCHAR(MAX)"), |n| format!("NVARCHAR({n})")),
            GenericType::Integer => String::from("INT"),
            GenericType::Decimal => {
                let (p, s) = decimal_args(column);
                format!("DECIMAL({p}, {s})")
            }
            GenericType::DateTime => String::from("DATETIME"),
            GenericType::Boolean => String::from("BIT"),
        }
    }

    fn storage_type_name(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Integer => "INT",
            ColumnType::Real => "FLOAT",
            ColumnType::Text => "NVARCHAR(MAX)",
            ColumnType::Blob => "VARBINARY(MAX)",
            ColumnType::Numeric => "DECIMAL(18, 2)",
            ColumnType::Boolean => "BIT",
        }
    }

    fn autoincrement_keyword(&self) -> &'static str {
        "IDENTITY(1,1)"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@p{index}")
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        &["IDENTITY", "TOP", "USER", "PROC", "PROCEDURE", "TRAN", "TRANSACTION"]
    }
}
