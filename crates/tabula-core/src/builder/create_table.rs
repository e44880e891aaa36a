//! CREATE TABLE statement builder.

use std::sync::Arc;

use super::query::{ParamWriter, Query};
use crate::dialect::Dialect;
use crate::error::BuildError;
use crate::schema::ColumnType;
use crate::value::{SqlValue, ToSqlValue};

/// One column of a [`CreateTable`] statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Storage class.
    pub column_type: ColumnType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether this column is the primary key.
    pub primary_key: bool,
    /// Literal default value.
    pub default: Option<SqlValue>,
    /// Whether the key is backend-generated. Only rendered on a primary key.
    pub auto_increment: bool,
}

impl ColumnDef {
    /// Creates a nullable column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            primary_key: false,
            default: None,
            auto_increment: false,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the key as backend-generated.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the DEFAULT literal.
    #[must_use]
    pub fn default_value(mut self, value: impl ToSqlValue) -> Self {
        self.default = Some(value.to_sql_value());
        self
    }

    fn render(&self, dialect: &dyn Dialect) -> String {
        let mut def = format!(
            "{} {}",
            self.name,
            dialect.storage_type_name(self.column_type)
        );
        if self.primary_key {
            def.push_str(" PRIMARY KEY");
            if self.auto_increment {
                def.push(' ');
                def.push_str(dialect.autoincrement_keyword());
            }
        }
        if !self.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            def.push_str(" DEFAULT ");
            def.push_str(&dialect.format_literal(default));
        }
        def
    }
}

/// A CREATE TABLE statement builder.
///
/// DDL takes no parameters; `DEFAULT` values are rendered as escaped
/// literals by the dialect.
#[derive(Debug, Clone)]
pub struct CreateTable {
    dialect: Arc<dyn Dialect>,
    table: Option<String>,
    if_not_exists: bool,
    columns: Vec<ColumnDef>,
}

impl CreateTable {
    /// Creates a new CREATE TABLE builder for `dialect`.
    #[must_use]
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            table: None,
            if_not_exists: false,
            columns: vec![],
        }
    }

    /// Sets the table name.
    #[must_use]
    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(String::from(table));
        self
    }

    /// Adds `IF NOT EXISTS`.
    #[must_use]
    pub const fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// [`BuildError::MissingTable`], [`BuildError::NoColumns`], or
    /// [`BuildError::EmptyColumnName`] when a column has no name.
    pub fn build(&self) -> Result<Query, BuildError> {
        let table = self
            .table
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(BuildError::MissingTable)?;
        if self.columns.is_empty() {
            return Err(BuildError::NoColumns);
        }
        if self.columns.iter().any(|c| c.name.trim().is_empty()) {
            return Err(BuildError::EmptyColumnName);
        }

        let defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.render(self.dialect.as_ref()))
            .collect();

        let mut sql = String::from("CREATE TABLE ");
        if self.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(table);
        sql.push_str(" (");
        sql.push_str(&defs.join(", "));
        sql.push_str(");");

        Ok(ParamWriter::new(self.dialect.as_ref()).finish(sql))
    }

    /// Renders the statement and returns only the SQL text.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn sql(&self) -> Result<String, BuildError> {
        self.build().map(|q| q.into_parts().0)
    }
}
