//! Abstract table model to DDL.

use std::collections::HashSet;
use std::sync::Arc;

use super::update::{first_violation, TableUpdate};
use super::{ColumnMetadata, GenericType, TableSpec};
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// Validates [`TableSpec`]s and renders them as `CREATE TABLE` for one
/// dialect.
///
/// Validation stops at the first violation and reports it as a single
/// [`Error::Validation`] message.
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    dialect: Arc<dyn Dialect>,
}

impl SchemaCompiler {
    /// Creates a compiler for `dialect`.
    #[must_use]
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self { dialect }
    }

    /// Target dialect.
    #[must_use]
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Returns true if `name` is usable as a table or column name.
    #[must_use]
    pub fn is_valid_identifier(&self, name: &str) -> bool {
        self.dialect.is_valid_identifier(name)
    }

    /// Checks `spec` and returns the first violation found.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] with exactly one message.
    pub fn validate(&self, spec: &TableSpec) -> Result<()> {
        match self.first_violation(spec) {
            Some(message) => Err(Error::validation(message)),
            None => Ok(()),
        }
    }

    fn first_violation(&self, spec: &TableSpec) -> Option<String> {
        if spec.table_name.trim().is_empty() {
            return Some(String::from("Table name cannot be empty."));
        }
        if !self.is_valid_identifier(&spec.table_name) {
            return Some(format!(
                "Table name '{}' is not a valid SQL identifier.",
                spec.table_name
            ));
        }
        if spec.columns.is_empty() {
            return Some(String::from("Table must have at least one column."));
        }

        let trailing_identity = self.dialect.autoincrement_after_primary_key();
        let mut seen = HashSet::new();
        let mut primary_keys = 0;

        for column in &spec.columns {
            if column.name.trim().is_empty() {
                return Some(String::from("Column name cannot be empty."));
            }
            if !self.is_valid_identifier(&column.name) {
                return Some(format!(
                    "Column name '{}' is not a valid SQL identifier.",
                    column.name
                ));
            }
            if !seen.insert(column.name.to_ascii_lowercase()) {
                return Some(format!("Duplicate column name found: '{}'.", column.name));
            }
            // SQLite can only auto-increment the primary key
            if column.is_primary_key || (trailing_identity && column.is_auto_incrementing) {
                primary_keys += 1;
            }
            if column.is_auto_incrementing && column.data_type != GenericType::Integer {
                return Some(format!(
                    "Auto-incrementing column '{}' must be of type 'Integer'.",
                    column.name
                ));
            }
        }

        if primary_keys > 1 {
            return Some(String::from("A table can have at most one primary key."));
        }
        None
    }

    /// Validates `spec` and renders it.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] carrying the first violation.
    pub fn compile(&self, spec: &TableSpec) -> Result<String> {
        self.validate(spec)?;

        let columns: Vec<String> = spec
            .columns
            .iter()
            .map(|c| format!("    {}", self.dialect.column_definition(c)))
            .collect();

        Ok(format!(
            "CREATE TABLE {} (\n{}\n);",
            self.dialect.quote_identifier(&spec.table_name),
            columns.join(",\n")
        ))
    }

    /// Checks proposed column changes against the live columns of the
    /// table.
    ///
    /// Changes are considered in order, so a column dropped by one change
    /// may be added again by a later one.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] carrying the first violation.
    pub fn validate_update(&self, update: &TableUpdate, existing: &[ColumnMetadata]) -> Result<()> {
        match first_violation(update, existing, self.dialect.as_ref()) {
            Some(message) => Err(Error::validation(message)),
            None => Ok(()),
        }
    }
}
