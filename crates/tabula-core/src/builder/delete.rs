//! DELETE statement builder.

use std::sync::Arc;

use super::condition::{Conditions, Connector, Operator};
use super::query::{ParamWriter, Query};
use crate::dialect::Dialect;
use crate::error::BuildError;
use crate::value::ToSqlValue;

/// A DELETE statement builder.
///
/// **Warning**: without a condition every row of the table is deleted.
#[derive(Debug, Clone)]
pub struct Delete {
    dialect: Arc<dyn Dialect>,
    table: Option<String>,
    conditions: Conditions,
}

impl Delete {
    /// Creates a new DELETE builder for `dialect`.
    #[must_use]
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            table: None,
            conditions: Conditions::default(),
        }
    }

    /// Sets the table to delete from.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.table = Some(String::from(table));
        self
    }

    /// Adds `column = value`, joined with AND.
    #[must_use]
    pub fn where_(self, column: &str, value: impl ToSqlValue) -> Self {
        self.where_op(column, Operator::Eq, value)
    }

    /// Adds `column op value`, joined with AND.
    #[must_use]
    pub fn where_op(mut self, column: &str, operator: Operator, value: impl ToSqlValue) -> Self {
        self.conditions
            .push(Connector::And, column, operator, value.to_sql_value());
        self
    }

    /// Adds `column = value`, joined with OR.
    #[must_use]
    pub fn or(self, column: &str, value: impl ToSqlValue) -> Self {
        self.or_op(column, Operator::Eq, value)
    }

    /// Adds `column op value`, joined with OR.
    #[must_use]
    pub fn or_op(mut self, column: &str, operator: Operator, value: impl ToSqlValue) -> Self {
        self.conditions
            .push(Connector::Or, column, operator, value.to_sql_value());
        self
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// [`BuildError::MissingTable`] without a table.
    pub fn build(&self) -> Result<Query, BuildError> {
        let table = self
            .table
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(BuildError::MissingTable)?;

        let mut params = ParamWriter::new(self.dialect.as_ref());
        let mut sql = String::from("DELETE FROM ");
        sql.push_str(table);
        self.conditions.render_into(&mut sql, &mut params);
        sql.push(';');
        Ok(params.finish(sql))
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
