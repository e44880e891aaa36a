//! UPDATE statement builder.

use std::sync::Arc;

use super::condition::{Conditions, Connector, Operator};
use super::query::{ParamWriter, Query};
use crate::dialect::Dialect;
use crate::error::BuildError;
use crate::row::DynamicRow;
use crate::value::{SqlValue, ToSqlValue};

/// An UPDATE statement builder.
#[derive(Debug, Clone)]
pub struct Update {
    dialect: Arc<dyn Dialect>,
    table: Option<String>,
    assignments: Vec<(String, SqlValue)>,
    conditions: Conditions,
}

impl Update {
    /// Creates a new UPDATE builder for `dialect`.
    #[must_use]
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            table: None,
            assignments: vec![],
            conditions: Conditions::default(),
        }
    }

    /// Sets the table to update.
    #[must_use]
    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(String::from(table));
        self
    }

    /// Adds a `column = value` assignment.
    #[must_use]
    pub fn set(mut self, column: &str, value: impl ToSqlValue) -> Self {
        self.assignments
            .push((String::from(column), value.to_sql_value()));
        self
    }

    /// Adds one assignment per column of `row`.
    #[must_use]
    pub fn set_row(mut self, row: &DynamicRow) -> Self {
        for (column, value) in row.iter() {
            self.assignments.push((String::from(column), value.clone()));
        }
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
    /// [`BuildError::MissingTable`] without a table and
    /// [`BuildError::NoSetClauses`] without any assignment.
    pub fn build(&self) -> Result<Query, BuildError> {
        let table = self
            .table
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(BuildError::MissingTable)?;
        if self.assignments.is_empty() {
            return Err(BuildError::NoSetClauses);
        }

        let mut params = ParamWriter::new(self.dialect.as_ref());
        let mut sql = String::from("UPDATE ");
        sql.push_str(table);
        sql.push_str(" SET ");

        let sets: Vec<String> = self
            .assignments
            .iter()
            .map(|(column, value)| format!("{column} = {}", params.bind(value)))
            .collect();
        sql.push_str(&sets.join(", "));

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
