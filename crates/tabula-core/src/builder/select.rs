//! SELECT statement builder.

use std::sync::Arc;

use super::condition::{Conditions, Connector, Operator};
use super::query::{ParamWriter, Query};
use crate::dialect::Dialect;
use crate::error::BuildError;
use crate::value::ToSqlValue;

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Order {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A SELECT statement builder.
#[derive(Debug, Clone)]
pub struct Select {
    dialect: Arc<dyn Dialect>,
    columns: Vec<String>,
    from: Option<String>,
    conditions: Conditions,
    order_by: Vec<(String, Order)>,
}

impl Select {
    /// Creates a new SELECT builder for `dialect`.
    #[must_use]
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            columns: vec![],
            from: None,
            conditions: Conditions::default(),
            order_by: vec![],
        }
    }

    /// Sets the column list. An empty list selects `*`.
    #[must_use]
    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.columns = columns.iter().map(|c| String::from(c.as_ref())).collect();
        self
    }

    /// Sets the table to select from.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.from = Some(String::from(table));
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

    /// Appends an ORDER BY term. Repeated calls keep call order.
    #[must_use]
    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        self.order_by.push((String::from(column), order));
        self
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// [`BuildError::MissingFrom`] when no table was given.
    pub fn build(&self) -> Result<Query, BuildError> {
        let table = self
            .from
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(BuildError::MissingFrom)?;

        let mut params = ParamWriter::new(self.dialect.as_ref());
        let mut sql = String::from("SELECT ");
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(table);

        self.conditions.render_into(&mut sql, &mut params);

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, order)| format!("{column} {}", order.as_str()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

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
