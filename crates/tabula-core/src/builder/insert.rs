//! INSERT statement builder.

use std::sync::Arc;

use super::query::{ParamWriter, Query};
use crate::dialect::Dialect;
use crate::error::BuildError;
use crate::row::DynamicRow;
use crate::value::{SqlValue, ToSqlValue};

/// An INSERT statement builder.
///
/// Without an explicit column list the positional `INSERT INTO t VALUES (..)`
/// form is produced.
#[derive(Debug, Clone)]
pub struct Insert {
    dialect: Arc<dyn Dialect>,
    table: Option<String>,
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Insert {
    /// Creates a new INSERT builder for `dialect`.
    #[must_use]
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            table: None,
            columns: vec![],
            values: vec![],
        }
    }

    /// Sets the target table.
    #[must_use]
    pub fn into(mut self, table: &str) -> Self {
        self.table = Some(String::from(table));
        self
    }

    /// Sets the column list.
    #[must_use]
    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.columns = columns.iter().map(|c| String::from(c.as_ref())).collect();
        self
    }

    /// Appends one value.
    #[must_use]
    pub fn value(mut self, value: impl ToSqlValue) -> Self {
        self.values.push(value.to_sql_value());
        self
    }

    /// Appends several values.
    #[must_use]
    pub fn values<V: ToSqlValue>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.values
            .extend(values.into_iter().map(ToSqlValue::to_sql_value));
        self
    }

    /// Uses the columns and values of `row`, in row order.
    #[must_use]
    pub fn row(mut self, row: &DynamicRow) -> Self {
        for (column, value) in row.iter() {
            self.columns.push(String::from(column));
            self.values.push(value.clone());
        }
        self
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// [`BuildError::MissingTable`] without a table,
    /// [`BuildError::NoColumns`] without any value, and
    /// [`BuildError::ColumnValueCountMismatch`] when an explicit column list
    /// and the values differ in length.
    pub fn build(&self) -> Result<Query, BuildError> {
        let table = self
            .table
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(BuildError::MissingTable)?;

        if !self.columns.is_empty() && self.columns.len() != self.values.len() {
            return Err(BuildError::ColumnValueCountMismatch {
                columns: self.columns.len(),
                values: self.values.len(),
            });
        }
        if self.values.is_empty() {
            return Err(BuildError::NoColumns);
        }

        let mut params = ParamWriter::new(self.dialect.as_ref());
        let mut sql = String::from("INSERT INTO ");
        sql.push_str(table);
        if !self.columns.is_empty() {
            sql.push_str(" (");
            sql.push_str(&self.columns.join(", "));
            sql.push(')');
        }

        let placeholders: Vec<String> = self.values.iter().map(|v| params.bind(v)).collect();
        sql.push_str(" VALUES (");
        sql.push_str(&placeholders.join(", "));
        sql.push_str(");");

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqliteDialect;

    fn insert() -> Insert {
        Insert::new(Arc::new(SqliteDialect::new()))
    }

    #[test]
    fn test_insert_with_columns() {
        let query = insert()
            .into("t")
            .columns(&["a", "b"])
            .values([1, 2])
            .build()
            .unwrap();
        assert_eq!(query.sql(), "INSERT INTO t (a, b) VALUES (?1, ?2);");
        assert_eq!(query.params().len(), 2);
    }

    #[test]
    fn test_insert_positional() {
        let sql = insert().into("t").value("x").value(SqlValue::Null).sql().unwrap();
        assert_eq!(sql, "INSERT INTO t VALUES (?1, ?2);");
    }

    #[test]
    fn test_insert_from_row() {
        let row = DynamicRow::new().with("name", "Ada").with("age", 36);
        let query = insert().into("people").row(&row).build().unwrap();
        assert_eq!(query.sql(), "INSERT INTO people (name, age) VALUES (?1, ?2);");
        assert_eq!(query.params()[0].value, SqlValue::Text(String::from("Ada")));
    }

    #[test]
    fn test_insert_count_mismatch() {
        let err = insert()
            .into("t")
            .columns(&["a", "b"])
            .values([1, 2, 3])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::ColumnValueCountMismatch {
                columns: 2,
                values: 3
            }
        );
    }

    #[test]
    fn test_insert_missing_table() {
        assert_eq!(insert().value(1).build(), Err(BuildError::MissingTable));
    }

    #[test]
    fn test_insert_without_values() {
        assert_eq!(insert().into("t").build(), Err(BuildError::NoColumns));
    }
}
