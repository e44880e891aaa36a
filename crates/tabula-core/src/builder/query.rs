//! Rendered statements.

use crate::dialect::Dialect;
use crate::value::SqlValue;

/// A named parameter bound to a [`Query`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    /// Parameter name, `@p0`, `@p1`, ... in assignment order.
    pub name: String,
    /// Bound value.
    pub value: SqlValue,
}

/// A rendered statement: SQL text plus its ordered parameters.
///
/// Parameter `i` is named `@p{i}` and appears in the SQL text as the
/// dialect placeholder for index `i`, so binding `params()` positionally is
/// always correct.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    sql: String,
    params: Vec<QueryParameter>,
}

impl Query {
    /// A statement without parameters, such as DDL rendered elsewhere.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters in binding order.
    #[must_use]
    pub fn params(&self) -> &[QueryParameter] {
        &self.params
    }

    /// Parameter values in binding order.
    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.params.iter().map(|p| &p.value)
    }

    /// Splits the query into SQL text and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<QueryParameter>) {
        (self.sql, self.params)
    }
}

/// Collects parameters while a statement is rendered.
pub(crate) struct ParamWriter<'a> {
    dialect: &'a dyn Dialect,
    params: Vec<QueryParameter>,
}

impl<'a> ParamWriter<'a> {
    pub(crate) fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    /// Records `value` and returns the placeholder to write in its place.
    pub(crate) fn bind(&mut self, value: &SqlValue) -> String {
        let index = self.params.len();
        self.params.push(QueryParameter {
            name: format!("@p{index}"),
            value: value.clone(),
        });
        self.dialect.placeholder(index)
    }

    pub(crate) fn finish(self, sql: String) -> Query {
        Query {
            sql,
            params: self.params,
        }
    }
}
