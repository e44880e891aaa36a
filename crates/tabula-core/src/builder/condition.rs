//! WHERE-clause conditions.

use std::fmt;
use std::str::FromStr;

use super::query::ParamWriter;
use crate::error::Error;
use crate::value::SqlValue;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// `=`
    #[default]
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `LIKE`
    Like,
}

impl Operator {
    /// SQL spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "=" | "==" => Ok(Self::Eq),
            "<>" | "!=" => Ok(Self::NotEq),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::LtEq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::GtEq),
            "LIKE" => Ok(Self::Like),
            _ => Err(Error::validation(format!("Unsupported operator '{s}'."))),
        }
    }
}

/// How a condition joins the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// `AND`
    And,
    /// `OR`
    Or,
}

/// One `column op value` term.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Joiner to the previous term; ignored for the first one.
    pub connector: Connector,
    /// Column name.
    pub column: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Value, always bound as a parameter.
    pub value: SqlValue,
}

/// An ordered chain of conditions, rendered left to right without
/// grouping.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Conditions {
    terms: Vec<Condition>,
}

impl Conditions {
    pub(crate) fn push(
        &mut self,
        connector: Connector,
        column: &str,
        operator: Operator,
        value: SqlValue,
    ) {
        self.terms.push(Condition {
            connector,
            column: String::from(column),
            operator,
            value,
        });
    }

    /// Appends ` WHERE ...` to `sql` when there is at least one term.
    pub(crate) fn render_into(&self, sql: &mut String, params: &mut ParamWriter<'_>) {
        for (i, term) in self.terms.iter().enumerate() {
            if i == 0 {
                sql.push_str(" WHERE ");
            } else {
                sql.push_str(match term.connector {
                    Connector::And => " AND ",
                    Connector::Or => " OR ",
                });
            }
            let placeholder = params.bind(&term.value);
            sql.push_str(&term.column);
            sql.push(' ');
            sql.push_str(term.operator.as_str());
            sql.push(' ');
            sql.push_str(&placeholder);
        }
    }
}
