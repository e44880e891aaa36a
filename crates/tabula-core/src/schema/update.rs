//! Proposed column changes to an existing table.

use serde::{Deserialize, Serialize};

use super::{ColumnMetadata, ColumnSpec};
use crate::dialect::Dialect;

/// One proposed column operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ColumnChange {
    /// Add a new column.
    Add {
        /// Definition of the new column.
        column: ColumnSpec,
    },
    /// Change the definition of the existing column `column.name`.
    Alter {
        /// New definition.
        column: ColumnSpec,
    },
    /// Remove a column.
    Drop {
        /// Existing column name.
        name: String,
    },
    /// Rename a column.
    Rename {
        /// Existing column name.
        from: String,
        /// New column name.
        to: String,
    },
}

/// A set of column changes for one table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableUpdate {
    /// Table being changed.
    pub table_name: String,
    /// Changes, applied in order.
    #[serde(default)]
    pub changes: Vec<ColumnChange>,
}

impl TableUpdate {
    /// Creates an empty update for `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            changes: Vec::new(),
        }
    }

    /// Appends a change.
    #[must_use]
    pub fn change(mut self, change: ColumnChange) -> Self {
        self.changes.push(change);
        self
    }
}

/// Column names as they stand while changes are applied one by one.
struct WorkingColumns {
    names: Vec<String>,
}

impl WorkingColumns {
    fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    fn remove(&mut self, name: &str) {
        self.names.retain(|n| !n.eq_ignore_ascii_case(name));
    }
}

/// Returns the first problem with `update`, or `None`.
pub(super) fn first_violation(
    update: &TableUpdate,
    existing: &[ColumnMetadata],
    dialect: &dyn Dialect,
) -> Option<String> {
    if update.table_name.trim().is_empty() {
        return Some(String::from("Table name cannot be empty."));
    }
    if update.changes.is_empty() {
        return Some(String::from("No column updates were provided."));
    }

    let mut columns = WorkingColumns {
        names: existing.iter().map(|c| c.name.clone()).collect(),
    };
    let invalid = |name: &str| format!("Column name '{name}' is not a valid SQL identifier.");
    let missing = |name: &str| format!("Column '{name}' does not exist.");

    for change in &update.changes {
        match change {
            ColumnChange::Add { column } => {
                if !dialect.is_valid_identifier(&column.name) {
                    return Some(invalid(&column.name));
                }
                if columns.contains(&column.name) {
                    return Some(format!("Column '{}' already exists.", column.name));
                }
                columns.names.push(column.name.clone());
            }
            ColumnChange::Alter { column } => {
                if !columns.contains(&column.name) {
                    return Some(missing(&column.name));
                }
            }
            ColumnChange::Drop { name } => {
                if !columns.contains(name) {
                    return Some(missing(name));
                }
                columns.remove(name);
            }
            ColumnChange::Rename { from, to } => {
                if !columns.contains(from) {
                    return Some(missing(from));
                }
                if !dialect.is_valid_identifier(to) {
                    return Some(invalid(to));
                }
                if columns.contains(to) {
                    return Some(format!(
                        "A column with the new name '{to}' already exists."
                    ));
                }
                columns.remove(from);
                columns.names.push(to.clone());
            }
        }
    }
    None
}
