//! Untyped rows and column-oriented datasets.

use crate::value::{SqlValue, ToSqlValue};

/// A single row as an ordered list of `(column, value)` pairs.
///
/// Column lookups are case-insensitive, matching how SQL engines resolve
/// unquoted identifiers. Insertion order is kept so that statements built
/// from a row list their columns in a stable order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicRow {
    entries: Vec<(String, SqlValue)>,
}

impl DynamicRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column value and returns the row (builder style).
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl ToSqlValue) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a column value, replacing any value under the same name.
    pub fn set(&mut self, column: impl Into<String>, value: impl ToSqlValue) {
        let column = column.into();
        let value = value.to_sql_value();
        match self.position(&column) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Returns the value stored under `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.position(column).map(|idx| &self.entries[idx].1)
    }

    /// Returns true if the row has a value for `column`.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(column))
    }
}

impl<K: Into<String>, V: ToSqlValue> FromIterator<(K, V)> for DynamicRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

impl IntoIterator for DynamicRow {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A dataset held as one value sequence per column.
///
/// Every column is expected to hold the same number of values. Datasets
/// that break this are repaired with [`truncate_to_shortest`](Self::truncate_to_shortest).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnarTable {
    table_name: String,
    columns: Vec<(String, Vec<SqlValue>)>,
}

impl ColumnarTable {
    /// Creates an empty dataset destined for `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    /// Target table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Adds a column, replacing an existing column of the same name.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<SqlValue>) {
        let name = name.into();
        match self.column_position(&name) {
            Some(idx) => self.columns[idx].1 = values,
            None => self.columns.push((name, values)),
        }
    }

    /// Appends one value to an existing column. Returns false if the
    /// column does not exist.
    pub fn push_value(&mut self, column: &str, value: SqlValue) -> bool {
        match self.column_position(column) {
            Some(idx) => {
                self.columns[idx].1.push(value);
                true
            }
            None => false,
        }
    }

    /// Returns the values of `column`.
    #[must_use]
    pub fn column(&self, column: &str) -> Option<&[SqlValue]> {
        self.column_position(column)
            .map(|idx| self.columns[idx].1.as_slice())
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows, taken from the shortest column.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns
            .iter()
            .map(|(_, values)| values.len())
            .min()
            .unwrap_or(0)
    }

    /// Returns true when the dataset has no columns or no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Names of the columns whose length differs from the first column.
    #[must_use]
    pub fn inconsistent_columns(&self) -> Vec<String> {
        let Some((_, first)) = self.columns.first() else {
            return Vec::new();
        };
        let expected = first.len();
        self.columns
            .iter()
            .filter(|(_, values)| values.len() != expected)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Truncates every column to the shortest length.
    ///
    /// Returns the names of the columns that were inconsistent before the
    /// repair; an empty list means nothing changed.
    pub fn truncate_to_shortest(&mut self) -> Vec<String> {
        let inconsistent = self.inconsistent_columns();
        if !inconsistent.is_empty() {
            let shortest = self.row_count();
            for (_, values) in &mut self.columns {
                values.truncate(shortest);
            }
        }
        inconsistent
    }

    /// Returns row `index` as a [`DynamicRow`].
    #[must_use]
    pub fn row(&self, index: usize) -> Option<DynamicRow> {
        if index >= self.row_count() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|(name, values)| (name.clone(), values[index].clone()))
                .collect(),
        )
    }

    /// Iterates the dataset row by row.
    pub fn rows(&self) -> impl Iterator<Item = DynamicRow> + '_ {
        (0..self.row_count()).filter_map(|index| self.row(index))
    }

    fn column_position(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(column))
    }
}
