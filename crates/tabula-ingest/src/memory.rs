//! An in-memory cell grid.

use serde::{Deserialize, Serialize};

use crate::grid::{CellGrid, CellGridWriter, CellStyle, DataValidation, SheetProtection};

/// A cell carrying its own style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledCell {
    /// 1-based row.
    pub row: u32,
    /// 1-based column.
    pub col: u32,
    /// Style of the cell.
    pub style: CellStyle,
}

/// A column-wide style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledColumn {
    /// 1-based column.
    pub col: u32,
    /// Style of every cell in the column.
    pub style: CellStyle,
}

/// A grid held as rows of strings, with the template decorations recorded
/// alongside.
///
/// Serializes to JSON, so a grid can be read from a file for import or
/// printed after template decoration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryGrid {
    #[serde(default)]
    sheet_name: String,
    #[serde(default)]
    rows: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    cell_styles: Vec<StyledCell>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    column_styles: Vec<StyledColumn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    validations: Vec<DataValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    protection: Option<SheetProtection>,
}

impl MemoryGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a grid from rows of cell texts; the first row is the header.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Sheet name, empty until a template names it.
    #[must_use]
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Cell texts, row by row.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Styles set on single cells, in the order they were set.
    #[must_use]
    pub fn cell_styles(&self) -> &[StyledCell] {
        &self.cell_styles
    }

    /// Styles set on whole columns.
    #[must_use]
    pub fn column_styles(&self) -> &[StyledColumn] {
        &self.column_styles
    }

    /// Validation rules, in the order they were added.
    #[must_use]
    pub fn validations(&self) -> &[DataValidation] {
        &self.validations
    }

    /// Sheet protection, if the sheet is protected.
    #[must_use]
    pub const fn protection(&self) -> Option<&SheetProtection> {
        self.protection.as_ref()
    }

    /// Style of a single cell, if one was set.
    #[must_use]
    pub fn cell_style(&self, row: u32, col: u32) -> Option<&CellStyle> {
        self.cell_styles
            .iter()
            .find(|c| c.row == row && c.col == col)
            .map(|c| &c.style)
    }

    /// Style of a column, if one was set.
    #[must_use]
    pub fn column_style(&self, col: u32) -> Option<&CellStyle> {
        self.column_styles
            .iter()
            .find(|c| c.col == col)
            .map(|c| &c.style)
    }
}

fn index(coordinate: u32) -> Option<usize> {
    coordinate
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
}

impl CellGrid for MemoryGrid {
    fn cell_text(&self, row: u32, col: u32) -> String {
        index(row)
            .zip(index(col))
            .and_then(|(r, c)| self.rows.get(r)?.get(c))
            .cloned()
            .unwrap_or_default()
    }
}

impl CellGridWriter for MemoryGrid {
    fn set_sheet_name(&mut self, name: &str) {
        self.sheet_name = name.to_string();
    }

    fn set_cell_value(&mut self, row: u32, col: u32, value: &str) {
        let (Some(r), Some(c)) = (index(row), index(col)) else {
            return;
        };
        if self.rows.len() <= r {
            self.rows.resize_with(r + 1, Vec::new);
        }
        let cells = &mut self.rows[r];
        if cells.len() <= c {
            cells.resize(c + 1, String::new());
        }
        cells[c] = value.to_string();
    }

    fn set_cell_style(&mut self, row: u32, col: u32, style: CellStyle) {
        match self.cell_styles.iter_mut().find(|c| c.row == row && c.col == col) {
            Some(cell) => cell.style = style,
            None => self.cell_styles.push(StyledCell { row, col, style }),
        }
    }

    fn set_column_style(&mut self, col: u32, style: CellStyle) {
        match self.column_styles.iter_mut().find(|c| c.col == col) {
            Some(column) => column.style = style,
            None => self.column_styles.push(StyledColumn { col, style }),
        }
    }

    fn add_data_validation(&mut self, validation: DataValidation) {
        self.validations.push(validation);
    }

    fn protect_sheet(&mut self, protection: SheetProtection) {
        self.protection = Some(protection);
    }
}
