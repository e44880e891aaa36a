//! Cell grid reader and writer contracts.
//!
//! Coordinates are 1-based: row 1 holds the headers, data starts at row 2.
//! A blank cell is the empty string.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read access to a grid of cell texts.
pub trait CellGrid {
    /// Text of the cell at (`row`, `col`), or an empty string when the cell
    /// is blank or outside the grid.
    fn cell_text(&self, row: u32, col: u32) -> String;

    /// Text of the header cell in column `col`.
    fn header_text(&self, col: u32) -> String {
        self.cell_text(1, col)
    }
}

/// Write access used to produce an input template.
pub trait CellGridWriter {
    /// Names the sheet being written.
    fn set_sheet_name(&mut self, name: &str);

    /// Sets the text of the cell at (`row`, `col`).
    fn set_cell_value(&mut self, row: u32, col: u32, value: &str);

    /// Styles the single cell at (`row`, `col`).
    fn set_cell_style(&mut self, row: u32, col: u32, style: CellStyle);

    /// Style applied to every cell of column `col` without its own style.
    fn set_column_style(&mut self, col: u32, style: CellStyle);

    /// Adds a validation rule over a cell range.
    fn add_data_validation(&mut self, validation: DataValidation);

    /// Protects the sheet, keeping the permissions in `protection`.
    fn protect_sheet(&mut self, protection: SheetProtection);
}

/// Visual and protection attributes of a cell or column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    /// Bold font.
    pub bold: bool,
    /// Solid fill color name, e.g. `LightGray`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Whether the cell is locked once the sheet is protected.
    pub locked: bool,
}

/// The input a validation accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationRule {
    /// A whole number of at least `min`.
    WholeNumber { min: i64 },
    /// A decimal of at least `min`.
    Decimal { min: f64 },
    /// A date on or after `min`.
    Date { min: NaiveDate },
    /// One of `items`, offered as a drop-down.
    List { items: Vec<String> },
    /// A formula that must evaluate to true, e.g. `LEN(A2)<=50`.
    Custom { formula: String },
}

/// Message shown when input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorAlert {
    /// Title of the alert box.
    pub title: String,
    /// Body of the alert box.
    pub message: String,
}

/// A validation rule over a cell range such as `B2:B1048576`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValidation {
    /// Cells the rule covers, in `A1:B2` notation.
    pub range: String,
    /// What the cells accept.
    pub rule: ValidationRule,
    /// Whether blank cells pass.
    pub ignore_blank: bool,
    /// Alert shown on rejected input; the application default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_alert: Option<ErrorAlert>,
}

impl DataValidation {
    /// A rule over `range` that accepts blank cells.
    #[must_use]
    pub fn new(range: impl Into<String>, rule: ValidationRule) -> Self {
        Self {
            range: range.into(),
            rule,
            ignore_blank: true,
            error_alert: None,
        }
    }

    /// Replaces the alert shown when input is rejected.
    #[must_use]
    pub fn with_error_alert(
        mut self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.error_alert = Some(ErrorAlert {
            title: title.into(),
            message: message.into(),
        });
        self
    }
}

/// What a user may still do on a protected sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProtection {
    /// Columns may be deleted.
    pub allow_delete_columns: bool,
    /// Columns may be inserted.
    pub allow_insert_columns: bool,
    /// Rows may be deleted.
    pub allow_delete_rows: bool,
    /// Rows may be inserted.
    pub allow_insert_rows: bool,
    /// Ranges may be sorted.
    pub allow_sort: bool,
    /// Column formatting may change.
    pub allow_format_columns: bool,
    /// Locked cells may be selected.
    pub allow_select_locked_cells: bool,
    /// Unlocked cells may be selected.
    pub allow_select_unlocked_cells: bool,
}
