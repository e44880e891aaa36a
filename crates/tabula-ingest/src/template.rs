//! Input templates: a header row plus per-column validation rules.

use tabula_core::schema::{ColumnMetadata, GenericType};
use tabula_core::{Error, Result};
use tracing::debug;

use crate::grid::{CellGridWriter, CellStyle, DataValidation, SheetProtection, ValidationRule};
use crate::parse::MIN_DATE;

/// Name of the worksheet a template is written to.
pub const SHEET_NAME: &str = "Data Input";

/// Last row covered by the column validations.
pub const LAST_ROW: u32 = 1_048_576;

/// Smallest value of the backend decimal type, as a float.
const DECIMAL_MIN: f64 = -7.922_816_251_426_434e28;

/// Writes the input template for `columns` into `writer`.
///
/// Row 1 holds the column names, bold on a light-gray fill and locked. Data
/// cells are unlocked and each column gets a validation matching its type.
/// The sheet is then protected so columns cannot be inserted or deleted.
///
/// # Errors
///
/// A validation error for empty metadata or an empty column name, and
/// [`Error::UnsupportedType`] for an unknown column type. Nothing is
/// written when an error is returned.
pub fn decorate_template<W: CellGridWriter + ?Sized>(
    writer: &mut W,
    columns: &[ColumnMetadata],
) -> Result<()> {
    if columns.is_empty() {
        return Err(Error::validation("Column metadata cannot be empty."));
    }
    let mut typed = Vec::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        if column.name.trim().is_empty() {
            return Err(Error::validation(format!(
                "Column name at index {i} cannot be empty."
            )));
        }
        let ty = column.generic_type().map_err(|_| {
            Error::UnsupportedType(format!(
                "Invalid data type '{}' for column '{}'.",
                column.data_type, column.name
            ))
        })?;
        typed.push((column, ty));
    }

    writer.set_sheet_name(SHEET_NAME);
    for (col, (column, _)) in (1..).zip(&typed) {
        writer.set_cell_value(1, col, &column.name);
        writer.set_cell_style(1, col, header_style());
    }

    for (col, (column, ty)) in (1..).zip(&typed) {
        writer.set_column_style(
            col,
            CellStyle {
                locked: false,
                ..CellStyle::default()
            },
        );
        if let Some(validation) = validation_for(col, column, *ty) {
            debug!(column = %column.name, range = %validation.range, "Adding validation");
            writer.add_data_validation(validation);
        }
    }

    writer.protect_sheet(SheetProtection {
        allow_delete_columns: false,
        allow_insert_columns: false,
        allow_delete_rows: true,
        allow_insert_rows: true,
        allow_sort: true,
        allow_format_columns: true,
        allow_select_locked_cells: false,
        allow_select_unlocked_cells: true,
    });
    Ok(())
}

fn header_style() -> CellStyle {
    CellStyle {
        bold: true,
        fill: Some(String::from("LightGray")),
        locked: true,
    }
}

fn validation_for(col: u32, column: &ColumnMetadata, ty: GenericType) -> Option<DataValidation> {
    let letter = column_letter(col);
    let range = format!("{letter}2:{letter}{LAST_ROW}");
    let rule = match ty {
        GenericType::Integer => ValidationRule::WholeNumber {
            min: i64::from(i32::MIN),
        },
        GenericType::Decimal => ValidationRule::Decimal { min: DECIMAL_MIN },
        GenericType::DateTime => ValidationRule::Date { min: MIN_DATE },
        GenericType::Boolean => ValidationRule::List {
            items: vec![String::from("TRUE"), String::from("FALSE")],
        },
        GenericType::String => {
            let length = column.length.filter(|n| *n > 0)?;
            return Some(
                DataValidation::new(
                    range,
                    ValidationRule::Custom {
                        formula: format!("LEN({letter}2)<={length}"),
                    },
                )
                .with_error_alert(
                    "Invalid Input",
                    format!("Text length must be less than or equal to {length} characters."),
                ),
            );
        }
    };
    Some(DataValidation::new(range, rule))
}

/// Spreadsheet column letters for a 1-based column number: 1 is `A`, 27 is
/// `AA`. Zero yields an empty string.
#[must_use]
pub fn column_letter(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or_default()));
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}
