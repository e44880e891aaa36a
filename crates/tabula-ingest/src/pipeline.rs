//! Grid to dataset ingestion.
//!
//! The pipeline never stops at the first bad cell: it returns the best
//! effort dataset together with every problem it found. Only structural
//! problems (no metadata, no headers, no data) are fatal.

use tabula_core::schema::ColumnMetadata;
use tabula_core::{CancellationToken, ColumnarTable, Error, Result, SqlValue};
use tracing::{debug, info, warn};

use crate::grid::CellGrid;
use crate::parse::{default_value, parse_cell};

/// The outcome of an ingestion: the dataset and the problems found while
/// building it.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// The best-effort dataset.
    pub table: ColumnarTable,
    /// Every problem found, in the order it was found.
    pub problems: Vec<String>,
}

impl IngestReport {
    /// True when no problem was reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// A header kept for ingestion, with the grid column it was read from.
struct Retained<'a> {
    header: String,
    position: u32,
    meta: &'a ColumnMetadata,
}

/// Reads `grid` into a dataset for `table_name`, typed by `columns`.
///
/// Headers are read from row 1 up to the first blank cell. Headers without
/// metadata are reported and skipped, and non-nullable columns without a
/// header are reported. Data rows are read from row 2 up to the first row
/// whose kept cells are all blank. Invalid cells are reported; in a
/// non-nullable column they are replaced by the type's default value.
///
/// # Errors
///
/// [`Error::Validation`] with every problem found so far when the metadata
/// or table name is empty, or the grid has no header or data row;
/// [`Error::Cancelled`] when `token` fires between rows.
pub fn ingest(
    grid: &impl CellGrid,
    columns: &[ColumnMetadata],
    table_name: &str,
    token: &CancellationToken,
) -> Result<IngestReport> {
    if columns.is_empty() {
        return Err(Error::validation("Column metadata cannot be empty."));
    }
    if table_name.trim().is_empty() {
        return Err(Error::validation("Table name cannot be empty."));
    }

    let headers = read_headers(grid);
    if headers.is_empty() {
        return Err(Error::validation("No headers found in the grid."));
    }
    info!(table = %table_name, headers = headers.len(), "Ingesting grid");

    let mut problems = Vec::new();
    let retained = retain_headers(headers, columns, &mut problems);

    let missing: Vec<&str> = columns
        .iter()
        .filter(|c| !c.is_nullable && !c.is_auto_incrementing)
        .filter(|c| !retained.iter().any(|r| r.meta.name.eq_ignore_ascii_case(&c.name)))
        .map(|c| c.name.as_str())
        .collect();
    if !missing.is_empty() {
        problems.push(format!("Missing required columns: {}.", missing.join(", ")));
    }

    let mut table = ColumnarTable::new(table_name);
    for column in &retained {
        table.push_column(column.meta.name.clone(), Vec::new());
    }

    let mut row = 2;
    while row_has_data(grid, row, &retained) {
        token.check()?;
        for column in &retained {
            let value = read_cell(grid, row, column, &mut problems);
            table.push_value(&column.meta.name, value);
        }
        row += 1;
    }

    if row == 2 {
        problems.push(String::from("No valid data rows found in the grid."));
        return Err(Error::Validation(problems));
    }

    if let Some(message) = reconcile_row_counts(&mut table) {
        problems.push(message);
    }

    if problems.is_empty() {
        info!(table = %table_name, rows = table.row_count(), "Grid ingested");
    } else {
        warn!(
            table = %table_name,
            rows = table.row_count(),
            problems = problems.len(),
            "Grid ingested with problems"
        );
    }
    Ok(IngestReport { table, problems })
}

/// Truncates every column of `table` to the shortest one and returns the
/// report message when the lengths differed.
pub fn reconcile_row_counts(table: &mut ColumnarTable) -> Option<String> {
    let inconsistent = table.inconsistent_columns();
    if inconsistent.is_empty() {
        return None;
    }
    table.truncate_to_shortest();
    Some(format!(
        "Inconsistent row sizes for columns: {}. Truncating to shortest row count.",
        inconsistent.join(", ")
    ))
}

fn read_headers(grid: &impl CellGrid) -> Vec<(u32, String)> {
    let mut headers = Vec::new();
    let mut col = 1;
    loop {
        let text = grid.header_text(col);
        if text.trim().is_empty() {
            return headers;
        }
        headers.push((col, text));
        col += 1;
    }
}

fn retain_headers<'a>(
    headers: Vec<(u32, String)>,
    columns: &'a [ColumnMetadata],
    problems: &mut Vec<String>,
) -> Vec<Retained<'a>> {
    let mut invalid = Vec::new();
    let mut retained: Vec<Retained<'a>> = Vec::new();

    for (position, header) in headers {
        let key = header.trim();
        match columns.iter().find(|c| c.name.eq_ignore_ascii_case(key)) {
            Some(meta) if retained.iter().any(|r| std::ptr::eq(r.meta, meta)) => {
                problems.push(format!(
                    "Duplicate header '{header}' at column {position}. Ignoring repeated column."
                ));
            }
            Some(meta) => retained.push(Retained {
                header,
                position,
                meta,
            }),
            None => invalid.push(header),
        }
    }

    if !invalid.is_empty() {
        problems.push(format!(
            "Invalid headers found: {}. Ignoring invalid columns.",
            invalid.join(", ")
        ));
    }
    retained
}

fn row_has_data(grid: &impl CellGrid, row: u32, retained: &[Retained<'_>]) -> bool {
    retained
        .iter()
        .any(|c| !grid.cell_text(row, c.position).trim().is_empty())
}

fn read_cell(
    grid: &impl CellGrid,
    row: u32,
    column: &Retained<'_>,
    problems: &mut Vec<String>,
) -> SqlValue {
    let text = grid.cell_text(row, column.position);
    let ty = column.meta.generic_type();

    let mut value = SqlValue::Null;
    if !text.trim().is_empty() {
        match &ty {
            Ok(ty) => match parse_cell(&text, *ty, column.meta, &column.header, row) {
                Ok(parsed) => value = parsed,
                Err(message) => {
                    debug!(row, column = %column.header, "Rejected cell");
                    problems.push(message);
                }
            },
            Err(_) => problems.push(format!(
                "Unsupported data type '{}' for column '{}' at row {row}.",
                column.meta.data_type, column.header
            )),
        }
    }

    if value.is_null() && !column.meta.is_nullable {
        problems.push(format!(
            "Value for non-nullable column '{}' at row {row} cannot be null.",
            column.header
        ));
        value = ty.map_or(SqlValue::Null, default_value);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGrid;

    fn grid(rows: &[&[&str]]) -> MemoryGrid {
        MemoryGrid::from_rows(
            rows.iter()
                .map(|r| r.iter().map(ToString::to_string).collect())
                .collect(),
        )
    }

    fn required(name: &str, ty: &str) -> ColumnMetadata {
        ColumnMetadata {
            is_nullable: false,
            ..ColumnMetadata::new(name, ty)
        }
    }

    fn run(g: &MemoryGrid, columns: &[ColumnMetadata]) -> Result<IngestReport> {
        ingest(g, columns, "People", &CancellationToken::new())
    }

    #[test]
    fn test_clean_grid() {
        let g = grid(&[&["Name", "Age"], &["Ada", "36"], &["Bob", ""]]);
        let columns = [ColumnMetadata::new("Name", "nvarchar"), ColumnMetadata::new("Age", "int")];
        let report = run(&g, &columns).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.table.table_name(), "People");
        assert_eq!(report.table.row_count(), 2);
        assert_eq!(
            report.table.column("Age").unwrap(),
            &[SqlValue::Int(36), SqlValue::Null]
        );
    }

    #[test]
    fn test_bad_integer_in_required_column() {
        let g = grid(&[&["Age"], &["thirty"]]);
        let report = run(&g, &[required("Age", "int")]).unwrap();

        assert_eq!(report.table.column("Age").unwrap(), &[SqlValue::Int(0)]);
        assert_eq!(
            report.problems,
            vec![
                String::from("Expected integer for column 'Age' at row 2, got 'thirty'."),
                String::from("Value for non-nullable column 'Age' at row 2 cannot be null."),
            ]
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_invalid_headers_are_skipped_by_position() {
        let g = grid(&[
            &["Extra", "Name", "Other"],
            &["x", "Ada", "y"],
            &["z", "", "w"],
        ]);
        let report = run(&g, &[ColumnMetadata::new("name", "string")]).unwrap();

        assert_eq!(
            report.problems,
            vec![String::from("Invalid headers found: Extra, Other. Ignoring invalid columns.")]
        );
        assert_eq!(report.table.column_names().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(
            report.table.column("name").unwrap(),
            &[SqlValue::Text(String::from("Ada"))]
        );
    }

    #[test]
    fn test_missing_required_columns() {
        let g = grid(&[&["Name"], &["Ada"]]);
        let identity = ColumnMetadata {
            is_auto_incrementing: true,
            is_primary_key: true,
            ..required("Id", "int")
        };
        let columns = [
            identity,
            ColumnMetadata::new("Name", "string"),
            required("Email", "string"),
            required("Age", "int"),
        ];
        let report = run(&g, &columns).unwrap();
        assert_eq!(report.problems, vec![String::from("Missing required columns: Email, Age.")]);
        assert_eq!(report.table.row_count(), 1);
    }

    #[test]
    fn test_headers_stop_at_first_blank() {
        let g = grid(&[&["Name", "", "Age"], &["Ada", "", "36"]]);
        let columns = [ColumnMetadata::new("Name", "string"), ColumnMetadata::new("Age", "int")];
        let report = run(&g, &columns).unwrap();
        assert_eq!(report.table.column_count(), 1);
    }

    #[test]
    fn test_rows_stop_at_first_blank_row() {
        let g = grid(&[&["Name"], &["Ada"], &["  "], &["Bob"]]);
        let report = run(&g, &[ColumnMetadata::new("Name", "string")]).unwrap();
        assert_eq!(report.table.row_count(), 1);
    }

    #[test]
    fn test_unsupported_type() {
        let g = grid(&[&["Shape"], &["circle"]]);
        let report = run(&g, &[required("Shape", "geometry")]).unwrap();
        assert_eq!(
            report.problems,
            vec![
                String::from("Unsupported data type 'geometry' for column 'Shape' at row 2."),
                String::from("Value for non-nullable column 'Shape' at row 2 cannot be null."),
            ]
        );
        assert_eq!(report.table.column("Shape").unwrap(), &[SqlValue::Null]);
    }

    #[test]
    fn test_duplicate_header() {
        let g = grid(&[&["Name", "NAME"], &["Ada", "Bob"]]);
        let report = run(&g, &[ColumnMetadata::new("Name", "string")]).unwrap();
        assert_eq!(
            report.problems,
            vec![String::from(
                "Duplicate header 'NAME' at column 2. Ignoring repeated column."
            )]
        );
        assert_eq!(
            report.table.column("Name").unwrap(),
            &[SqlValue::Text(String::from("Ada"))]
        );
    }

    #[test]
    fn test_fatal_inputs() {
        let g = grid(&[&["Name"], &["Ada"]]);
        let token = CancellationToken::new();

        let err = ingest(&g, &[], "People", &token).unwrap_err();
        assert_eq!(err.messages(), vec![String::from("Column metadata cannot be empty.")]);

        let columns = [ColumnMetadata::new("Name", "string")];
        let err = ingest(&g, &columns, " ", &token).unwrap_err();
        assert_eq!(err.messages(), vec![String::from("Table name cannot be empty.")]);

        let err = ingest(&MemoryGrid::new(), &columns, "People", &token).unwrap_err();
        assert_eq!(err.messages(), vec![String::from("No headers found in the grid.")]);
    }

    #[test]
    fn test_no_data_rows_keeps_earlier_problems() {
        let g = grid(&[&["Name", "Extra"]]);
        let err = run(&g, &[ColumnMetadata::new("Name", "string")]).unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                String::from("Invalid headers found: Extra. Ignoring invalid columns."),
                String::from("No valid data rows found in the grid."),
            ]
        );
    }

    #[test]
    fn test_cancelled() {
        let g = grid(&[&["Name"], &["Ada"]]);
        let token = CancellationToken::new();
        token.cancel();
        let columns = [ColumnMetadata::new("Name", "string")];
        let err = ingest(&g, &columns, "People", &token).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_reconcile_row_counts() {
        let mut table = ColumnarTable::new("t");
        table.push_column("a", vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]);
        table.push_column("b", vec![SqlValue::Int(1), SqlValue::Int(2)]);

        let message = reconcile_row_counts(&mut table);
        assert_eq!(
            message.as_deref(),
            Some("Inconsistent row sizes for columns: b. Truncating to shortest row count.")
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("a").unwrap().len(), 2);

        assert_eq!(reconcile_row_counts(&mut table), None);
    }
}
