//! # tabula-ingest
//!
//! Turns spreadsheet-like cell grids into typed, column-oriented datasets.
//!
//! - [`grid`]: the reader/writer contracts a grid source implements
//! - [`memory`]: an in-memory, JSON-serializable grid
//! - [`pipeline`]: header matching, typed parsing and problem reporting
//! - [`template`]: input templates with per-column validation rules
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::schema::ColumnMetadata;
//! use tabula_core::{CancellationToken, SqlValue};
//! use tabula_ingest::{ingest, MemoryGrid};
//!
//! let grid = MemoryGrid::from_rows(vec![
//!     vec![String::from("Name"), String::from("Age")],
//!     vec![String::from("Ada"), String::from("36")],
//! ]);
//! let columns = [
//!     ColumnMetadata::new("Name", "nvarchar"),
//!     ColumnMetadata::new("Age", "int"),
//! ];
//!
//! let report = ingest(&grid, &columns, "People", &CancellationToken::new()).unwrap();
//! assert!(report.is_clean());
//! assert_eq!(report.table.column("Age"), Some(&[SqlValue::Int(36)][..]));
//! ```

pub mod grid;
pub mod memory;
pub mod parse;
pub mod pipeline;
pub mod template;

pub use grid::{
    CellGrid, CellGridWriter, CellStyle, DataValidation, SheetProtection, ValidationRule,
};
pub use memory::MemoryGrid;
pub use pipeline::{ingest, IngestReport};
pub use template::decorate_template;
