//! # tabula-core
//!
//! Backend-independent building blocks for working with tables whose shape
//! is only known at run time.
//!
//! This crate provides:
//! - [`dialect`]: per-backend type names, quoting, identity columns and
//!   parameter placeholders
//! - [`builder`]: parameterized SELECT/INSERT/UPDATE/DELETE/CREATE TABLE
//!   builders
//! - [`schema`]: the abstract table model, identifier rules and the schema
//!   compiler
//! - [`row`]: untyped rows and column-oriented datasets
//!
//! ## Compiling a table
//!
//! ```rust
//! use std::sync::Arc;
//! use tabula_core::dialect::SqlServerDialect;
//! use tabula_core::schema::{ColumnSpec, GenericType, SchemaCompiler, TableSpec};
//!
//! let spec = TableSpec::new("People")
//!     .column(ColumnSpec::new("Id", GenericType::Integer).primary_key().auto_increment())
//!     .column(ColumnSpec::new("Name", GenericType::String).length(50));
//!
//! let ddl = SchemaCompiler::new(Arc::new(SqlServerDialect::new()))
//!     .compile(&spec)
//!     .unwrap();
//!
//! assert_eq!(
//!     ddl,
//!     "CREATE TABLE [People] (\n    [Id] INT IDENTITY(1,1) NOT NULL PRIMARY KEY,\n    [Name] NVARCHAR(50) NULL\n);"
//! );
//! ```

pub mod builder;
pub mod cancel;
pub mod dialect;
pub mod error;
pub mod row;
pub mod schema;
pub mod value;

pub use cancel::CancellationToken;
pub use error::{BuildError, Error, ErrorKind, Result};
pub use row::{ColumnarTable, DynamicRow};
pub use rust_decimal::Decimal;
pub use value::{SqlValue, ToSqlValue};
