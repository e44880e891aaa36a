//! # tabula-sqlite
//!
//! A SQLite-backed repository for tables whose shape is only known at run
//! time.
//!
//! [`SqliteRepository`] covers the table lifecycle (create, rename, drop),
//! row reads and writes through [`DynamicRow`](tabula_core::DynamicRow),
//! upserts, bulk inserts of a [`ColumnarTable`](tabula_core::ColumnarTable)
//! and introspection of existing tables.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tabula_core::schema::ColumnType;
//! use tabula_core::DynamicRow;
//! use tabula_sqlite::SqliteRepository;
//!
//! # async fn run() -> tabula_core::Result<()> {
//! let repo = SqliteRepository::new("sqlite:people.db");
//! repo.create_table("people", &[("id", ColumnType::Integer), ("name", ColumnType::Text)], None)
//!     .await?;
//! repo.add("people", &DynamicRow::new().with("name", "Ada")).await?;
//! let rows = repo.get_all("people").await?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! ```

mod bind;
pub mod connection;
pub mod error;
pub mod introspect;
pub mod repository;

pub use connection::ConnectionProvider;
pub use error::classify;
pub use introspect::{CatalogIntrospector, SchemaIntrospector, SchemaTextIntrospector};
pub use repository::{Filter, SqliteRepository, UpsertOutcome, UpsertSummary};
