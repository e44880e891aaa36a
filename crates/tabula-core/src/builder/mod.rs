//! Parameterized statement builders.
//!
//! Builders accumulate fragments and render on every call to `build()`, so a
//! builder may be rendered, changed and rendered again. Values are always
//! bound as parameters; table and column names are written as given and must
//! be validated by the caller.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tabula_core::builder::{Operator, QueryBuilderFactory};
//! use tabula_core::dialect::SqliteDialect;
//!
//! let factory = QueryBuilderFactory::new(Arc::new(SqliteDialect::new()));
//! let query = factory
//!     .delete()
//!     .from("logs")
//!     .where_("level", "DEBUG")
//!     .where_op("created_at", Operator::Lt, "2025-08-01")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(query.sql(), "DELETE FROM logs WHERE level = ?1 AND created_at < ?2;");
//! assert_eq!(query.params()[1].name, "@p1");
//! ```

mod condition;
mod create_table;
mod delete;
mod factory;
mod insert;
mod query;
mod select;
mod update;

pub use condition::{Condition, Connector, Operator};
pub use create_table::{ColumnDef, CreateTable};
pub use delete::Delete;
pub use factory::QueryBuilderFactory;
pub use insert::Insert;
pub use query::{Query, QueryParameter};
pub use select::{Order, Select};
pub use update::Update;
