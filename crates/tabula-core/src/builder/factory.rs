//! Builders bound to one dialect.

use std::sync::Arc;

use super::{CreateTable, Delete, Insert, Select, Update};
use crate::dialect::Dialect;

/// Hands out statement builders that all share one dialect.
#[derive(Debug, Clone)]
pub struct QueryBuilderFactory {
    dialect: Arc<dyn Dialect>,
}

impl QueryBuilderFactory {
    /// Creates a factory for `dialect`.
    #[must_use]
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self { dialect }
    }

    /// The dialect shared by every builder from this factory.
    #[must_use]
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// A new SELECT builder.
    #[must_use]
    pub fn select(&self) -> Select {
        Select::new(Arc::clone(&self.dialect))
    }

    /// A new INSERT builder.
    #[must_use]
    pub fn insert(&self) -> Insert {
        Insert::new(Arc::clone(&self.dialect))
    }

    /// A new UPDATE builder.
    #[must_use]
    pub fn update(&self) -> Update {
        Update::new(Arc::clone(&self.dialect))
    }

    /// A new DELETE builder.
    #[must_use]
    pub fn delete(&self) -> Delete {
        Delete::new(Arc::clone(&self.dialect))
    }

    /// A new CREATE TABLE builder.
    #[must_use]
    pub fn create_table(&self) -> CreateTable {
        CreateTable::new(Arc::clone(&self.dialect))
    }
}
