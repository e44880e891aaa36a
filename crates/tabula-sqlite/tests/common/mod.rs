#![allow(dead_code)]

use tabula_core::schema::{ColumnSpec, GenericType, TableSpec};
use tabula_sqlite::SqliteRepository;
use tempfile::TempDir;

/// A repository over a database file that lives as long as the fixture.
pub struct TestDb {
    pub repo: SqliteRepository<String>,
    _dir: TempDir,
}

pub fn test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("Failed to create temp dir: {e}"));
    let url = format!("sqlite://{}", dir.path().join("tabula.db").display());
    TestDb {
        repo: SqliteRepository::new(url),
        _dir: dir,
    }
}

/// `People(Id INTEGER identity key, Name VARCHAR(50) NOT NULL, Age INTEGER)`.
pub fn people_spec() -> TableSpec {
    TableSpec::new("People")
        .column(
            ColumnSpec::new("Id", GenericType::Integer)
                .primary_key()
                .auto_increment(),
        )
        .column(ColumnSpec::new("Name", GenericType::String).length(50).not_null())
        .column(ColumnSpec::new("Age", GenericType::Integer))
}
