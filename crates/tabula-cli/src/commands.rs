//! Subcommand implementations.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use tabula_core::dialect::Dialect;
use tabula_core::schema::{ColumnChange, SchemaCompiler, TableSpec, TableUpdate};
use tabula_core::CancellationToken;
use tabula_ingest::{decorate_template, ingest, MemoryGrid};
use tabula_sqlite::{ConnectionProvider, SqliteRepository};
use tracing::{info, warn};

/// How `import` writes the ingested rows.
#[derive(Debug, Default)]
pub struct ImportOptions {
    /// Key column to upsert by; rows are inserted when absent.
    pub upsert: Option<String>,
    /// Write the dataset even when ingestion reported problems.
    pub allow_warnings: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Compiles the table spec in `spec` for `dialect`.
pub fn compile(spec: &Path, dialect: Arc<dyn Dialect>) -> anyhow::Result<String> {
    let spec: TableSpec = read_json(spec)?;
    Ok(SchemaCompiler::new(dialect).compile(&spec)?)
}

/// Creates the table described by the spec in `spec`.
pub async fn create<P: ConnectionProvider>(
    repo: &SqliteRepository<P>,
    spec: &Path,
) -> anyhow::Result<()> {
    let spec: TableSpec = read_json(spec)?;
    repo.create_table_from_spec(&spec).await?;
    info!(table = %spec.table_name, "Table created");
    Ok(())
}

/// Column metadata of `table` as pretty JSON.
pub async fn columns<P: ConnectionProvider>(
    repo: &SqliteRepository<P>,
    table: &str,
) -> anyhow::Result<String> {
    let columns = repo.column_metadata(table).await?;
    Ok(serde_json::to_string_pretty(&columns)?)
}

/// Checks the column changes in `changes` against the live columns of `table`.
pub async fn validate_update<P: ConnectionProvider>(
    repo: &SqliteRepository<P>,
    dialect: Arc<dyn Dialect>,
    table: &str,
    changes: &Path,
) -> anyhow::Result<()> {
    let changes: Vec<ColumnChange> = read_json(changes)?;
    let update = TableUpdate {
        table_name: table.to_string(),
        changes,
    };
    let existing = repo.column_metadata(table).await?;
    SchemaCompiler::new(dialect).validate_update(&update, &existing)?;
    info!(table = %table, changes = update.changes.len(), "Update is valid");
    Ok(())
}

/// The decorated input template of `table` as pretty JSON.
pub async fn template<P: ConnectionProvider>(
    repo: &SqliteRepository<P>,
    table: &str,
) -> anyhow::Result<String> {
    let columns = repo.column_metadata(table).await?;
    let mut grid = MemoryGrid::new();
    decorate_template(&mut grid, &columns)?;
    Ok(serde_json::to_string_pretty(&grid)?)
}

/// Ingests the grid in `grid` and writes it to `table`. Ctrl-C cancels
/// between rows.
pub async fn import<P: ConnectionProvider>(
    repo: &SqliteRepository<P>,
    table: &str,
    grid: &Path,
    options: &ImportOptions,
) -> anyhow::Result<()> {
    let grid = MemoryGrid::from_rows(read_json(grid)?);
    let columns = repo.column_metadata(table).await?;

    let token = CancellationToken::new();
    let watcher = token.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling import");
            watcher.cancel();
        }
    });

    let result = write_rows(repo, &grid, &columns, table, options, &token).await;
    interrupt.abort();
    result
}

async fn write_rows<P: ConnectionProvider>(
    repo: &SqliteRepository<P>,
    grid: &MemoryGrid,
    columns: &[tabula_core::schema::ColumnMetadata],
    table: &str,
    options: &ImportOptions,
    token: &CancellationToken,
) -> anyhow::Result<()> {
    let report = ingest(grid, columns, table, token)?;
    for problem in &report.problems {
        warn!(table = %table, "{problem}");
    }
    check_report(report.problems.len(), options.allow_warnings)?;

    match &options.upsert {
        Some(key) => {
            let summary = repo.upsert_columnar(&report.table, key, token).await?;
            info!(
                table = %table,
                inserted = summary.inserted,
                updated = summary.updated,
                "Import finished"
            );
        }
        None => {
            let written = repo.insert_columnar(&report.table, token).await?;
            info!(table = %table, rows = written, "Import finished");
        }
    }
    Ok(())
}

/// Refuses to write a dataset with problems unless warnings are allowed.
fn check_report(problems: usize, allow_warnings: bool) -> anyhow::Result<()> {
    if problems > 0 && !allow_warnings {
        bail!(
            "Refusing to import with {problems} problem(s); pass --allow-warnings to import anyway."
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tabula_core::dialect::SqlServerDialect;

    fn json_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_compile_spec_file() {
        let file = json_file(
            r#"{
                "tableName": "People",
                "columns": [
                    {"name": "Id", "dataType": "Integer", "isPrimaryKey": true, "isAutoIncrementing": true},
                    {"name": "Name", "dataType": "String", "length": 50}
                ]
            }"#,
        );
        let ddl = compile(file.path(), Arc::new(SqlServerDialect::new())).unwrap();
        assert_eq!(
            ddl,
            "CREATE TABLE [People] (\n    [Id] INT IDENTITY(1,1) NOT NULL PRIMARY KEY,\n    [Name] NVARCHAR(50) NULL\n);"
        );
    }

    #[test]
    fn test_compile_reports_validation() {
        let file = json_file(r#"{"tableName": "select", "columns": []}"#);
        let err = compile(file.path(), Arc::new(SqlServerDialect::new())).unwrap_err();
        assert!(err.downcast_ref::<tabula_core::Error>().is_some());
    }

    #[test]
    fn test_read_json_errors_name_the_file() {
        let file = json_file("not json");
        let err = read_json::<TableSpec>(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }

    #[test]
    fn test_check_report() {
        assert!(check_report(0, false).is_ok());
        assert!(check_report(2, true).is_ok());
        let err = check_report(2, false).unwrap_err();
        assert!(err.to_string().contains("--allow-warnings"));
    }

    #[tokio::test]
    async fn test_import_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("cli.db").display());
        let repo = SqliteRepository::new(url);

        let spec = json_file(
            r#"{
                "tableName": "People",
                "columns": [
                    {"name": "Id", "dataType": "Integer", "isPrimaryKey": true, "isAutoIncrementing": true},
                    {"name": "Name", "dataType": "String", "length": 50, "isNullable": false},
                    {"name": "Age", "dataType": "Integer"}
                ]
            }"#,
        );
        create(&repo, spec.path()).await.unwrap();

        let grid = json_file(r#"[["Name", "Age"], ["Ada", "36"], ["Bob", "x"]]"#);
        let strict = ImportOptions::default();
        assert!(import(&repo, "People", grid.path(), &strict).await.is_err());
        assert!(repo.get_all("People").await.unwrap().is_empty());

        let lenient = ImportOptions {
            allow_warnings: true,
            ..ImportOptions::default()
        };
        import(&repo, "People", grid.path(), &lenient).await.unwrap();
        assert_eq!(repo.get_all("People").await.unwrap().len(), 2);

        let template = template(&repo, "People").await.unwrap();
        assert!(template.contains("Data Input"));
    }
}
