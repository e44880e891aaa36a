//! The dynamic table repository.
//!
//! Every operation opens its own connection through the
//! [`ConnectionProvider`], runs, and closes it again. Table and column names
//! are checked against the identifier rules before any SQL is produced;
//! values always travel as bound parameters.

use std::collections::HashSet;
use std::sync::Arc;

use sqlx::sqlite::SqliteConnection;
use tabula_core::builder::{ColumnDef, Operator, Order, Query, QueryBuilderFactory};
use tabula_core::dialect::{Dialect, SqliteDialect};
use tabula_core::schema::{ColumnMetadata, ColumnType, GenericType, SchemaCompiler, TableSpec};
use tabula_core::{
    CancellationToken, ColumnarTable, DynamicRow, Error, ErrorKind, Result, SqlValue, ToSqlValue,
};
use tracing::{debug, info, warn};

use crate::bind::{decode_row, prepare};
use crate::connection::{open, release, ConnectionProvider};
use crate::error::classify;
use crate::introspect::{CatalogIntrospector, SchemaIntrospector, SchemaTextIntrospector};

/// One condition of a repository read, update or delete.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column the condition applies to.
    pub column: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Right-hand value, always bound as a parameter.
    pub value: SqlValue,
}

impl Filter {
    /// `column = value`.
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl ToSqlValue) -> Self {
        Self::new(column, Operator::Eq, value)
    }

    /// `column <operator> value`.
    #[must_use]
    pub fn new(column: impl Into<String>, operator: Operator, value: impl ToSqlValue) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.to_sql_value(),
        }
    }

    /// Builds a filter from an operator given as text (`=`, `<>`, `LIKE`, ...).
    ///
    /// # Errors
    ///
    /// A validation error for an unknown operator.
    pub fn parse(
        column: impl Into<String>,
        operator: &str,
        value: impl ToSqlValue,
    ) -> Result<Self> {
        Ok(Self::new(column, operator.parse()?, value))
    }
}

/// What an upsert ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row had the key, so the row was inserted.
    Inserted,
    /// The row with the key was updated.
    Updated,
}

/// Counts of a bulk upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    /// Rows inserted.
    pub inserted: u64,
    /// Rows updated in place.
    pub updated: u64,
}

/// Reads and writes tables whose shape is only known at run time.
#[derive(Debug)]
pub struct SqliteRepository<P: ConnectionProvider> {
    provider: P,
    factory: QueryBuilderFactory,
    compiler: SchemaCompiler,
}

impl<P: ConnectionProvider> SqliteRepository<P> {
    /// Creates a repository over `provider`.
    pub fn new(provider: P) -> Self {
        let dialect: Arc<dyn Dialect> = Arc::new(SqliteDialect::new());
        Self {
            provider,
            factory: QueryBuilderFactory::new(Arc::clone(&dialect)),
            compiler: SchemaCompiler::new(dialect),
        }
    }

    /// The builder factory used for every statement.
    pub const fn factory(&self) -> &QueryBuilderFactory {
        &self.factory
    }

    /// The schema compiler bound to the SQLite dialect.
    pub const fn compiler(&self) -> &SchemaCompiler {
        &self.compiler
    }

    // ---------------------------------------------------------------
    // Table lifecycle
    // ---------------------------------------------------------------

    /// Creates `table` from name/type pairs.
    ///
    /// With `primary_key` set, that column becomes the key and
    /// auto-increments when it is an integer. Without it, the first column
    /// is the key, auto-incrementing only when it is an integer.
    ///
    /// # Errors
    ///
    /// A validation error for invalid names, an empty column list or an
    /// unknown key column; a conflict when the table exists.
    pub async fn create_table(
        &self,
        table: &str,
        columns: &[(&str, ColumnType)],
        primary_key: Option<&str>,
    ) -> Result<()> {
        self.check_table(table)?;
        if columns.is_empty() {
            return Err(Error::validation("Columns cannot be empty."));
        }
        for (name, _) in columns {
            self.check_column(name)?;
        }
        let key = match primary_key {
            Some(key) => {
                if !columns.iter().any(|(name, _)| name.eq_ignore_ascii_case(key)) {
                    return Err(Error::validation(format!(
                        "Primary key column '{key}' is not one of the table columns."
                    )));
                }
                key
            }
            None => columns[0].0,
        };

        let create = columns
            .iter()
            .fold(self.factory.create_table().table(table), |create, (name, ty)| {
                let mut def = ColumnDef::new(*name, *ty);
                if name.eq_ignore_ascii_case(key) {
                    def = def.primary_key();
                    if *ty == ColumnType::Integer {
                        def = def.auto_increment();
                    }
                }
                create.column(def)
            });

        info!(table = %table, "Creating table");
        self.execute(&create.build()?).await.map(drop)
    }

    /// Creates `table` from full column definitions, unless it exists.
    ///
    /// # Errors
    ///
    /// A validation error for invalid names or an empty column list.
    pub async fn create_table_with(&self, table: &str, columns: Vec<ColumnDef>) -> Result<()> {
        self.check_table(table)?;
        if columns.is_empty() {
            return Err(Error::validation("Columns cannot be empty."));
        }
        for column in &columns {
            self.check_column(&column.name)?;
        }
        let create = columns
            .into_iter()
            .fold(self.factory.create_table().table(table).if_not_exists(), |create, def| {
                create.column(def)
            });

        info!(table = %table, "Creating table if missing");
        self.execute(&create.build()?).await.map(drop)
    }

    /// Compiles `spec` and creates the table.
    ///
    /// # Errors
    ///
    /// The compiler's validation error, or a conflict when the table exists.
    pub async fn create_table_from_spec(&self, spec: &TableSpec) -> Result<()> {
        let sql = self.compiler.compile(spec)?;
        info!(table = %spec.table_name, columns = spec.columns.len(), "Creating table from spec");
        self.execute(&Query::raw(sql)).await.map(drop)
    }

    /// Renames `from` to `to`.
    ///
    /// # Errors
    ///
    /// Not found when `from` is missing, conflict when `to` exists.
    pub async fn rename_table(&self, from: &str, to: &str) -> Result<()> {
        self.check_table(from)?;
        self.check_table(to)?;
        let sql = format!("ALTER TABLE {from} RENAME TO {to};");
        info!(from = %from, to = %to, "Renaming table");
        self.execute(&Query::raw(sql)).await.map(drop)
    }

    /// Drops `table` if it exists.
    ///
    /// # Errors
    ///
    /// A validation error for an invalid name, or a storage error.
    pub async fn drop_table(&self, table: &str) -> Result<()> {
        self.check_table(table)?;
        let sql = format!("DROP TABLE IF EXISTS {table};");
        info!(table = %table, "Dropping table");
        self.execute(&Query::raw(sql)).await.map(drop)
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Returns every row of `table`.
    ///
    /// # Errors
    ///
    /// Not found when the table is missing.
    pub async fn get_all(&self, table: &str) -> Result<Vec<DynamicRow>> {
        self.check_table(table)?;
        let query = self.factory.select().from(table).build()?;
        self.fetch(&query).await
    }

    /// Returns the row whose `key_column` equals `id`.
    ///
    /// # Errors
    ///
    /// Not found when the table is missing. A missing row is `Ok(None)`.
    pub async fn get_by_id(
        &self,
        table: &str,
        key_column: &str,
        id: impl ToSqlValue,
    ) -> Result<Option<DynamicRow>> {
        self.check_table(table)?;
        self.check_column(key_column)?;
        let query = self.factory.select().from(table).where_(key_column, id).build()?;
        Ok(self.fetch(&query).await?.into_iter().next())
    }

    /// Projects `columns` (all when empty) of the rows matching any of
    /// `filters`, ordered by `order_by`.
    ///
    /// # Errors
    ///
    /// A validation error for invalid names; not found when the table is
    /// missing.
    pub async fn get(
        &self,
        table: &str,
        columns: &[&str],
        filters: &[Filter],
        order_by: &[(&str, Order)],
    ) -> Result<Vec<DynamicRow>> {
        self.check_table(table)?;
        for column in columns {
            self.check_column(column)?;
        }
        self.check_filters(filters)?;

        let mut select = self.factory.select().from(table).columns(columns);
        for (i, f) in filters.iter().enumerate() {
            select = if i == 0 {
                select.where_op(&f.column, f.operator, f.value.clone())
            } else {
                select.or_op(&f.column, f.operator, f.value.clone())
            };
        }
        for (column, order) in order_by {
            self.check_column(column)?;
            select = select.order_by(column, *order);
        }
        self.fetch(&select.build()?).await
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Inserts `row` and returns the number of rows written.
    ///
    /// # Errors
    ///
    /// A validation error for an empty row or invalid names, a conflict on
    /// a duplicate key.
    pub async fn add(&self, table: &str, row: &DynamicRow) -> Result<u64> {
        self.check_table(table)?;
        self.check_row(row)?;
        let query = self.factory.insert().into(table).row(row).build()?;
        self.execute(&query).await
    }

    /// Sets the columns of `row` on the row whose `key_column` equals `id`.
    ///
    /// # Errors
    ///
    /// A validation error for an empty row or invalid names.
    pub async fn update_by_id(
        &self,
        table: &str,
        row: &DynamicRow,
        key_column: &str,
        id: impl ToSqlValue,
    ) -> Result<u64> {
        self.check_table(table)?;
        self.check_row(row)?;
        self.check_column(key_column)?;
        let query = self
            .factory
            .update()
            .table(table)
            .set_row(row)
            .where_(key_column, id)
            .build()?;
        self.execute(&query).await
    }

    /// Sets the columns of `row` on every row matching any of `filters`.
    ///
    /// # Errors
    ///
    /// A validation error for an empty row, invalid names or an empty
    /// filter list.
    pub async fn update_where(
        &self,
        table: &str,
        row: &DynamicRow,
        filters: &[Filter],
    ) -> Result<u64> {
        self.check_table(table)?;
        self.check_row(row)?;
        if filters.is_empty() {
            return Err(Error::validation("Conditions cannot be empty."));
        }
        self.check_filters(filters)?;
        let mut update = self.factory.update().table(table).set_row(row);
        for (i, f) in filters.iter().enumerate() {
            update = if i == 0 {
                update.where_op(&f.column, f.operator, f.value.clone())
            } else {
                update.or_op(&f.column, f.operator, f.value.clone())
            };
        }
        let query = update.build()?;
        self.execute(&query).await
    }

    /// Deletes the row whose `key_column` equals `id`.
    ///
    /// # Errors
    ///
    /// A validation error for invalid names.
    pub async fn delete_by_id(
        &self,
        table: &str,
        key_column: &str,
        id: impl ToSqlValue,
    ) -> Result<u64> {
        self.check_table(table)?;
        self.check_column(key_column)?;
        let query = self.factory.delete().from(table).where_(key_column, id).build()?;
        self.execute(&query).await
    }

    /// Deletes every row matching any of `filters`.
    ///
    /// # Errors
    ///
    /// A validation error for invalid names or an empty filter list.
    pub async fn delete_where(&self, table: &str, filters: &[Filter]) -> Result<u64> {
        self.check_table(table)?;
        if filters.is_empty() {
            return Err(Error::validation("Conditions cannot be empty."));
        }
        self.check_filters(filters)?;
        let mut delete = self.factory.delete().from(table);
        for (i, f) in filters.iter().enumerate() {
            delete = if i == 0 {
                delete.where_op(&f.column, f.operator, f.value.clone())
            } else {
                delete.or_op(&f.column, f.operator, f.value.clone())
            };
        }
        let query = delete.build()?;
        self.execute(&query).await
    }

    /// Updates the row with the key held in `row`, or inserts `row` when no
    /// such row exists.
    ///
    /// # Errors
    ///
    /// A validation error when `row` lacks `key_column`.
    pub async fn upsert(
        &self,
        table: &str,
        row: &DynamicRow,
        key_column: &str,
    ) -> Result<UpsertOutcome> {
        self.check_table(table)?;
        self.check_row(row)?;
        self.check_column(key_column)?;

        let mut conn = open(&self.provider).await?;
        let result = self.upsert_on(&mut conn, table, row, key_column).await;
        release(conn, result).await
    }

    async fn upsert_on(
        &self,
        conn: &mut SqliteConnection,
        table: &str,
        row: &DynamicRow,
        key_column: &str,
    ) -> Result<UpsertOutcome> {
        let Some(key) = row.get(key_column) else {
            return Err(Error::validation(format!(
                "The row must contain the primary key column '{key_column}'."
            )));
        };

        let lookup = self
            .factory
            .select()
            .columns(&[key_column])
            .from(table)
            .where_(key_column, key.clone())
            .build()?;
        let exists = !fetch_on(conn, &lookup).await?.is_empty();

        if exists {
            let query = self
                .factory
                .update()
                .table(table)
                .set_row(row)
                .where_(key_column, key.clone())
                .build()?;
            execute_on(conn, &query).await?;
            Ok(UpsertOutcome::Updated)
        } else {
            let query = self.factory.insert().into(table).row(row).build()?;
            execute_on(conn, &query).await?;
            Ok(UpsertOutcome::Inserted)
        }
    }

    /// Inserts every row of `data` into its table, skipping columns the
    /// table generates itself.
    ///
    /// The token is checked before each statement; rows written before a
    /// cancellation stay written.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] when the token fires, a validation error when
    /// no insertable column remains, or the first storage error.
    pub async fn insert_columnar(
        &self,
        data: &ColumnarTable,
        token: &CancellationToken,
    ) -> Result<u64> {
        let table = data.table_name();
        self.check_table(table)?;
        token.check()?;

        let mut conn = open(&self.provider).await?;
        let result = self.insert_columnar_on(&mut conn, data, token).await;
        release(conn, result).await
    }

    async fn insert_columnar_on(
        &self,
        conn: &mut SqliteConnection,
        data: &ColumnarTable,
        token: &CancellationToken,
    ) -> Result<u64> {
        let table = data.table_name();
        let generated = generated_columns(&columns_on(conn, table).await?);
        let columns = self.insertable_columns(data, &generated)?;

        info!(
            table = %table,
            rows = data.row_count(),
            columns = columns.len(),
            "Bulk inserting rows"
        );
        let mut written = 0;
        for row in data.rows() {
            token.check()?;
            let values = columns
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or(SqlValue::Null));
            let query = self
                .factory
                .insert()
                .into(table)
                .columns(&columns)
                .values(values)
                .build()?;
            written += execute_on(conn, &query).await?;
        }
        info!(table = %table, rows = written, "Bulk insert finished");
        Ok(written)
    }

    /// Upserts every row of `data` by `key_column`.
    ///
    /// # Errors
    ///
    /// As [`insert_columnar`](Self::insert_columnar), plus a validation
    /// error when `data` has no `key_column`.
    pub async fn upsert_columnar(
        &self,
        data: &ColumnarTable,
        key_column: &str,
        token: &CancellationToken,
    ) -> Result<UpsertSummary> {
        let table = data.table_name();
        self.check_table(table)?;
        self.check_column(key_column)?;
        if data.column(key_column).is_none() {
            return Err(Error::validation(format!(
                "The data must contain the primary key column '{key_column}'."
            )));
        }
        for column in data.column_names() {
            self.check_column(column)?;
        }
        token.check()?;

        let mut conn = open(&self.provider).await?;
        let result = self.upsert_columnar_on(&mut conn, data, key_column, token).await;
        release(conn, result).await
    }

    async fn upsert_columnar_on(
        &self,
        conn: &mut SqliteConnection,
        data: &ColumnarTable,
        key_column: &str,
        token: &CancellationToken,
    ) -> Result<UpsertSummary> {
        let table = data.table_name();
        info!(table = %table, rows = data.row_count(), key = %key_column, "Bulk upserting rows");
        let mut summary = UpsertSummary::default();
        for row in data.rows() {
            token.check()?;
            match self.upsert_on(conn, table, &row, key_column).await? {
                UpsertOutcome::Inserted => summary.inserted += 1,
                UpsertOutcome::Updated => summary.updated += 1,
            }
        }
        info!(
            table = %table,
            inserted = summary.inserted,
            updated = summary.updated,
            "Bulk upsert finished"
        );
        Ok(summary)
    }

    // ---------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------

    /// Reads the column definitions of `table`.
    ///
    /// # Errors
    ///
    /// Not found when the table is missing.
    pub async fn column_metadata(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        self.check_table(table)?;
        let mut conn = open(&self.provider).await?;
        let result = columns_on(&mut conn, table).await;
        release(conn, result).await
    }

    /// Column names of `table` with their generic types.
    ///
    /// Declared types the generic model does not know map to
    /// [`GenericType::String`].
    ///
    /// # Errors
    ///
    /// Not found when the table is missing.
    pub async fn get_columns(&self, table: &str) -> Result<Vec<(String, GenericType)>> {
        let columns = self.column_metadata(table).await?;
        Ok(columns
            .into_iter()
            .map(|c| {
                let generic = GenericType::from_backend_type(&c.data_type);
                if generic == GenericType::String && !is_text_type(&c.data_type) {
                    warn!(
                        column = %c.name,
                        data_type = %c.data_type,
                        "Unknown column type, treating as String"
                    );
                }
                (c.name, generic)
            })
            .collect())
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn check_table(&self, name: &str) -> Result<()> {
        if self.compiler.is_valid_identifier(name) {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "Table name '{name}' is not a valid SQL identifier."
            )))
        }
    }

    fn check_column(&self, name: &str) -> Result<()> {
        if self.compiler.is_valid_identifier(name) {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "Column name '{name}' is not a valid SQL identifier."
            )))
        }
    }

    fn check_row(&self, row: &DynamicRow) -> Result<()> {
        if row.is_empty() {
            return Err(Error::validation("Row cannot be empty."));
        }
        row.columns().try_for_each(|c| self.check_column(c))
    }

    fn check_filters(&self, filters: &[Filter]) -> Result<()> {
        filters.iter().try_for_each(|f| self.check_column(&f.column))
    }

    fn insertable_columns(
        &self,
        data: &ColumnarTable,
        generated: &HashSet<String>,
    ) -> Result<Vec<String>> {
        let mut columns = Vec::new();
        for name in data.column_names() {
            if generated.contains(&name.to_ascii_lowercase()) {
                debug!(column = %name, "Skipping generated column");
                continue;
            }
            self.check_column(name)?;
            columns.push(name.to_string());
        }
        if columns.is_empty() {
            return Err(Error::validation("No insertable columns were provided."));
        }
        Ok(columns)
    }

    async fn execute(&self, query: &Query) -> Result<u64> {
        let mut conn = open(&self.provider).await?;
        let result = execute_on(&mut conn, query).await;
        release(conn, result).await
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<DynamicRow>> {
        let mut conn = open(&self.provider).await?;
        let result = fetch_on(&mut conn, query).await;
        release(conn, result).await
    }
}

async fn execute_on(conn: &mut SqliteConnection, query: &Query) -> Result<u64> {
    debug!(sql = %query.sql(), params = query.params().len(), "Executing SQL");
    prepare(query)
        .execute(&mut *conn)
        .await
        .map(|done| done.rows_affected())
        .map_err(classify)
}

async fn fetch_on(conn: &mut SqliteConnection, query: &Query) -> Result<Vec<DynamicRow>> {
    debug!(sql = %query.sql(), params = query.params().len(), "Executing SQL");
    let rows = prepare(query).fetch_all(&mut *conn).await.map_err(classify)?;
    rows.iter().map(decode_row).collect()
}

/// Reads columns through the catalog, falling back to the stored
/// `CREATE TABLE` text.
async fn columns_on(conn: &mut SqliteConnection, table: &str) -> Result<Vec<ColumnMetadata>> {
    match CatalogIntrospector.columns(conn, table).await {
        Ok(columns) => Ok(columns),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(e),
        Err(e) => {
            warn!(
                error = %e,
                strategy = SchemaTextIntrospector.name(),
                "Catalog introspection failed, falling back"
            );
            SchemaTextIntrospector.columns(conn, table).await
        }
    }
}

fn generated_columns(columns: &[ColumnMetadata]) -> HashSet<String> {
    columns
        .iter()
        .filter(|c| c.is_auto_incrementing)
        .map(|c| c.name.to_ascii_lowercase())
        .collect()
}

fn is_text_type(declared: &str) -> bool {
    let upper = declared.to_ascii_uppercase();
    ["TEXT", "CHAR", "CLOB", "STRING"]
        .iter()
        .any(|t| upper.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str, identity: bool) -> ColumnMetadata {
        ColumnMetadata {
            is_auto_incrementing: identity,
            ..ColumnMetadata::new(name, "INTEGER")
        }
    }

    #[test]
    fn test_filter_parse() {
        let f = Filter::parse("age", ">=", 18).unwrap();
        assert_eq!(f.operator, Operator::GtEq);
        assert_eq!(f.value, SqlValue::Int(18));

        let err = Filter::parse("age", "~", 18).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_generated_columns() {
        let set = generated_columns(&[meta("Id", true), meta("Age", false)]);
        assert!(set.contains("id"));
        assert!(!set.contains("age"));
    }

    #[test]
    fn test_insertable_columns_skip_generated() {
        let repo = SqliteRepository::new("sqlite::memory:");
        let mut data = ColumnarTable::new("people");
        data.push_column("Id", vec![SqlValue::Int(1)]);
        data.push_column("Name", vec![SqlValue::Text(String::from("a"))]);

        let generated = generated_columns(&[meta("id", true)]);
        let columns = repo.insertable_columns(&data, &generated).unwrap();
        assert_eq!(columns, vec![String::from("Name")]);

        let mut only_id = ColumnarTable::new("people");
        only_id.push_column("Id", vec![SqlValue::Int(1)]);
        let err = repo.insertable_columns(&only_id, &generated).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_text_types() {
        assert!(is_text_type("VARCHAR"));
        assert!(is_text_type("text"));
        assert!(!is_text_type("GEOMETRY"));
    }

    #[test]
    fn test_name_checks() {
        let repo = SqliteRepository::new("sqlite::memory:");
        assert!(repo.check_table("people").is_ok());
        assert!(repo.check_table("drop table").is_err());
        assert!(repo.check_column("select").is_err());
        assert!(repo.check_row(&DynamicRow::new()).is_err());
    }
}
