//! Reading column definitions back from a live SQLite database.
//!
//! Two strategies share one trait: [`CatalogIntrospector`] asks SQLite's own
//! catalog (`pragma_table_info`), [`SchemaTextIntrospector`] parses the
//! `CREATE TABLE` text stored in `sqlite_master`. The catalog is preferred;
//! text parsing is kept as a fallback.

use sqlx::sqlite::SqliteConnection;
use sqlx::Row;
use tabula_core::schema::ColumnMetadata;
use tabula_core::{Error, Result};
use tracing::debug;

use crate::error::classify;

/// Reads the column metadata of one table.
#[allow(async_fn_in_trait)]
pub trait SchemaIntrospector {
    /// Short strategy name, for logs.
    fn name(&self) -> &'static str;

    /// Returns the columns of `table` in declaration order.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the table does not exist, or a storage
    /// error from the backend.
    async fn columns(
        &self,
        conn: &mut SqliteConnection,
        table: &str,
    ) -> Result<Vec<ColumnMetadata>>;
}

/// Introspection through `pragma_table_info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogIntrospector;

impl SchemaIntrospector for CatalogIntrospector {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn columns(
        &self,
        conn: &mut SqliteConnection,
        table: &str,
    ) -> Result<Vec<ColumnMetadata>> {
        let Some(create_sql) = table_sql(conn, table).await? else {
            return Err(not_found(table));
        };
        let autoincrement = create_sql.to_ascii_uppercase().contains("AUTOINCREMENT");

        let sql = r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?1) ORDER BY cid"#;
        debug!(sql = %sql, table = %table, "Executing SQL");
        let rows = sqlx::query(sql)
            .bind(table)
            .fetch_all(&mut *conn)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(|row| -> Result<ColumnMetadata> {
                let name: String = row.try_get("name").map_err(classify)?;
                let declared: String = row.try_get("type").map_err(classify)?;
                let not_null: i64 = row.try_get("notnull").map_err(classify)?;
                let pk: i64 = row.try_get("pk").map_err(classify)?;

                let mut meta = metadata_from_declared(name, &declared);
                meta.is_primary_key = pk > 0;
                meta.is_nullable = not_null == 0 && pk == 0;
                meta.is_auto_incrementing = pk > 0 && autoincrement;
                Ok(meta)
            })
            .collect()
    }
}

/// Introspection by parsing the stored `CREATE TABLE` statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaTextIntrospector;

impl SchemaIntrospector for SchemaTextIntrospector {
    fn name(&self) -> &'static str {
        "schema-text"
    }

    async fn columns(
        &self,
        conn: &mut SqliteConnection,
        table: &str,
    ) -> Result<Vec<ColumnMetadata>> {
        match table_sql(conn, table).await? {
            Some(sql) => Ok(parse_create_table(&sql)),
            None => Err(not_found(table)),
        }
    }
}

fn not_found(table: &str) -> Error {
    Error::NotFound(format!("Table '{table}' does not exist."))
}

/// Returns the stored `CREATE TABLE` text of `table`, if the table exists.
pub(crate) async fn table_sql(conn: &mut SqliteConnection, table: &str) -> Result<Option<String>> {
    let sql = "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE";
    debug!(sql = %sql, table = %table, "Executing SQL");
    let row = sqlx::query(sql)
        .bind(table)
        .fetch_optional(&mut *conn)
        .await
        .map_err(classify)?;
    row.map(|r| r.try_get::<Option<String>, _>("sql").map_err(classify))
        .transpose()
        .map(Option::flatten)
}

const CONSTRAINT_KEYWORDS: [&str; 5] = ["CONSTRAINT", "PRIMARY", "UNIQUE", "CHECK", "FOREIGN"];

/// Parses the column list of a `CREATE TABLE` statement.
///
/// The body between the first `(` and the last `)` is split on top-level
/// commas. Each column fragment yields a name (first token, quotes
/// stripped), a declared type (second token, including any parenthesised
/// arguments), and the `NOT NULL`, `PRIMARY KEY` and `AUTOINCREMENT` flags.
/// A table-level `PRIMARY KEY (..)` marks the listed columns.
#[must_use]
pub fn parse_create_table(sql: &str) -> Vec<ColumnMetadata> {
    let (Some(open), Some(close)) = (sql.find('('), sql.rfind(')')) else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }

    let mut columns = Vec::new();
    let mut table_keys = Vec::new();

    for fragment in split_top_level(&sql[open + 1..close]) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let upper = fragment.to_ascii_uppercase();
        let first_word = upper.split_whitespace().next().unwrap_or_default();
        let first_word = first_word.split('(').next().unwrap_or_default();
        if CONSTRAINT_KEYWORDS.contains(&first_word) {
            if upper.contains("PRIMARY KEY") {
                table_keys.extend(parenthesised_names(fragment));
            }
            continue;
        }

        let (name, rest) = split_name(fragment);
        let declared = declared_type(rest);
        let rest_upper = rest.to_ascii_uppercase();
        let is_primary_key = rest_upper.contains("PRIMARY KEY");

        let mut meta = metadata_from_declared(name, declared);
        meta.is_primary_key = is_primary_key;
        meta.is_nullable = !rest_upper.contains("NOT NULL") && !is_primary_key;
        meta.is_auto_incrementing = rest_upper.contains("AUTOINCREMENT");
        columns.push(meta);
    }

    for key in table_keys {
        if let Some(column) = columns.iter_mut().find(|c| c.name.eq_ignore_ascii_case(&key)) {
            column.is_primary_key = true;
            column.is_nullable = false;
        }
    }
    columns
}

/// Builds metadata from a declared type such as `VARCHAR(50)` or
/// `DECIMAL(10, 2)`.
pub(crate) fn metadata_from_declared(name: String, declared: &str) -> ColumnMetadata {
    let declared = declared.trim();
    let (base, args) = match declared.find('(') {
        Some(idx) => (
            declared[..idx].trim(),
            declared[idx + 1..].trim_end_matches(')').trim(),
        ),
        None => (declared, ""),
    };

    let mut meta = ColumnMetadata::new(name, base.to_ascii_uppercase());
    let mut numbers = args.split(',').map(|n| n.trim().parse::<u32>().ok());
    match (numbers.next().flatten(), numbers.next().flatten()) {
        (Some(p), Some(s)) => {
            meta.precision = u8::try_from(p).ok();
            meta.scale = u8::try_from(s).ok();
        }
        (Some(n), None) if is_numeric_type(base) => {
            meta.precision = u8::try_from(n).ok();
            meta.scale = Some(0);
        }
        (Some(n), None) => meta.length = Some(n),
        _ => {}
    }
    meta
}

fn is_numeric_type(base: &str) -> bool {
    let upper = base.to_ascii_uppercase();
    upper.starts_with("DECIMAL") || upper.starts_with("NUMERIC")
}

fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut start = 0;
    for (i, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

fn unquote(name: &str) -> String {
    name.trim_matches(|c| matches!(c, '"' | '`' | '[' | ']'))
        .to_string()
}

fn split_name(fragment: &str) -> (String, &str) {
    // Quoted names may contain spaces
    if let Some(quote) = fragment.chars().next().filter(|c| matches!(c, '"' | '`' | '[')) {
        let closing = if quote == '[' { ']' } else { quote };
        if let Some(end) = fragment[1..].find(closing) {
            return (fragment[1..=end].to_string(), &fragment[end + 2..]);
        }
    }
    match fragment.find(char::is_whitespace) {
        Some(idx) => (unquote(&fragment[..idx]), &fragment[idx..]),
        None => (unquote(fragment), ""),
    }
}

fn declared_type(rest: &str) -> &str {
    let rest = rest.trim_start();
    let mut depth = 0_i32;
    for (i, ch) in rest.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return &rest[..=i];
                }
            }
            c if c.is_whitespace() && depth == 0 => {
                // `VARCHAR (50)` keeps its arguments
                let after = rest[i..].trim_start();
                if after.starts_with('(') {
                    continue;
                }
                return &rest[..i];
            }
            _ => {}
        }
    }
    rest
}

fn parenthesised_names(fragment: &str) -> Vec<String> {
    match (fragment.find('('), fragment.rfind(')')) {
        (Some(open), Some(close)) if close > open => fragment[open + 1..close]
            .split(',')
            .map(|n| unquote(n.trim()))
            .filter(|n| !n.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
