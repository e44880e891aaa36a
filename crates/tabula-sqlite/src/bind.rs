//! Moving values between tabula and sqlx.

use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};
use tabula_core::builder::Query;
use tabula_core::value::DATETIME_FORMAT;
use tabula_core::{DynamicRow, Result, SqlValue};

use crate::error::classify;

type RawQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Prepares `query` with every parameter bound positionally.
pub(crate) fn prepare(query: &Query) -> RawQuery<'_> {
    query
        .values()
        .fold(sqlx::query(query.sql()), |q, value| bind_value(q, value.clone()))
}

/// Binds a SqlValue parameter to a raw query.
fn bind_value(query: RawQuery<'_>, value: SqlValue) -> RawQuery<'_> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Decimal(d) => query.bind(d.to_string()),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::DateTime(dt) => query.bind(dt.format(DATETIME_FORMAT).to_string()),
        SqlValue::Blob(b) => query.bind(b),
    }
}

/// Reads every column of `row` using the storage class of the stored
/// value rather than the declared column type.
pub(crate) fn decode_row(row: &SqliteRow) -> Result<DynamicRow> {
    let mut out = DynamicRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        let storage = {
            let raw = row.try_get_raw(index).map_err(classify)?;
            if raw.is_null() {
                None
            } else {
                Some(raw.type_info().name().to_string())
            }
        };
        let value = match storage.as_deref() {
            None => SqlValue::Null,
            Some("INTEGER" | "INT4" | "BIGINT" | "BOOLEAN") => {
                SqlValue::Int(row.try_get_unchecked(index).map_err(classify)?)
            }
            Some("REAL") => SqlValue::Float(row.try_get_unchecked(index).map_err(classify)?),
            Some("BLOB") => SqlValue::Blob(row.try_get_unchecked(index).map_err(classify)?),
            Some(_) => SqlValue::Text(row.try_get_unchecked(index).map_err(classify)?),
        };
        out.set(column.name(), value);
    }
    Ok(out)
}
