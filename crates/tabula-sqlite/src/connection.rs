//! Per-operation connections.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use tabula_core::{Error, Result};
use tracing::{debug, warn};

use crate::error::classify;

/// Supplies the connection string for each operation.
///
/// The repository asks again on every call and never keeps a connection, so
/// a provider may return a different database per caller (for example per
/// tenant).
pub trait ConnectionProvider: Send + Sync {
    /// Returns a `sqlite:` URL or file path.
    ///
    /// # Errors
    ///
    /// Any error that prevents a connection string from being produced.
    fn connection_string(&self) -> Result<String>;
}

impl ConnectionProvider for String {
    fn connection_string(&self) -> Result<String> {
        Ok(self.clone())
    }
}

impl ConnectionProvider for &'static str {
    fn connection_string(&self) -> Result<String> {
        Ok((*self).to_string())
    }
}

impl<T: ConnectionProvider + ?Sized> ConnectionProvider for Arc<T> {
    fn connection_string(&self) -> Result<String> {
        (**self).connection_string()
    }
}

/// Opens a fresh connection, creating the database file if needed.
pub(crate) async fn open(provider: &impl ConnectionProvider) -> Result<SqliteConnection> {
    let url = provider.connection_string()?;
    if url.trim().is_empty() {
        return Err(Error::validation("Connection string cannot be empty."));
    }
    let options = SqliteConnectOptions::from_str(&url)
        .map_err(classify)?
        .create_if_missing(true);

    debug!("Opening SQLite connection");
    SqliteConnection::connect_with(&options)
        .await
        .map_err(classify)
}

/// Closes `conn` and passes `result` through.
pub(crate) async fn release<T>(conn: SqliteConnection, result: Result<T>) -> Result<T> {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "Failed to close SQLite connection");
    }
    result
}
