//! Mapping of driver errors into the tabula error taxonomy.

use tabula_core::Error;

/// SQLite primary result codes worth retrying: `SQLITE_BUSY` and
/// `SQLITE_LOCKED`.
const TRANSIENT_CODES: [&str; 2] = ["5", "6"];

/// Classifies a [`sqlx::Error`] as not-found, conflict, or a transient or
/// fatal storage failure, keeping the backend's message.
#[must_use]
pub fn classify(err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::RowNotFound => Error::NotFound(String::from("Row not found.")),
        sqlx::Error::Database(db) => {
            let message = db.message().to_string();
            let lower = message.to_ascii_lowercase();
            let transient = db
                .code()
                .is_some_and(|code| TRANSIENT_CODES.iter().any(|c| code.as_ref() == *c))
                || lower.contains("database is locked")
                || lower.contains("database is busy");

            if lower.contains("no such table") {
                Error::NotFound(message)
            } else if db.is_unique_violation()
                || lower.contains("unique constraint failed")
                || lower.contains("already exists")
                || lower.contains("already another")
            {
                Error::Conflict(message)
            } else {
                Error::Storage { message, transient }
            }
        }
        sqlx::Error::Io(e) => Error::Storage {
            message: e.to_string(),
            transient: true,
        },
        e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed) => {
            Error::Storage {
                message: e.to_string(),
                transient: true,
            }
        }
        other => Error::Storage {
            message: other.to_string(),
            transient: false,
        },
    }
}
