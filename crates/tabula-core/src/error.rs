//! Error types shared by every tabula crate.
//!
//! Expected failures (bad identifiers, missing rows, backend errors) are
//! values of [`Error`]. Builder misuse is reported separately as
//! [`BuildError`] and wrapped as [`Error::Configuration`] when it crosses an
//! operation boundary.

use thiserror::Error;

/// Errors raised when a statement builder is rendered without the clauses
/// it needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// SELECT rendered without a FROM table.
    #[error("FROM table not specified")]
    MissingFrom,

    /// INSERT/UPDATE/DELETE/CREATE TABLE rendered without a table.
    #[error("table not specified")]
    MissingTable,

    /// UPDATE rendered without any SET assignment.
    #[error("no SET clauses specified")]
    NoSetClauses,

    /// CREATE TABLE rendered without any column.
    #[error("no columns specified for CREATE TABLE")]
    NoColumns,

    /// CREATE TABLE column added with an empty name.
    #[error("column name must be provided")]
    EmptyColumnName,

    /// INSERT with an explicit column list whose length differs from the
    /// number of values.
    #[error("number of columns ({columns}) and values ({values}) must match")]
    ColumnValueCountMismatch {
        /// Number of columns listed.
        columns: usize,
        /// Number of values given.
        values: usize,
    },
}

/// Status classification attached to every [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Schema, identifier or constraint violation.
    Validation,
    /// Referenced table or row does not exist.
    NotFound,
    /// Duplicate name or key.
    Conflict,
    /// Backend or infrastructure failure.
    Internal,
    /// Cooperative cancellation was observed.
    Cancelled,
    /// A builder was used without a required clause.
    Configuration,
}

/// The error taxonomy for every public tabula operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Builder used without a required clause.
    #[error("configuration error: {0}")]
    Configuration(#[from] BuildError),

    /// One or more validation failures, in the order they were found.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Referenced table or row is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate column, table or key.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend execution failure, with the backend's own message.
    #[error("storage error: {message}")]
    Storage {
        /// Message reported by the backend.
        message: String,
        /// Whether retrying the operation may succeed.
        transient: bool,
    },

    /// Cooperative cancellation was observed mid-operation.
    #[error("operation was cancelled")]
    Cancelled,

    /// A type name outside the closed set of supported types.
    #[error("unsupported column type: {0}")]
    UnsupportedType(String),
}

impl Error {
    /// Creates a validation error carrying a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Returns the status classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Validation(_) | Self::UnsupportedType(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Storage { .. } => ErrorKind::Internal,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns the ordered list of human-readable messages.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Returns true for storage failures worth retrying.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Storage { transient: true, .. })
    }
}

/// Result type alias for tabula operations.
pub type Result<T> = std::result::Result<T, Error>;
