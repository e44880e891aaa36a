//! SQL identifier rules.
//!
//! Table and column names are structural parts of a statement and cannot be
//! bound as parameters, so every name that reaches SQL text must first pass
//! [`is_valid_identifier`].

use std::sync::LazyLock;

use regex::Regex;

/// Longest identifier accepted by every supported backend.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("Invalid identifier regex"));

/// Keywords reserved by every supported dialect.
pub const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
    "END", "EXISTS", "FOREIGN", "FROM", "FULL", "GRANT", "GROUP", "HAVING", "IN", "INDEX",
    "INNER", "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "NOT", "NULL", "ON", "OR",
    "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TO",
    "UNION", "UNIQUE", "UPDATE", "VALUES", "WHEN", "WHERE",
];

/// Returns true if `name` is one of [`RESERVED_WORDS`] or of `extra`
/// (case-insensitive).
#[must_use]
pub fn is_reserved_word(name: &str, extra: &[&str]) -> bool {
    RESERVED_WORDS
        .iter()
        .chain(extra)
        .any(|word| word.eq_ignore_ascii_case(name))
}

/// Checks the shape of an identifier: ASCII letter or underscore first,
/// then letters, digits or underscores, at most
/// [`MAX_IDENTIFIER_LENGTH`] characters.
#[must_use]
pub fn has_identifier_shape(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_IDENTIFIER_LENGTH && IDENTIFIER.is_match(name)
}

/// Returns true if `name` can be used unquoted as a table or column name.
///
/// `extra` lists dialect-specific reserved words on top of
/// [`RESERVED_WORDS`].
#[must_use]
pub fn is_valid_identifier(name: &str, extra: &[&str]) -> bool {
    has_identifier_shape(name) && !is_reserved_word(name, extra)
}
