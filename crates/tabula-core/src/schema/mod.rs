//! Abstract table model.
//!
//! A [`TableSpec`] describes a table without reference to any backend. The
//! [`SchemaCompiler`] turns it into DDL for one [`Dialect`](crate::dialect::Dialect);
//! [`ColumnMetadata`] is the reverse direction, read back from a live schema.

mod compiler;
pub mod identifier;
mod update;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use compiler::SchemaCompiler;
pub use identifier::{is_valid_identifier, MAX_IDENTIFIER_LENGTH};
pub use update::{ColumnChange, TableUpdate};

/// The closed set of backend-independent column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericType {
    /// Character data, optionally length-bounded.
    String,
    /// 32-bit signed integer.
    Integer,
    /// Fixed-point number with optional precision and scale.
    Decimal,
    /// Date and time of day.
    DateTime,
    /// True or false.
    Boolean,
}

impl GenericType {
    /// Returns the canonical name (`String`, `Integer`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Decimal => "Decimal",
            Self::DateTime => "DateTime",
            Self::Boolean => "Boolean",
        }
    }

    /// Maps a backend type name onto the generic set, defaulting to
    /// [`GenericType::String`] for anything unrecognised.
    ///
    /// Length/precision suffixes such as `VARCHAR(50)` are ignored. Used by
    /// introspection, which must not fail on exotic declared types.
    #[must_use]
    pub fn from_backend_type(type_name: &str) -> Self {
        let upper = type_name.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or_default().trim();
        if base.contains("INT") {
            Self::Integer
        } else if ["REAL", "FLOAT", "DOUBLE", "DECIMAL", "NUMERIC", "MONEY"]
            .iter()
            .any(|t| base.starts_with(t))
        {
            Self::Decimal
        } else if base.starts_with("DATE") || base.starts_with("TIME") {
            Self::DateTime
        } else if base.starts_with("BOOL") || base == "BIT" {
            Self::Boolean
        } else {
            Self::String
        }
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenericType {
    type Err = Error;

    /// Parses a user- or metadata-supplied type name.
    ///
    /// Accepts the canonical names and the common backend aliases
    /// (`int`, `nvarchar`, `bit`, ...), case-insensitively. Anything else
    /// is [`Error::UnsupportedType`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "bigint" | "smallint" => Ok(Self::Integer),
            "decimal" | "numeric" | "float" | "double" | "real" => Ok(Self::Decimal),
            "datetime" | "date" | "timestamp" => Ok(Self::DateTime),
            "bit" | "bool" | "boolean" => Ok(Self::Boolean),
            "string" | "text" | "nvarchar" | "varchar" | "char" | "nchar" => Ok(Self::String),
            _ => Err(Error::UnsupportedType(s.to_string())),
        }
    }
}

/// Storage classes used by the statement builders and the simple
/// create-table operations of the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Whole number.
    Integer,
    /// Floating point.
    Real,
    /// Character data.
    Text,
    /// Raw bytes.
    Blob,
    /// Numeric affinity.
    Numeric,
    /// True or false.
    Boolean,
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INTEGER" => Ok(Self::Integer),
            "REAL" => Ok(Self::Real),
            "TEXT" => Ok(Self::Text),
            "BLOB" => Ok(Self::Blob),
            "NUMERIC" => Ok(Self::Numeric),
            "BOOLEAN" => Ok(Self::Boolean),
            _ => Err(Error::UnsupportedType(s.to_string())),
        }
    }
}

/// One column of a [`TableSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Generic data type.
    pub data_type: GenericType,
    /// Maximum length for [`GenericType::String`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Total digits for [`GenericType::Decimal`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    /// Fractional digits for [`GenericType::Decimal`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
    /// Whether NULL is allowed.
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    /// Whether this column is the primary key.
    #[serde(default)]
    pub is_primary_key: bool,
    /// Whether values are generated by the backend.
    #[serde(default)]
    pub is_auto_incrementing: bool,
}

const fn default_nullable() -> bool {
    true
}

impl ColumnSpec {
    /// Creates a nullable column with no constraints.
    pub fn new(name: impl Into<String>, data_type: GenericType) -> Self {
        Self {
            name: name.into(),
            data_type,
            length: None,
            precision: None,
            scale: None,
            is_nullable: true,
            is_primary_key: false,
            is_auto_incrementing: false,
        }
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets decimal precision and scale.
    #[must_use]
    pub const fn precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Marks the column as backend-generated.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.is_auto_incrementing = true;
        self
    }
}

/// An abstract table: a name plus ordered columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    /// Table name.
    pub table_name: String,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    /// Creates a table with no columns.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }
}

/// A column as it exists in a live schema.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    /// Column name.
    pub name: String,
    /// Backend type name, without length or precision suffix.
    pub data_type: String,
    /// Declared maximum length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Declared precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    /// Declared scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
    /// Whether NULL is allowed.
    #[serde(default)]
    pub is_nullable: bool,
    /// Whether values are generated by the backend.
    #[serde(default)]
    pub is_auto_incrementing: bool,
    /// Whether this column is the primary key.
    #[serde(default)]
    pub is_primary_key: bool,
}

impl ColumnMetadata {
    /// Creates metadata for a nullable column.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            ..Self::default()
        }
    }

    /// Strict generic type of this column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] when `data_type` is not a known
    /// type name.
    pub fn generic_type(&self) -> Result<GenericType, Error> {
        self.data_type.parse()
    }
}

impl From<&ColumnSpec> for ColumnMetadata {
    fn from(spec: &ColumnSpec) -> Self {
        Self {
            name: spec.name.clone(),
            data_type: spec.data_type.as_str().to_string(),
            length: spec.length,
            precision: spec.precision,
            scale: spec.scale,
            is_nullable: spec.is_nullable && !spec.is_primary_key,
            is_auto_incrementing: spec.is_auto_incrementing,
            is_primary_key: spec.is_primary_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_type_aliases() {
        assert_eq!("int".parse::<GenericType>().unwrap(), GenericType::Integer);
        assert_eq!("NVARCHAR".parse::<GenericType>().unwrap(), GenericType::String);
        assert_eq!("double".parse::<GenericType>().unwrap(), GenericType::Decimal);
        assert_eq!("date".parse::<GenericType>().unwrap(), GenericType::DateTime);
        assert_eq!("bit".parse::<GenericType>().unwrap(), GenericType::Boolean);
    }

    #[test]
    fn test_generic_type_unsupported() {
        let err = "geometry".parse::<GenericType>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(t) if t == "geometry"));
    }

    #[test]
    fn test_from_backend_type_defaults_to_string() {
        assert_eq!(GenericType::from_backend_type("BIGINT"), GenericType::Integer);
        assert_eq!(
            GenericType::from_backend_type("decimal(10, 2)"),
            GenericType::Decimal
        );
        assert_eq!(GenericType::from_backend_type("TIMESTAMP"), GenericType::DateTime);
        assert_eq!(GenericType::from_backend_type("BOOLEAN"), GenericType::Boolean);
        assert_eq!(GenericType::from_backend_type("VARCHAR(50)"), GenericType::String);
        assert_eq!(GenericType::from_backend_type("GEOMETRY"), GenericType::String);
        assert_eq!(GenericType::from_backend_type(""), GenericType::String);
    }

    #[test]
    fn test_column_type_parse() {
        assert_eq!("text".parse::<ColumnType>().unwrap(), ColumnType::Text);
        assert!(matches!(
            "VARCHAR".parse::<ColumnType>(),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_table_spec_json() {
        let json = r#"{
            "tableName": "people",
            "columns": [
                {"name": "id", "dataType": "Integer", "isPrimaryKey": true, "isAutoIncrementing": true, "isNullable": false},
                {"name": "name", "dataType": "String", "length": 100}
            ]
        }"#;
        let spec: TableSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.table_name, "people");
        assert_eq!(spec.columns.len(), 2);
        assert!(spec.columns[0].is_primary_key);
        assert!(spec.columns[1].is_nullable);
        assert_eq!(spec.columns[1].length, Some(100));
    }

    #[test]
    fn test_metadata_from_spec() {
        let spec = ColumnSpec::new("id", GenericType::Integer)
            .primary_key()
            .auto_increment();
        let meta = ColumnMetadata::from(&spec);
        assert_eq!(meta.data_type, "Integer");
        assert!(!meta.is_nullable);
        assert!(meta.is_auto_incrementing);
        assert_eq!(meta.generic_type().unwrap(), GenericType::Integer);
    }
}
