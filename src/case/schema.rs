//! Column and index declarations used by fixture inputs and expectations.
//!
//! Fixtures declare columns as `"<name> <type>"` strings and indexes as
//! `"<index>:<key>[|<key>...][:<ts column>]"` strings.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// A column or index declaration that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SchemaError(pub String);

/// Column types a fixture may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Bool,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    String,
    Timestamp,
    Date,
}

impl ColumnType {
    /// Canonical lowercase name, as written back in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Bool => "bool",
            ColumnType::SmallInt => "smallint",
            ColumnType::Int => "int",
            ColumnType::BigInt => "bigint",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::String => "string",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Date => "date",
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, ColumnType::Float | ColumnType::Double)
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            ColumnType::SmallInt | ColumnType::Int | ColumnType::BigInt | ColumnType::Timestamp
        )
    }
}

impl FromStr for ColumnType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(ColumnType::Bool),
            "smallint" | "int16" => Ok(ColumnType::SmallInt),
            "int" | "int32" => Ok(ColumnType::Int),
            "bigint" | "int64" => Ok(ColumnType::BigInt),
            "float" => Ok(ColumnType::Float),
            "double" => Ok(ColumnType::Double),
            "string" | "varchar" => Ok(ColumnType::String),
            "timestamp" => Ok(ColumnType::Timestamp),
            "date" => Ok(ColumnType::Date),
            other => Err(SchemaError(format!("unknown column type '{}'", other))),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Parses a `"<name> <type>"` declaration.
    pub fn parse(decl: &str) -> Result<Self, SchemaError> {
        let mut parts = decl.split_whitespace();
        let (Some(name), Some(ty), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(SchemaError(format!(
                "column declaration '{}' must be '<name> <type>'",
                decl
            )));
        };
        Ok(Self::new(name, ty.parse()?))
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.ty)
    }
}

/// An index over one or more key columns, optionally ordered by a time column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDef {
    pub name: String,
    pub keys: Vec<String>,
    pub ts: Option<String>,
}

impl IndexDef {
    /// Parses an `"<index>:<key>[|<key>...][:<ts column>]"` declaration.
    pub fn parse(decl: &str) -> Result<Self, SchemaError> {
        let parts: Vec<&str> = decl.split(':').map(str::trim).collect();
        if !(2..=3).contains(&parts.len()) || parts.iter().any(|p| p.is_empty()) {
            return Err(SchemaError(format!(
                "index declaration '{}' must be '<index>:<keys>[:<ts>]'",
                decl
            )));
        }
        Ok(Self {
            name: parts[0].to_string(),
            keys: parts[1].split('|').map(|k| k.trim().to_string()).collect(),
            ts: parts.get(2).map(|ts| ts.to_string()),
        })
    }

    /// Every column the index refers to.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str).chain(self.ts.as_deref())
    }
}

/// Everything the engine needs to create an input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
}

impl TableDef {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Parses a list of column declarations, stopping at the first bad one.
pub fn parse_columns<S: AsRef<str>>(decls: &[S]) -> Result<Vec<ColumnDef>, SchemaError> {
    decls.iter().map(|d| ColumnDef::parse(d.as_ref())).collect()
}
