//! Core data model types: column descriptors and scalar cell values.
//!
//! A [`Field`] is produced by a record source once its schema is known (from a header row,
//! from an explicit layout, or from synthesized placeholder names). A [`Row`] is a sequence of
//! [`Value`]s positionally aligned with the source's fields at the time it was produced.

use std::fmt;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Serialize, Serializer};

use crate::error::{LoaderError, LoaderResult};

/// One raw row produced by a record source.
pub type Row = Vec<Value>;

/// Declared SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Length-bounded text, rendered as `varchar(n)`.
    Varchar(usize),
    /// Unbounded text.
    Text,
    /// 64-bit integer. Used for loader-managed columns.
    Integer,
}

impl Default for ColumnType {
    fn default() -> Self {
        Self::Varchar(255)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Varchar(n) => write!(f, "varchar({n})"),
            Self::Text => f.write_str("text"),
            Self::Integer => f.write_str("integer"),
        }
    }
}

/// A named, typed column descriptor.
///
/// The `name` is always the coerced form of `original_name`: it only contains
/// `[A-Za-z0-9_]`, never has doubled underscores, never starts or ends with one, and is never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    original_name: String,
    name: String,
    declared_type: ColumnType,
}

impl Field {
    /// Create a field.
    ///
    /// When `enforce_coercion` is `true`, a name that would be altered by coercion is rejected
    /// with [`LoaderError::InvalidFieldName`]. Otherwise the coerced name is used silently.
    pub fn new(
        original_name: impl Into<String>,
        declared_type: ColumnType,
        enforce_coercion: bool,
    ) -> LoaderResult<Self> {
        let original_name = original_name.into();
        let name = coerce_name(&original_name);
        if name.is_empty() || (enforce_coercion && name != original_name) {
            return Err(LoaderError::InvalidFieldName {
                name: original_name,
            });
        }
        Ok(Self {
            original_name,
            name,
            declared_type,
        })
    }

    /// Strict `varchar(255)` field: the name must already be a valid column name.
    pub fn text(name: impl Into<String>) -> LoaderResult<Self> {
        Self::new(name, ColumnType::default(), true)
    }

    /// Lenient field: the name is coerced without complaint.
    pub fn coerced(name: impl Into<String>, declared_type: ColumnType) -> LoaderResult<Self> {
        Self::new(name, declared_type, false)
    }

    /// Placeholder field for the 1-based `position`, e.g. `unnamed_field003`.
    pub fn unnamed(position: usize, declared_type: ColumnType) -> Self {
        let name = format!("unnamed_field{position:03}");
        Self {
            original_name: name.clone(),
            name,
            declared_type,
        }
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Coerced column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> ColumnType {
        self.declared_type
    }
}

/// Coerce an arbitrary label into a column name.
///
/// `#` becomes `_num_`, `%` becomes `_pct_`, every run of characters outside `[A-Za-z0-9_]`
/// becomes a single `_`, runs of `_` collapse, and one leading and trailing `_` is stripped.
pub fn coerce_name(name: &str) -> String {
    let replaced = name.replace('#', "_num_").replace('%', "_pct_");
    let mut out = String::with_capacity(replaced.len());
    for ch in replaced.chars() {
        let ch = if ch.is_ascii_alphanumeric() || ch == '_' {
            ch
        } else {
            '_'
        };
        if ch == '_' && out.ends_with('_') {
            continue;
        }
        out.push(ch);
    }
    let trimmed = out.strip_prefix('_').unwrap_or(&out);
    let trimmed = trimmed.strip_suffix('_').unwrap_or(trimmed);
    trimmed.to_owned()
}

/// A single scalar cell value, mirroring SQLite's storage classes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing/empty value.
    #[default]
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 string.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Maps empty text to [`Value::Null`]; everything else is returned unchanged.
    pub fn normalized(self) -> Self {
        match self {
            Self::Text(s) if s.is_empty() => Self::Null,
            other => other,
        }
    }

    /// Render as a SQLite literal that fits on a single line.
    ///
    /// Line breaks inside text are spliced in with `char(10)` / `char(13)`.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_owned(),
            Self::Integer(v) => v.to_string(),
            Self::Real(v) if v.is_nan() => "NULL".to_owned(),
            Self::Real(v) if v.is_infinite() => {
                if *v > 0.0 {
                    "1e999".to_owned()
                } else {
                    "-1e999".to_owned()
                }
            }
            Self::Real(v) => format!("{v:?}"),
            Self::Text(s) => quote_text(s),
            Self::Blob(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }
}

pub(crate) fn quote_text(s: &str) -> String {
    if !s.contains(['\n', '\r']) {
        return format!("'{}'", s.replace('\'', "''"));
    }
    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in s.chars() {
        let code = match ch {
            '\n' => 10,
            '\r' => 13,
            _ => {
                current.push(ch);
                continue;
            }
        };
        if !current.is_empty() {
            parts.push(format!("'{}'", current.replace('\'', "''")));
            current.clear();
        }
        parts.push(format!("char({code})"));
    }
    if !current.is_empty() {
        parts.push(format!("'{}'", current.replace('\'', "''")));
    }
    parts.join("||")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(_) => f.write_str(&self.to_sql_literal()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Real(v) => serializer.serialize_f64(*v),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Blob(b) => serializer.serialize_bytes(b),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Self::Integer(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            Self::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Self::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(v) => Self::Integer(v),
            ValueRef::Real(v) => Self::Real(v),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Self::Blob(bytes.to_vec()),
        })
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
