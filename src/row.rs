//! Ordered, name-addressable result rows.

use std::fmt;
use std::ops::Index;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{LoaderError, LoaderResult};
use crate::types::Value;

/// One result row from a [`crate::store::DataStore`] query.
///
/// Columns keep the order of the originating query's projection. Keys are case-sensitive and
/// unique; setting an existing key updates its value in place without changing the order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRow {
    fields: Vec<String>,
    values: Vec<Value>,
}

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            fields: Vec::with_capacity(n),
            values: Vec::with_capacity(n),
        }
    }

    /// Set `key` to `value`, returning the previous value if the key already existed.
    ///
    /// Fails with [`LoaderError::InvalidFieldName`] for an empty key.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> LoaderResult<Option<Value>> {
        let key = key.into();
        if key.is_empty() {
            return Err(LoaderError::InvalidFieldName { name: key });
        }
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Ok(Some(std::mem::replace(&mut self.values[idx], value))),
            None => {
                self.fields.push(key);
                self.values.push(value);
                Ok(None)
            }
        }
    }

    /// Build a row from pairs; repeated keys update in place.
    ///
    /// Fails with [`LoaderError::InvalidFieldName`] on the first empty key.
    pub fn try_from_iter<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> LoaderResult<Self>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut row = DataRow::new();
        for (k, v) in pairs {
            row.set(k, v)?;
        }
        Ok(row)
    }

    /// Remove `key`, dropping it from the iteration order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.position(key)?;
        self.fields.remove(idx);
        Some(self.values.remove(idx))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|idx| &self.values[idx])
    }

    pub fn get_index(&self, idx: usize) -> Option<(&str, &Value)> {
        Some((self.fields.get(idx)?.as_str(), self.values.get(idx)?))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Column names in order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Values aligned with [`Self::fields`].
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Serialize as a JSON object, preserving column order.
    pub fn to_json(&self) -> LoaderResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == key)
    }

    // Columns produced by SQLite may repeat a name (e.g. joins); later duplicates overwrite.
    pub(crate) fn push_column(&mut self, key: &str, value: Value) {
        match self.position(key) {
            Some(idx) => self.values[idx] = value,
            None => {
                self.fields.push(key.to_owned());
                self.values.push(value);
            }
        }
    }
}

impl Index<&str> for DataRow {
    type Output = Value;

    /// # Panics
    ///
    /// Panics if `key` is not a column of this row.
    fn index(&self, key: &str) -> &Value {
        match self.get(key) {
            Some(v) => v,
            None => panic!("no column named '{key}' in row"),
        }
    }
}

impl Index<usize> for DataRow {
    type Output = Value;

    fn index(&self, idx: usize) -> &Value {
        &self.values[idx]
    }
}

impl IntoIterator for DataRow {
    type Item = (String, Value);
    type IntoIter = std::iter::Zip<std::vec::IntoIter<String>, std::vec::IntoIter<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter().zip(self.values)
    }
}

impl fmt::Display for DataRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{k}': {}", v.to_sql_literal())?;
        }
        f.write_str("}")
    }
}

impl Serialize for DataRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
