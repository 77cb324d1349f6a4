//! Incremental loader: drives a [`RecordSource`] into a [`DataStore`].
//!
//! The destination table is created when its first row arrives, using the source's field list
//! at that moment. When later rows come with more fields (ragged data) the table is widened by
//! appending columns; existing rows read back `NULL` for them. Columns are never removed,
//! renamed or reordered.
//!
//! Inserts run inside batch transactions: a transaction is opened before the first insert of a
//! batch and committed after every [`LoadOptions::batch_size`] inserted rows. One final commit
//! always follows the last row. If anything fails, the open transaction is rolled back (rows
//! since the last commit are lost) and the error is returned.
//!
//! ## Example
//!
//! ```rust
//! use rust_table_loader::loader::{LoadOptions, Loader};
//! use rust_table_loader::source::{CollectionOptions, CollectionSource};
//! use rust_table_loader::types::Value;
//!
//! # fn main() -> Result<(), rust_table_loader::LoaderError> {
//! let data = vec![vec!["Cliff", "M"], vec!["Clair", "F"]];
//! let mut source = CollectionSource::new(
//!     move || data.clone(),
//!     CollectionOptions { has_headers: false, ..Default::default() },
//! );
//!
//! let store = Loader::new(LoadOptions::default())?.load(&mut source)?;
//! assert_eq!(store.scalar("select count(*) from tbl", ())?, Some(Value::Integer(2)));
//!
//! let columns: Vec<String> = store
//!     .column_schema("tbl")?
//!     .into_iter()
//!     .map(|c| c.column_name)
//!     .collect();
//! assert_eq!(columns, ["row_id", "line_num", "unnamed_field001", "unnamed_field002"]);
//! # Ok(())
//! # }
//! ```

mod observer;

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{LoaderError, LoaderResult};
use crate::source::RecordSource;
use crate::store::{DataStore, quote_identifier};
use crate::types::{Field, Value};

pub use observer::{CompositeObserver, LoadEvent, LoadObserver};

/// Default number of inserted rows per committed batch.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Options controlling a load.
///
/// Use [`Default`] for common cases. Also deserializable (missing keys take their defaults),
/// e.g. through [`LoadOptions::from_json_str`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Integer primary key column filled by SQLite, or `None` for no row id column.
    pub auto_number_field: Option<String>,
    /// Integer column receiving the source's record number, or `None` to skip it.
    pub record_number_field: Option<String>,
    /// Inserted rows per committed transaction.
    pub batch_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            auto_number_field: Some("row_id".to_string()),
            record_number_field: Some("line_num".to_string()),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl LoadOptions {
    /// Parse options from JSON, e.g. `{"auto_number_field": null, "batch_size": 500}`.
    pub fn from_json_str(json: &str) -> LoaderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn validate(&self) -> LoaderResult<()> {
        if self.batch_size == 0 {
            return Err(LoaderError::InvalidOptions {
                message: "batch_size must be > 0".to_string(),
            });
        }
        for name in [&self.auto_number_field, &self.record_number_field]
            .into_iter()
            .flatten()
        {
            Field::text(name.as_str())?;
        }
        if let (Some(a), Some(b)) = (&self.auto_number_field, &self.record_number_field) {
            if a.eq_ignore_ascii_case(b) {
                return Err(LoaderError::InvalidOptions {
                    message: format!("auto_number_field and record_number_field are both '{a}'"),
                });
            }
        }
        Ok(())
    }
}

/// Load `source` into a new in-memory store using [`LoadOptions::default`].
pub fn load<S>(source: &mut S) -> LoaderResult<DataStore>
where
    S: RecordSource + ?Sized,
{
    Loader::default().load(source)
}

/// Summary of a completed load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Rows inserted.
    pub rows: u64,
    /// Transactions committed.
    pub commits: u64,
    /// Destination tables, in order of first appearance.
    pub tables: Vec<String>,
}

/// Per-table bookkeeping for one load.
struct TableState {
    quoted: String,
    /// Lower-cased names of every column present in the table.
    columns: HashSet<String>,
    /// Number of source fields the table has been sized for.
    field_count: usize,
    /// Insert statements keyed by the number of values in a row.
    inserts: HashMap<usize, String>,
}

/// Loads record sources into a [`DataStore`].
pub struct Loader {
    options: LoadOptions,
    observer: Option<Arc<dyn LoadObserver>>,
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("options", &self.options)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            options: LoadOptions::default(),
            observer: None,
        }
    }
}

impl Loader {
    /// Create a loader, validating `options`.
    pub fn new(options: LoadOptions) -> LoaderResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            observer: None,
        })
    }

    /// Attach an observer for load events.
    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load `source` into a new in-memory store and hand the store to the caller.
    pub fn load<S>(&self, source: &mut S) -> LoaderResult<DataStore>
    where
        S: RecordSource + ?Sized,
    {
        let store = DataStore::open_in_memory()?;
        self.load_into(source, &store)?;
        Ok(store)
    }

    /// Load `source` into a caller-owned store.
    ///
    /// Any transaction already pending on `store` is committed together with the first batch.
    pub fn load_into<S>(&self, source: &mut S, store: &DataStore) -> LoaderResult<LoadStats>
    where
        S: RecordSource + ?Sized,
    {
        let start = Instant::now();
        self.emit(LoadEvent::LoadStarted);

        match self.run(source, store) {
            Ok(stats) => {
                let elapsed = start.elapsed();
                info!(
                    rows = stats.rows,
                    commits = stats.commits,
                    tables = stats.tables.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "load finished"
                );
                self.emit(LoadEvent::LoadFinished {
                    elapsed,
                    stats: stats.clone(),
                });
                Ok(stats)
            }
            Err(e) => {
                if let Err(rollback_err) = store.rollback() {
                    warn!(error = %rollback_err, "rollback after failed load did not complete");
                }
                self.emit(LoadEvent::LoadFailed {
                    elapsed: start.elapsed(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn run<S>(&self, source: &mut S, store: &DataStore) -> LoaderResult<LoadStats>
    where
        S: RecordSource + ?Sized,
    {
        let mut tables: HashMap<String, TableState> = HashMap::new();
        let mut stats = LoadStats::default();
        let mut pending = 0usize;

        while let Some(row) = source.next_row() {
            let row = row?;
            let table = source.table_name();
            let fields = source.fields();
            if row.len() > fields.len() {
                return Err(LoaderError::RowTooWide {
                    table: table.to_owned(),
                    line: source.line_number(),
                    width: row.len(),
                    fields: fields.len(),
                });
            }

            store.begin()?;

            if !tables.contains_key(table) {
                let state = self.create_table(store, table, fields)?;
                stats.tables.push(table.to_owned());
                tables.insert(table.to_owned(), state);
            }
            let Some(state) = tables.get_mut(table) else {
                continue;
            };
            if fields.len() > state.field_count {
                self.widen_table(store, table, state, fields)?;
            }

            let width = row.len();
            let sql = match state.inserts.entry(width) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => e.insert(self.insert_sql(&state.quoted, &fields[..width])?),
            };

            let mut params: Vec<Value> = Vec::with_capacity(width + 1);
            if self.options.record_number_field.is_some() {
                let line = i64::try_from(source.line_number()).unwrap_or(i64::MAX);
                params.push(Value::Integer(line));
            }
            params.extend(row);
            let expected = width + usize::from(self.options.record_number_field.is_some());
            params.resize(expected, Value::Null);

            store.execute(sql, params)?;
            stats.rows += 1;
            pending += 1;

            if pending == self.options.batch_size {
                store.commit()?;
                stats.commits += 1;
                pending = 0;
                debug!(rows = stats.rows, "batch committed");
                self.emit(LoadEvent::BatchCommitted { rows: stats.rows });
            }
        }

        store.commit()?;
        if pending > 0 {
            stats.commits += 1;
            self.emit(LoadEvent::BatchCommitted { rows: stats.rows });
        }
        Ok(stats)
    }

    fn create_table(
        &self,
        store: &DataStore,
        table: &str,
        fields: &[Field],
    ) -> LoaderResult<TableState> {
        let quoted = quote_identifier(table)?;
        let mut columns = Vec::with_capacity(fields.len() + 2);
        if let Some(name) = &self.options.auto_number_field {
            columns.push(format!("{} integer primary key", quote_identifier(name)?));
        }
        if let Some(name) = &self.options.record_number_field {
            columns.push(format!("{} integer", quote_identifier(name)?));
        }
        for field in fields {
            columns.push(format!("{} {}", quote_identifier(field.name())?, field.declared_type()));
        }
        let sql = format!("create table if not exists {quoted} ({})", columns.join(", "));
        store.execute(&sql, ())?;

        let existing: HashSet<String> = store
            .column_schema(table)?
            .into_iter()
            .map(|c| c.column_name.to_ascii_lowercase())
            .collect();
        let mut state = TableState {
            quoted,
            columns: existing,
            field_count: 0,
            inserts: HashMap::new(),
        };
        debug!(table, columns = fields.len(), "table created");
        self.emit(LoadEvent::TableCreated {
            table: table.to_owned(),
            columns: fields.iter().map(|f| f.name().to_owned()).collect(),
        });

        // A table that already existed may lack some of the source's fields.
        self.add_missing_columns(store, &mut state, fields)?;
        state.field_count = fields.len();
        Ok(state)
    }

    fn widen_table(
        &self,
        store: &DataStore,
        table: &str,
        state: &mut TableState,
        fields: &[Field],
    ) -> LoaderResult<()> {
        let added = self.add_missing_columns(store, state, &fields[state.field_count..])?;
        state.field_count = fields.len();
        if !added.is_empty() {
            debug!(table, added = added.len(), "table widened");
            self.emit(LoadEvent::TableWidened {
                table: table.to_owned(),
                added,
            });
        }
        Ok(())
    }

    fn add_missing_columns(
        &self,
        store: &DataStore,
        state: &mut TableState,
        fields: &[Field],
    ) -> LoaderResult<Vec<String>> {
        let mut added = Vec::new();
        for field in fields {
            if !state.columns.insert(field.name().to_ascii_lowercase()) {
                continue;
            }
            let sql = format!(
                "alter table {} add column {} {}",
                state.quoted,
                quote_identifier(field.name())?,
                field.declared_type()
            );
            store.execute(&sql, ())?;
            added.push(field.name().to_owned());
        }
        Ok(added)
    }

    fn insert_sql(&self, quoted_table: &str, fields: &[Field]) -> LoaderResult<String> {
        let mut columns: Vec<String> = Vec::with_capacity(fields.len() + 1);
        if let Some(name) = &self.options.record_number_field {
            columns.push(quote_identifier(name)?);
        }
        for field in fields {
            columns.push(quote_identifier(field.name())?);
        }
        if columns.is_empty() {
            return Ok(format!("insert into {quoted_table} default values"));
        }
        let placeholders = vec!["?"; columns.len()].join(", ");
        Ok(format!(
            "insert into {quoted_table} ({}) values ({placeholders})",
            columns.join(", ")
        ))
    }

    fn emit(&self, event: LoadEvent) {
        if let Some(o) = self.observer.as_ref() {
            o.on_event(&event);
        }
    }
}
