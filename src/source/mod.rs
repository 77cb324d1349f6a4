//! Record sources: pull-based producers of raw rows plus per-read metadata.
//!
//! Every source reports, for the most recently produced row:
//!
//! - [`RecordSource::table_name`]: the table the row belongs to
//! - [`RecordSource::line_number`]: its 1-based position (header excluded)
//! - [`RecordSource::fields`]: the schema as currently known
//!
//! The field list may grow during a pass when rows are ragged, so consumers that care about
//! width must re-read [`RecordSource::fields`] after every row.
//!
//! Built-in sources:
//! - [`CollectionSource`]: rows from an in-memory callback
//! - [`DelimitedSource`]: delimiter-separated text decoded with the `csv` crate
//! - [`FixedWidthSource`]: fixed-width records sliced by character widths
//!
//! Decorators:
//! - [`Limit`]: truncate a pass to at most N rows
//! - [`PassThrough`]: forward everything unchanged, tracing each produced row
//!
//! ## Example: iterate a collection
//!
//! ```rust
//! use rust_table_loader::source::{CollectionOptions, CollectionSource, RecordSource, SourceExt};
//! use rust_table_loader::types::Value;
//!
//! let data = vec![vec!["name", "gender"], vec!["Cliff", "M"], vec!["Clair", ""]];
//! let mut source = CollectionSource::new(move || data.clone(), CollectionOptions::default());
//!
//! let mut rows = source.produce();
//! let first = rows.next().unwrap().unwrap();
//! assert_eq!(first, vec![Value::from("Cliff"), Value::from("M")]);
//! assert_eq!(rows.source().line_number(), 1);
//!
//! // Empty strings are normalized to NULL.
//! let second = rows.next().unwrap().unwrap();
//! assert_eq!(second[1], Value::Null);
//! assert!(rows.next().is_none());
//! ```

pub mod collection;
pub mod decorators;
pub mod delimited;
pub mod fixed_width;

use crate::error::{LoaderError, LoaderResult};
use crate::types::{ColumnType, Field, Row, Value};

pub use collection::{CollectionOptions, CollectionSource};
pub use decorators::{Limit, PassThrough};
pub use delimited::{DelimitedOptions, DelimitedSource};
pub use fixed_width::{FixedWidthOptions, FixedWidthSource};

/// Default table name used by the built-in sources.
pub const DEFAULT_TABLE_NAME: &str = "tbl";

/// Capability set shared by every record source.
///
/// Implement this trait to make an external source loadable by [`crate::loader::Loader`].
pub trait RecordSource {
    /// Table the most recently produced row belongs to.
    fn table_name(&self) -> &str;

    /// 1-based position of the most recently produced row; `0` before the first row.
    fn line_number(&self) -> u64;

    /// Column schema as currently known.
    fn fields(&self) -> &[Field];

    /// Produce the next row of the current pass.
    ///
    /// The first call starts a pass. Once a pass is exhausted this keeps returning `None` until
    /// [`RecordSource::rewind`] succeeds.
    fn next_row(&mut self) -> Option<LoaderResult<Row>>;

    /// Reset so the next call to [`RecordSource::next_row`] starts a fresh pass.
    ///
    /// Sources that cannot be re-read keep this default, which fails with
    /// [`LoaderError::UnsupportedOperation`].
    fn rewind(&mut self) -> LoaderResult<()> {
        Err(LoaderError::UnsupportedOperation {
            operation: format!("rewind of source for table '{}'", self.table_name()),
        })
    }
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    fn table_name(&self) -> &str {
        (**self).table_name()
    }

    fn line_number(&self) -> u64 {
        (**self).line_number()
    }

    fn fields(&self) -> &[Field] {
        (**self).fields()
    }

    fn next_row(&mut self) -> Option<LoaderResult<Row>> {
        (**self).next_row()
    }

    fn rewind(&mut self) -> LoaderResult<()> {
        (**self).rewind()
    }
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn table_name(&self) -> &str {
        (**self).table_name()
    }

    fn line_number(&self) -> u64 {
        (**self).line_number()
    }

    fn fields(&self) -> &[Field] {
        (**self).fields()
    }

    fn next_row(&mut self) -> Option<LoaderResult<Row>> {
        (**self).next_row()
    }

    fn rewind(&mut self) -> LoaderResult<()> {
        (**self).rewind()
    }
}

/// Combinators available on every [`RecordSource`].
pub trait SourceExt: RecordSource {
    /// Iterate the current pass. [`Produce::source`] gives access to the metadata between rows.
    fn produce(&mut self) -> Produce<'_, Self> {
        Produce { source: self }
    }

    /// Truncate each pass to at most `limit` rows.
    fn limit(self, limit: usize) -> Limit<Self>
    where
        Self: Sized,
    {
        Limit::new(self, limit)
    }

    /// Wrap in a [`PassThrough`] that traces each produced row under `label`.
    fn pass_through(self, label: impl Into<String>) -> PassThrough<Self>
    where
        Self: Sized,
    {
        PassThrough::new(self, label)
    }
}

impl<S: RecordSource + ?Sized> SourceExt for S {}

/// Iterator over one pass of a source; see [`SourceExt::produce`].
#[derive(Debug)]
pub struct Produce<'a, S: ?Sized> {
    source: &'a mut S,
}

impl<S: RecordSource + ?Sized> Produce<'_, S> {
    /// The underlying source, for reading metadata of the row just produced.
    pub fn source(&self) -> &S {
        self.source
    }
}

impl<S: RecordSource + ?Sized> Iterator for Produce<'_, S> {
    type Item = LoaderResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_row()
    }
}

/// Progress of a single pass over an underlying input.
#[derive(Debug)]
pub(crate) enum Pass<I> {
    Pending,
    Open(I),
    Done,
}

/// Header-or-placeholder field bookkeeping shared by the header-aware sources.
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldList {
    fields: Vec<Field>,
}

impl FieldList {
    /// Fields named after a header row. Cells that coerce to nothing get a placeholder name.
    pub(crate) fn from_header<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let fields = cells
            .into_iter()
            .enumerate()
            .map(|(idx, cell)| {
                let label = match cell {
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                Field::coerced(label, ColumnType::default())
                    .unwrap_or_else(|_| Field::unnamed(idx + 1, ColumnType::default()))
            })
            .collect();
        Self { fields }
    }

    /// Append placeholder fields until at least `width` are defined.
    pub(crate) fn ensure_width(&mut self, width: usize) {
        for idx in self.fields.len()..width {
            self.fields.push(Field::unnamed(idx + 1, ColumnType::default()));
        }
    }

    pub(crate) fn as_slice(&self) -> &[Field] {
        &self.fields
    }
}
