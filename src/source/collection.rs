//! In-memory collection source.

use std::fmt;

use crate::error::LoaderResult;
use crate::types::{Field, Row, Value};

use super::{DEFAULT_TABLE_NAME, FieldList, Pass, RecordSource};

/// Options for [`CollectionSource`] (and the header policy of [`super::DelimitedSource`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOptions {
    /// Table the rows are loaded into.
    pub table_name: String,
    /// If `true`, the first element is the header row.
    pub has_headers: bool,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            has_headers: true,
        }
    }
}

/// Rows produced by a "get data" callback.
///
/// The callback is invoked once when the source is built (to read the header, or the width of
/// the first row) and once at the start of every pass. The source can be rewound as long as the
/// callback returns the same data each time.
///
/// Without headers, fields are named `unnamed_field001`, `unnamed_field002`, ... and the list
/// grows to the widest row seen so far. Empty strings and `NULL`s become [`Value::Null`].
pub struct CollectionSource<F, I>
where
    I: IntoIterator,
{
    get_data: F,
    pass: Pass<I::IntoIter>,
    options: CollectionOptions,
    position: u64,
    fields: FieldList,
}

impl<F, I, R, V> CollectionSource<F, I>
where
    F: FnMut() -> I,
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = V>,
    V: Into<Value>,
{
    pub fn new(mut get_data: F, options: CollectionOptions) -> Self {
        let first: Option<Row> = get_data().into_iter().next().map(to_row);
        let fields = match (first, options.has_headers) {
            (Some(header), true) => FieldList::from_header(header),
            (Some(row), false) => {
                let mut fields = FieldList::default();
                fields.ensure_width(row.len());
                fields
            }
            (None, _) => FieldList::default(),
        };
        Self {
            get_data,
            pass: Pass::Pending,
            options,
            position: 0,
            fields,
        }
    }
}

fn to_row<R, V>(raw: R) -> Row
where
    R: IntoIterator<Item = V>,
    V: Into<Value>,
{
    raw.into_iter().map(|v| v.into().normalized()).collect()
}

impl<F, I, R, V> RecordSource for CollectionSource<F, I>
where
    F: FnMut() -> I,
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = V>,
    V: Into<Value>,
{
    fn table_name(&self) -> &str {
        &self.options.table_name
    }

    fn line_number(&self) -> u64 {
        if self.options.has_headers {
            self.position.saturating_sub(1)
        } else {
            self.position
        }
    }

    fn fields(&self) -> &[Field] {
        self.fields.as_slice()
    }

    fn next_row(&mut self) -> Option<LoaderResult<Row>> {
        if let Pass::Pending = self.pass {
            self.position = 0;
            self.pass = Pass::Open((self.get_data)().into_iter());
        }
        let Pass::Open(iter) = &mut self.pass else {
            return None;
        };
        loop {
            let Some(raw) = iter.next() else {
                self.pass = Pass::Done;
                return None;
            };
            self.position += 1;
            if self.options.has_headers && self.position == 1 {
                continue;
            }
            let row = to_row(raw);
            self.fields.ensure_width(row.len());
            return Some(Ok(row));
        }
    }

    fn rewind(&mut self) -> LoaderResult<()> {
        self.pass = Pass::Pending;
        self.position = 0;
        Ok(())
    }
}

impl<F, I> fmt::Debug for CollectionSource<F, I>
where
    I: IntoIterator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionSource")
            .field("options", &self.options)
            .field("position", &self.position)
            .field("fields", &self.fields.as_slice().len())
            .finish()
    }
}
