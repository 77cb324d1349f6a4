//! Delimited-text source backed by the `csv` crate.

use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LoaderResult;
use crate::types::{Field, Row, Value};

use super::{DEFAULT_TABLE_NAME, FieldList, Pass, RecordSource};

/// Options for [`DelimitedSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedOptions {
    /// Table the rows are loaded into.
    pub table_name: String,
    /// If `true`, the first record is the header row.
    pub has_headers: bool,
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            has_headers: true,
            delimiter: b',',
        }
    }
}

#[derive(Debug, Clone)]
enum Input {
    Path(PathBuf),
    Text(Arc<str>),
}

impl Input {
    fn open(&self, delimiter: u8) -> LoaderResult<csv::Reader<Box<dyn Read>>> {
        let inner: Box<dyn Read> = match self {
            Self::Path(path) => Box::new(File::open(path)?),
            Self::Text(text) => Box::new(Cursor::new(SharedText(Arc::clone(text)))),
        };
        Ok(csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(inner))
    }
}

/// In-memory input shared between passes.
struct SharedText(Arc<str>);

impl AsRef<[u8]> for SharedText {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Rows decoded from delimiter-separated text.
///
/// Records may have differing lengths; the field list grows like
/// [`super::CollectionSource`]'s. [`RecordSource::line_number`] counts records, so a quoted
/// value spanning several physical lines still counts once.
///
/// Path-backed sources re-open the file on [`RecordSource::rewind`]; the file handle only lives
/// for the duration of a pass.
pub struct DelimitedSource {
    input: Input,
    options: DelimitedOptions,
    pass: Pass<csv::Reader<Box<dyn Read>>>,
    record: csv::StringRecord,
    position: u64,
    fields: FieldList,
}

impl DelimitedSource {
    /// Read delimited text from a file.
    pub fn from_path(path: impl AsRef<Path>, options: DelimitedOptions) -> LoaderResult<Self> {
        Self::with_input(Input::Path(path.as_ref().to_path_buf()), options)
    }

    /// Read delimited text held in memory.
    pub fn from_text(text: impl Into<Arc<str>>, options: DelimitedOptions) -> LoaderResult<Self> {
        Self::with_input(Input::Text(text.into()), options)
    }

    fn with_input(input: Input, options: DelimitedOptions) -> LoaderResult<Self> {
        let mut record = csv::StringRecord::new();
        let has_first = input.open(options.delimiter)?.read_record(&mut record)?;
        let fields = if !has_first {
            FieldList::default()
        } else if options.has_headers {
            FieldList::from_header(record.iter().map(Value::from))
        } else {
            let mut fields = FieldList::default();
            fields.ensure_width(record.len());
            fields
        };
        Ok(Self {
            input,
            options,
            pass: Pass::Pending,
            record,
            position: 0,
            fields,
        })
    }

    fn read_next(&mut self) -> LoaderResult<Option<Row>> {
        if let Pass::Pending = self.pass {
            self.position = 0;
            self.pass = Pass::Open(self.input.open(self.options.delimiter)?);
        }
        let Pass::Open(reader) = &mut self.pass else {
            return Ok(None);
        };
        loop {
            if !reader.read_record(&mut self.record)? {
                // Dropping the reader closes the file.
                self.pass = Pass::Done;
                return Ok(None);
            }
            self.position += 1;
            if self.options.has_headers && self.position == 1 {
                continue;
            }
            let row: Row = self
                .record
                .iter()
                .map(|cell| Value::from(cell).normalized())
                .collect();
            self.fields.ensure_width(row.len());
            return Ok(Some(row));
        }
    }
}

impl RecordSource for DelimitedSource {
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
        match self.read_next() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => {
                self.pass = Pass::Done;
                Some(Err(e))
            }
        }
    }

    fn rewind(&mut self) -> LoaderResult<()> {
        self.pass = Pass::Pending;
        self.position = 0;
        Ok(())
    }
}

impl fmt::Debug for DelimitedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelimitedSource")
            .field("input", &self.input)
            .field("options", &self.options)
            .field("position", &self.position)
            .field("fields", &self.fields.as_slice().len())
            .finish()
    }
}
