//! Fixed-width record source.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{LoaderError, LoaderResult};
use crate::types::{ColumnType, Field, Row, Value};

use super::{DEFAULT_TABLE_NAME, Pass, RecordSource};

/// Default name of the trailing field that captures characters beyond the declared widths.
pub const DEFAULT_REMAINDER_FIELD: &str = "remainder";

/// Options for [`FixedWidthSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWidthOptions {
    /// Names aligned with the widths. May be shorter than the widths; never longer.
    pub names: Vec<String>,
    /// Table the rows are loaded into.
    pub table_name: String,
    /// Name of the trailing catch-all field, or `None` to drop trailing characters.
    pub remainder_field: Option<String>,
    /// Trim surrounding whitespace from every value.
    pub trim: bool,
}

impl Default for FixedWidthOptions {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            remainder_field: Some(DEFAULT_REMAINDER_FIELD.to_string()),
            trim: true,
        }
    }
}

type LineIter = Box<dyn Iterator<Item = LoaderResult<String>>>;

enum Lines {
    Callback(Box<dyn FnMut() -> LineIter>),
    Path(PathBuf),
}

impl Lines {
    fn open(&mut self) -> LoaderResult<LineIter> {
        match self {
            Self::Callback(get_lines) => Ok(get_lines()),
            Self::Path(path) => {
                let reader = BufReader::new(File::open(&*path)?);
                Ok(Box::new(reader.lines().map(|line| line.map_err(LoaderError::from))))
            }
        }
    }
}

/// Rows sliced out of fixed-width lines.
///
/// Each line is cut into consecutive character ranges, one per width. Values are optionally
/// trimmed, and empty values become [`Value::Null`]. When a remainder field is configured it
/// receives everything after the last declared width. Short lines simply produce `NULL`s for
/// the missing ranges.
///
/// Callback-backed sources call the callback once per pass; path-backed sources re-open the
/// file. Both support [`RecordSource::rewind`].
pub struct FixedWidthSource {
    lines: Lines,
    widths: Vec<usize>,
    options: FixedWidthOptions,
    fields: Vec<Field>,
    pass: Pass<LineIter>,
    line_number: u64,
}

impl FixedWidthSource {
    /// Build from a callback returning the lines of one pass.
    pub fn new<F, I>(
        mut get_lines: F,
        widths: &[usize],
        options: FixedWidthOptions,
    ) -> LoaderResult<Self>
    where
        F: FnMut() -> I + 'static,
        I: IntoIterator + 'static,
        I::Item: Into<String>,
        I::IntoIter: 'static,
    {
        let callback: Box<dyn FnMut() -> LineIter> = Box::new(move || -> LineIter {
            Box::new(
                get_lines()
                    .into_iter()
                    .map(|line| Ok::<String, LoaderError>(line.into())),
            )
        });
        Self::with_lines(Lines::Callback(callback), widths, options)
    }

    /// Read fixed-width lines from a file.
    pub fn from_path(
        path: impl AsRef<Path>,
        widths: &[usize],
        options: FixedWidthOptions,
    ) -> LoaderResult<Self> {
        Self::with_lines(Lines::Path(path.as_ref().to_path_buf()), widths, options)
    }

    fn with_lines(
        lines: Lines,
        widths: &[usize],
        options: FixedWidthOptions,
    ) -> LoaderResult<Self> {
        if widths.is_empty() {
            return Err(LoaderError::InvalidWidths {
                message: "no field widths provided".to_string(),
            });
        }
        if let Some(pos) = widths.iter().position(|&w| w == 0) {
            return Err(LoaderError::InvalidWidths {
                message: format!("width at position {} must be positive", pos + 1),
            });
        }
        if options.names.len() > widths.len() {
            return Err(LoaderError::TooManyNames {
                names: options.names.len(),
                widths: widths.len(),
            });
        }

        let mut fields = Vec::with_capacity(widths.len() + 1);
        for (idx, &width) in widths.iter().enumerate() {
            let declared = ColumnType::Varchar(width);
            let field = match options.names.get(idx) {
                Some(name) => Field::coerced(name.as_str(), declared)
                    .unwrap_or_else(|_| Field::unnamed(idx + 1, declared)),
                None => Field::unnamed(idx + 1, declared),
            };
            fields.push(field);
        }
        if let Some(remainder) = &options.remainder_field {
            fields.push(Field::coerced(remainder.as_str(), ColumnType::Text)?);
        }

        Ok(Self {
            lines,
            widths: widths.to_vec(),
            options,
            fields,
            pass: Pass::Pending,
            line_number: 0,
        })
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    fn slice(&self, line: &str) -> Row {
        let mut chars = line.chars();
        let mut row = Vec::with_capacity(self.fields.len());
        for &width in &self.widths {
            let cell: String = chars.by_ref().take(width).collect();
            row.push(self.format_value(cell));
        }
        if self.options.remainder_field.is_some() {
            row.push(self.format_value(chars.collect()));
        }
        row
    }

    fn format_value(&self, cell: String) -> Value {
        let cell = if self.options.trim {
            cell.trim().to_string()
        } else {
            cell
        };
        Value::Text(cell).normalized()
    }
}

impl RecordSource for FixedWidthSource {
    fn table_name(&self) -> &str {
        &self.options.table_name
    }

    fn line_number(&self) -> u64 {
        self.line_number
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn next_row(&mut self) -> Option<LoaderResult<Row>> {
        if let Pass::Pending = self.pass {
            self.line_number = 0;
            match self.lines.open() {
                Ok(iter) => self.pass = Pass::Open(iter),
                Err(e) => {
                    self.pass = Pass::Done;
                    return Some(Err(e));
                }
            }
        }
        let Pass::Open(iter) = &mut self.pass else {
            return None;
        };
        match iter.next() {
            Some(Ok(line)) => {
                self.line_number += 1;
                Some(Ok(self.slice(&line)))
            }
            Some(Err(e)) => {
                self.pass = Pass::Done;
                Some(Err(e))
            }
            None => {
                self.pass = Pass::Done;
                None
            }
        }
    }

    fn rewind(&mut self) -> LoaderResult<()> {
        self.pass = Pass::Pending;
        self.line_number = 0;
        Ok(())
    }
}

impl fmt::Debug for FixedWidthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedWidthSource")
            .field("widths", &self.widths)
            .field("options", &self.options)
            .field("line_number", &self.line_number)
            .finish()
    }
}
