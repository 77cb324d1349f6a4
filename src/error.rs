use thiserror::Error;

use crate::store::Statement;

/// Convenience result type for loading and store operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Error type returned by sources, the store and the loader.
///
/// This is a single error enum shared across every component of the crate.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A field name needed coercion while strict naming was requested, or coerced to nothing.
    #[error("invalid field name: '{name}'")]
    InvalidFieldName { name: String },

    /// Fixed-width layout has no widths or a zero width.
    #[error("invalid fixed-width layout: {message}")]
    InvalidWidths { message: String },

    /// Fixed-width layout names more fields than it has widths.
    #[error("too many field names ({names}) for the number of widths specified ({widths})")]
    TooManyNames { names: usize, widths: usize },

    /// A statement failed against the store.
    #[error("query failed: {source}\n{statement}")]
    Query {
        statement: Statement,
        #[source]
        source: rusqlite::Error,
    },

    /// Store-level SQLite failure outside of a statement (e.g. opening or closing a database).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The operation is not supported by this record source.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    /// A table or column identifier cannot be used in generated SQL.
    #[error("invalid identifier: '{name}'")]
    InvalidIdentifier { name: String },

    /// A source produced a row with more values than it reports fields for.
    #[error("row {line} of table '{table}' has {width} values but {fields} fields")]
    RowTooWide {
        table: String,
        line: u64,
        width: usize,
        fields: usize,
    },

    /// Loader options are inconsistent.
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },

    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoaderError {
    pub(crate) fn query(statement: Statement, source: rusqlite::Error) -> Self {
        Self::Query { statement, source }
    }
}
