//! `rust-table-loader` loads tabular data into an embedded SQLite store.
//!
//! Data comes from a [`source::RecordSource`]: an in-memory collection, delimited text, or
//! fixed-width records, optionally wrapped in [`source::Limit`] or [`source::PassThrough`].
//! The [`loader::Loader`] creates the destination table from the first row's fields, widens it
//! when ragged rows bring more fields, and commits inserts in batches.
//!
//! The resulting [`store::DataStore`] can then be queried ([`store::DataStore::fetch_all`],
//! [`store::DataStore::scalar`], ...), introspected ([`store::DataStore::table_schema`],
//! [`store::DataStore::column_schema`]) or dumped as SQL text ([`store::DataStore::dump`]).
//!
//! ## Quick example: load delimited text
//!
//! ```rust
//! use rust_table_loader::source::{DelimitedOptions, DelimitedSource};
//! use rust_table_loader::types::Value;
//!
//! # fn main() -> Result<(), rust_table_loader::LoaderError> {
//! let text = "person_num,name,gender\n1,Cliff Huxtable,M\n2,Clair Huxtable,F\n";
//! let mut source = DelimitedSource::from_text(text, DelimitedOptions::default())?;
//! let store = rust_table_loader::load(&mut source)?;
//!
//! let row = store
//!     .fetch_one("select * from tbl where gender = ?", "F")?
//!     .expect("one row");
//! assert_eq!(row["name"], Value::from("Clair Huxtable"));
//! assert_eq!(row["line_num"], Value::Integer(2));
//! # Ok(())
//! # }
//! ```
//!
//! ## Ragged rows
//!
//! Rows may carry more values than the header names. Extra positions get placeholder names
//! (`unnamed_field004`, ...) and the table gains matching columns; earlier rows read back
//! `NULL` for them.
//!
//! ```rust
//! use rust_table_loader::source::{CollectionOptions, CollectionSource};
//!
//! # fn main() -> Result<(), rust_table_loader::LoaderError> {
//! let data = vec![vec!["a", "b"], vec!["1", "2"], vec!["3", "4", "5"]];
//! let mut source = CollectionSource::new(move || data.clone(), CollectionOptions::default());
//! let store = rust_table_loader::load(&mut source)?;
//!
//! let names: Vec<String> = store
//!     .column_schema("tbl")?
//!     .into_iter()
//!     .map(|c| c.column_name)
//!     .collect();
//! assert_eq!(names, ["row_id", "line_num", "a", "b", "unnamed_field003"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`source`]: record sources and decorators
//! - [`loader`]: the incremental loader, its options and observer hook
//! - [`store`]: the SQLite-backed data store, statements and schema introspection
//! - [`row`]: the ordered field-to-value container returned by queries
//! - [`types`]: values, fields and column types
//! - [`render`]: HTML rendering of query results
//! - [`error`]: the error type used across the crate

pub mod error;
pub mod loader;
pub mod render;
pub mod row;
pub mod source;
pub mod store;
pub mod types;

pub use error::{LoaderError, LoaderResult};
pub use loader::{load, LoadOptions, LoadStats, Loader};
pub use row::DataRow;
pub use store::{DataStore, Statement};
