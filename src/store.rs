//! Relational store: a thin façade over an embedded SQLite connection.
//!
//! Every statement is parameterized; values are never spliced into SQL text. Failures surface
//! as [`LoaderError::Query`], carrying the statement text and the bound parameters.
//!
//! ```rust
//! use rust_table_loader::store::DataStore;
//! use rust_table_loader::types::Value;
//!
//! # fn main() -> Result<(), rust_table_loader::LoaderError> {
//! let store = DataStore::open_in_memory()?;
//! store.execute("create table people (name text, gender text)", ())?;
//! store.execute("insert into people values (?, ?)", ["Cliff", "M"])?;
//! store.execute("insert into people values (?, ?)", ["Clair", "F"])?;
//!
//! let count = store.scalar("select count(*) from people where gender = ?", "F")?;
//! assert_eq!(count, Some(Value::Integer(1)));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use rusqlite::{Connection, params_from_iter};
use serde::Serialize;
use tracing::trace;

use crate::error::{LoaderError, LoaderResult};
use crate::row::DataRow;
use crate::types::{Value, quote_text};

/// Positional parameters bound to a statement.
///
/// Built through `From`: `()` binds nothing, a single scalar binds one value, and a sequence
/// (`Vec`, slice or array) is bound as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<Value>);

impl Params {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

macro_rules! scalar_params {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Params {
                fn from(v: $t) -> Self {
                    Self(vec![Value::from(v)])
                }
            }
        )*
    };
}

scalar_params!(Value, &str, String, i64, i32, u32, f64, bool);

impl<T: Into<Value>> From<Option<T>> for Params {
    fn from(v: Option<T>) -> Self {
        Self(vec![Value::from(v)])
    }
}

impl<T: Into<Value>> From<Vec<T>> for Params {
    fn from(v: Vec<T>) -> Self {
        Self(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Params {
    fn from(v: &[T]) -> Self {
        Self(v.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Params {
    fn from(v: [T; N]) -> Self {
        Self(v.into_iter().map(Into::into).collect())
    }
}

/// SQL text plus its bound parameters.
///
/// Displays as the SQL followed by a `-- params: (...)` comment line when parameters are bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Params,
}

impl Statement {
    pub fn new(sql: &str, params: impl Into<Params>) -> Self {
        Self {
            sql: sql.trim().to_owned(),
            params: params.into(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)?;
        if !self.params.is_empty() {
            let rendered: Vec<String> = self.params.iter().map(Value::to_sql_literal).collect();
            write!(f, "\n-- params: ({})", rendered.join(", "))?;
        }
        Ok(())
    }
}

/// Quote `name` as a SQL identifier, doubling embedded quotes.
///
/// Empty names and names containing NUL are rejected.
pub fn quote_identifier(name: &str) -> LoaderResult<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(LoaderError::InvalidIdentifier {
            name: name.to_owned(),
        });
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// One entry of [`DataStore::table_schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub table_name: String,
    pub table_type: String,
}

/// One entry of [`DataStore::column_schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub column_name: String,
    pub data_type: String,
    /// `true` unless the column was declared `NOT NULL`.
    pub is_nullable: bool,
    /// Default expression text, or an empty string when none was declared.
    pub column_default: String,
}

/// Owns one SQLite connection.
///
/// Stores are created explicitly through [`DataStore::open_in_memory`], [`DataStore::open`] or
/// [`DataStore::from_connection`]; the caller owns the store and the connection closes when it
/// is dropped (or through [`DataStore::close`] to observe close errors).
#[derive(Debug)]
pub struct DataStore {
    conn: Connection,
}

impl DataStore {
    /// Create an empty in-memory store.
    pub fn open_in_memory() -> LoaderResult<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> LoaderResult<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Close the connection, rolling back any pending transaction.
    pub fn close(self) -> LoaderResult<()> {
        self.conn.close().map_err(|(_, e)| LoaderError::Sqlite(e))
    }

    /// Prepare a query for lazy row-by-row iteration.
    ///
    /// ```rust
    /// # use rust_table_loader::store::DataStore;
    /// # fn main() -> Result<(), rust_table_loader::LoaderError> {
    /// let store = DataStore::open_in_memory()?;
    /// let mut stmt = store.prepare("select 1 as a, 'x' as b")?;
    /// for row in stmt.query(())? {
    ///     let row = row?;
    ///     assert_eq!(row.fields(), ["a", "b"]);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn prepare(&self, sql: &str) -> LoaderResult<PreparedQuery<'_>> {
        let sql = sql.trim();
        let stmt = match self.conn.prepare(sql) {
            Ok(stmt) => stmt,
            Err(e) => return Err(LoaderError::query(Statement::new(sql, ()), e)),
        };
        let columns = stmt.column_names().into_iter().map(String::from).collect();
        Ok(PreparedQuery {
            stmt,
            sql: sql.to_owned(),
            columns,
        })
    }

    /// Run `sql` and hand each row to `f` as it is read.
    pub fn for_each_row<F>(
        &self,
        sql: &str,
        params: impl Into<Params>,
        mut f: F,
    ) -> LoaderResult<()>
    where
        F: FnMut(DataRow) -> LoaderResult<()>,
    {
        let mut stmt = self.prepare(sql)?;
        for row in stmt.query(params)? {
            f(row?)?;
        }
        Ok(())
    }

    /// Execute a statement without a result set, returning the number of affected rows.
    pub fn execute(&self, sql: &str, params: impl Into<Params>) -> LoaderResult<usize> {
        let statement = Statement::new(sql, params);
        trace!(sql = %statement.sql, params = statement.params.len(), "execute");
        let result = self
            .conn
            .prepare_cached(&statement.sql)
            .and_then(|mut stmt| stmt.execute(params_from_iter(statement.params.iter())));
        result.map_err(|e| LoaderError::query(statement, e))
    }

    /// Execute a script of `;`-separated statements without parameters (e.g. a dump).
    pub fn execute_batch(&self, sql: &str) -> LoaderResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| LoaderError::query(Statement::new(sql, ()), e))
    }

    /// Eagerly collect every row.
    pub fn fetch_all(&self, sql: &str, params: impl Into<Params>) -> LoaderResult<Vec<DataRow>> {
        let mut stmt = self.prepare(sql)?;
        stmt.query(params)?.collect()
    }

    /// First row, if any.
    pub fn fetch_one(&self, sql: &str, params: impl Into<Params>) -> LoaderResult<Option<DataRow>> {
        let mut stmt = self.prepare(sql)?;
        stmt.query(params)?.next().transpose()
    }

    /// First column of the first row. `None` when there is no row or the value is `NULL`.
    pub fn scalar(&self, sql: &str, params: impl Into<Params>) -> LoaderResult<Option<Value>> {
        Ok(self
            .fetch_one(sql, params)?
            .and_then(|row| row.values().first().cloned())
            .filter(|v| !v.is_null()))
    }

    /// Open a transaction unless one is already pending.
    pub fn begin(&self) -> LoaderResult<()> {
        if self.conn.is_autocommit() {
            self.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    /// Commit the pending transaction. No-op when nothing is pending.
    pub fn commit(&self) -> LoaderResult<()> {
        if !self.conn.is_autocommit() {
            self.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    /// Roll back the pending transaction. No-op when nothing is pending.
    pub fn rollback(&self) -> LoaderResult<()> {
        if !self.conn.is_autocommit() {
            self.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Every user table, in creation order.
    pub fn table_schema(&self) -> LoaderResult<Vec<TableSchema>> {
        let sql = "select name as TABLE_NAME, 'BASE TABLE' as TABLE_TYPE from sqlite_master \
                   where type = 'table' and name not like 'sqlite\\_%' escape '\\' order by rowid";
        let mut out = Vec::new();
        self.for_each_row(sql, (), |row| {
            out.push(TableSchema {
                table_name: text_of(&row[0]),
                table_type: text_of(&row[1]),
            });
            Ok(())
        })?;
        Ok(out)
    }

    /// Columns of `table_name` in definition order. Unknown tables yield an empty list.
    pub fn column_schema(&self, table_name: &str) -> LoaderResult<Vec<ColumnSchema>> {
        let sql = "select name, type, \"notnull\", dflt_value \
                   from pragma_table_info(?) order by cid";
        let mut out = Vec::new();
        self.for_each_row(sql, table_name, |row| {
            out.push(ColumnSchema {
                column_name: text_of(&row[0]),
                data_type: text_of(&row[1]),
                is_nullable: row[2].as_i64().unwrap_or(0) == 0,
                column_default: text_of(&row[3]),
            });
            Ok(())
        })?;
        Ok(out)
    }

    /// Stream the statements that recreate the whole store, one line each.
    pub fn dump_lines<F>(&self, mut sink: F) -> LoaderResult<()>
    where
        F: FnMut(&str) -> LoaderResult<()>,
    {
        sink("BEGIN TRANSACTION;")?;

        let tables = self.fetch_all(
            "select name, sql from sqlite_master \
             where sql is not null and type = 'table' order by rowid",
            (),
        )?;
        for table in &tables {
            let name = text_of(&table[0]);
            if name == "sqlite_sequence" {
                sink("DELETE FROM \"sqlite_sequence\";")?;
            } else if name.starts_with("sqlite_") {
                continue;
            } else {
                sink(&format!("{};", one_line(&text_of(&table[1]))?))?;
            }

            let quoted = quote_identifier(&name)?;
            self.for_each_row(&format!("select * from {quoted}"), (), |row| {
                let values: Vec<String> = row.values().iter().map(Value::to_sql_literal).collect();
                sink(&format!("INSERT INTO {quoted} VALUES({});", values.join(",")))
            })?;
        }

        self.for_each_row(
            "select sql from sqlite_master where sql is not null \
             and type in ('index', 'trigger', 'view') order by rowid",
            (),
            |row| sink(&format!("{};", one_line(&text_of(&row[0]))?)),
        )?;

        sink("COMMIT;")
    }

    /// Collect [`Self::dump_lines`] into memory.
    pub fn dump(&self) -> LoaderResult<Vec<String>> {
        let mut lines = Vec::new();
        self.dump_lines(|line| {
            lines.push(line.to_owned());
            Ok(())
        })?;
        Ok(lines)
    }

    /// Write the dump to `path`, one statement per line, overwriting the file.
    pub fn dump_to(&self, path: impl AsRef<Path>) -> LoaderResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.dump_lines(|line| {
            writeln!(out, "{line}")?;
            Ok(())
        })?;
        out.flush()?;
        Ok(())
    }
}

/// A prepared query; see [`DataStore::prepare`].
pub struct PreparedQuery<'conn> {
    stmt: rusqlite::Statement<'conn>,
    sql: String,
    columns: Vec<String>,
}

impl fmt::Debug for PreparedQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedQuery")
            .field("sql", &self.sql)
            .field("columns", &self.columns)
            .finish()
    }
}

impl PreparedQuery<'_> {
    /// Result column names in projection order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Bind `params` and start reading rows.
    pub fn query(&mut self, params: impl Into<Params>) -> LoaderResult<QueryRows<'_>> {
        let statement = Statement {
            sql: self.sql.clone(),
            params: params.into(),
        };
        let Self { stmt, columns, .. } = self;
        let result = stmt.query(params_from_iter(statement.params.iter()));
        match result {
            Ok(rows) => Ok(QueryRows {
                rows,
                columns,
                statement,
                done: false,
            }),
            Err(e) => Err(LoaderError::query(statement, e)),
        }
    }
}

/// Lazy iterator over the rows of a [`PreparedQuery`].
pub struct QueryRows<'stmt> {
    rows: rusqlite::Rows<'stmt>,
    columns: &'stmt [String],
    statement: Statement,
    done: bool,
}

impl Iterator for QueryRows<'_> {
    type Item = LoaderResult<DataRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = match self.rows.next() {
            Ok(Some(row)) => read_row(row, self.columns),
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(e),
        };
        if item.is_err() {
            self.done = true;
        }
        Some(item.map_err(|e| LoaderError::query(self.statement.clone(), e)))
    }
}

fn read_row(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<DataRow> {
    let mut out = DataRow::with_capacity(columns.len());
    for (idx, name) in columns.iter().enumerate() {
        out.push_column(name, row.get::<_, Value>(idx)?);
    }
    Ok(out)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Fold a schema statement onto one line without changing its meaning.
///
/// Outside quotes, whitespace runs become one space and comments become `/* */` blocks. String
/// literals spanning lines are rebuilt with `char()` splices inside parentheses. Quoted
/// identifiers cannot be rebuilt that way, so a line break inside one is an error.
fn one_line(sql: &str) -> LoaderResult<String> {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                let literal = take_quoted(&mut chars, '\'');
                if literal.contains(['\n', '\r']) {
                    out.push('(');
                    out.push_str(&quote_text(&literal.replace("''", "'")));
                    out.push(')');
                } else {
                    out.push('\'');
                    out.push_str(&literal);
                    out.push('\'');
                }
            }
            '"' | '`' | '[' => {
                let close = if ch == '[' { ']' } else { ch };
                let ident = take_quoted(&mut chars, close);
                if ident.contains(['\n', '\r']) {
                    return Err(LoaderError::InvalidIdentifier { name: ident });
                }
                out.push(ch);
                out.push_str(&ident);
                out.push(close);
            }
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                let comment: String = chars.by_ref().take_while(|&c| c != '\n').collect();
                push_comment(&mut out, &comment);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut comment = String::new();
                while let Some(c) = chars.next() {
                    if c == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        break;
                    }
                    comment.push(c);
                }
                push_comment(&mut out, &comment);
            }
            c if c.is_whitespace() => {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            c => out.push(c),
        }
    }
    Ok(out.trim_end().to_owned())
}

/// Body of a quoted token up to its closing `close`; doubled closers stay doubled.
fn take_quoted(chars: &mut Peekable<Chars<'_>>, close: char) -> String {
    let mut body = String::new();
    while let Some(c) = chars.next() {
        if c == close {
            if close != ']' && chars.peek() == Some(&close) {
                chars.next();
                body.push(c);
                body.push(c);
                continue;
            }
            break;
        }
        body.push(c);
    }
    body
}

fn push_comment(out: &mut String, comment: &str) {
    let body = comment.split_whitespace().collect::<Vec<_>>().join(" ");
    if !out.is_empty() && !out.ends_with(' ') {
        out.push(' ');
    }
    out.push_str("/* ");
    out.push_str(&body.replace("*/", "* /"));
    out.push_str(" */ ");
}

#[cfg(test)]
mod tests {
    use super::{DataStore, Params, Statement, one_line, quote_identifier};
    use crate::error::LoaderError;
    use crate::types::Value;

    fn people_store() -> DataStore {
        let store = DataStore::open_in_memory().unwrap();
        store
            .execute_batch(
                "create table people (id integer primary key, name text not null,
                                      gender text default 'U');
                 insert into people (name, gender) values ('Cliff', 'M');
                 insert into people (name, gender) values ('Clair', 'F');",
            )
            .unwrap();
        store
    }

    #[test]
    fn params_standardize_scalars_and_sequences() {
        assert!(Params::from(()).is_empty());
        assert_eq!(Params::from("m").as_slice(), [Value::from("m")]);
        assert_eq!(Params::from(7).as_slice(), [Value::Integer(7)]);
        assert_eq!(
            Params::from(vec!["a", "b"]).as_slice(),
            [Value::from("a"), Value::from("b")]
        );
        assert_eq!(Params::from([1, 2, 3]).len(), 3);
        assert_eq!(Params::from(None::<&str>).as_slice(), [Value::Null]);
    }

    #[test]
    fn statement_display_lists_params() {
        let stmt = Statement::new("  select * from t where a = ? and b = ?  ", vec![
            Value::from("x"),
            Value::Null,
        ]);
        assert_eq!(
            stmt.to_string(),
            "select * from t where a = ? and b = ?\n-- params: ('x', NULL)"
        );
        assert_eq!(Statement::new("select 1", ()).to_string(), "select 1");
    }

    #[test]
    fn quote_identifier_doubles_quotes_and_rejects_empty() {
        assert_eq!(quote_identifier("tbl").unwrap(), "\"tbl\"");
        assert_eq!(quote_identifier("a\"b").unwrap(), "\"a\"\"b\"");
        assert!(matches!(
            quote_identifier(""),
            Err(LoaderError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn fetch_helpers_return_rows_in_projection_order() {
        let store = people_store();
        let rows = store
            .fetch_all("select gender, name from people order by id", ())
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields(), ["gender", "name"]);
        assert_eq!(rows[1]["name"], Value::from("Clair"));

        let one = store
            .fetch_one("select name from people where gender = ?", "F")
            .unwrap()
            .unwrap();
        assert_eq!(one["name"], Value::from("Clair"));
        assert!(store
            .fetch_one("select name from people where gender = ?", "X")
            .unwrap()
            .is_none());
    }

    #[test]
    fn scalar_returns_none_without_rows() {
        let store = people_store();
        assert_eq!(
            store.scalar("select count(*) from people", ()).unwrap(),
            Some(Value::Integer(2))
        );
        assert_eq!(
            store.scalar("select name from people where id = ?", 99).unwrap(),
            None
        );
    }

    #[test]
    fn execute_reports_affected_rows() {
        let store = people_store();
        let n = store
            .execute("update people set gender = ? where gender <> ?", ["X", "X"])
            .unwrap();
        assert_eq!(n, 2);
    }

    #[test]
    fn query_errors_carry_statement_and_params() {
        let store = people_store();
        let err = store
            .execute("insert into people (name) values (?)", None::<&str>)
            .unwrap_err();
        match err {
            LoaderError::Query { statement, .. } => {
                assert_eq!(statement.sql, "insert into people (name) values (?)");
                assert_eq!(statement.params.as_slice(), [Value::Null]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = store.fetch_all("select * from nope", ()).unwrap_err();
        assert!(err.to_string().contains("select * from nope"));
    }

    #[test]
    fn parameter_count_mismatch_is_a_query_error() {
        let store = people_store();
        let err = store
            .fetch_all("select * from people where name = ?", ["a", "b"])
            .unwrap_err();
        assert!(matches!(err, LoaderError::Query { .. }));
    }

    #[test]
    fn commit_without_pending_transaction_is_a_no_op() {
        let store = people_store();
        assert!(!store.in_transaction());
        store.commit().unwrap();
        store.begin().unwrap();
        assert!(store.in_transaction());
        store.begin().unwrap();
        store.execute("delete from people", ()).unwrap();
        store.rollback().unwrap();
        assert!(!store.in_transaction());
        assert_eq!(
            store.scalar("select count(*) from people", ()).unwrap(),
            Some(Value::Integer(2))
        );
    }

    #[test]
    fn column_schema_reports_nullability_and_defaults() {
        let store = people_store();
        let cols = store.column_schema("people").unwrap();
        let names: Vec<&str> = cols.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, ["id", "name", "gender"]);
        assert_eq!(cols[0].data_type, "integer");
        assert!(!cols[1].is_nullable);
        assert!(cols[2].is_nullable);
        assert_eq!(cols[1].column_default, "");
        assert_eq!(cols[2].column_default, "'U'");
        assert!(store.column_schema("missing").unwrap().is_empty());
    }

    #[test]
    fn table_schema_lists_base_tables() {
        let store = people_store();
        store.execute("create table pets (name text)", ()).unwrap();
        store.execute("create view v as select * from pets", ()).unwrap();
        let tables = store.table_schema().unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.table_name.as_str()).collect();
        assert_eq!(names, ["people", "pets"]);
        assert!(tables.iter().all(|t| t.table_type == "BASE TABLE"));
    }

    #[test]
    fn dump_emits_one_statement_per_line() {
        let store = people_store();
        store
            .execute("insert into people (name) values (?)", "multi\nline")
            .unwrap();
        let lines = store.dump().unwrap();
        assert_eq!(lines.first().map(String::as_str), Some("BEGIN TRANSACTION;"));
        assert_eq!(lines.last().map(String::as_str), Some("COMMIT;"));
        assert!(lines.iter().all(|l| !l.contains('\n')));
        assert!(lines
            .iter()
            .any(|l| l == "INSERT INTO \"people\" VALUES(1,'Cliff','M');"));

        let replay = DataStore::open_in_memory().unwrap();
        replay.execute_batch(&lines.join("\n")).unwrap();
        assert_eq!(
            replay
                .scalar("select name from people where id = 3", ())
                .unwrap(),
            Some(Value::from("multi\nline"))
        );
    }

    #[test]
    fn one_line_folds_whitespace_and_comments() {
        let sql = "CREATE TABLE t (\n    a text, -- first column\n    b text /* second\n */\n)";
        assert_eq!(
            one_line(sql).unwrap(),
            "CREATE TABLE t ( a text, /* first column */ b text /* second */ )"
        );
    }

    #[test]
    fn one_line_keeps_quoted_text_intact() {
        assert_eq!(
            one_line("select 'it''s  -- not a comment', \"a  b\", [c\"d]").unwrap(),
            "select 'it''s  -- not a comment', \"a  b\", [c\"d]"
        );
        assert_eq!(
            one_line("create table t (a text default 'l1\n  it''s')").unwrap(),
            "create table t (a text default ('l1'||char(10)||'  it''s'))"
        );
    }

    #[test]
    fn one_line_rejects_line_breaks_in_identifiers() {
        let err = one_line("create table \"odd\nname\" (a)").unwrap_err();
        assert!(matches!(err, LoaderError::InvalidIdentifier { .. }));
    }
}
