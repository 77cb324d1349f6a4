//! Decorators that wrap an owned inner source.

use tracing::trace;

use crate::error::LoaderResult;
use crate::types::{Field, Row};

use super::RecordSource;

/// Truncates every pass of the inner source to at most `limit` rows.
#[derive(Debug)]
pub struct Limit<S> {
    inner: S,
    limit: usize,
    produced: usize,
}

impl<S: RecordSource> Limit<S> {
    pub fn new(inner: S, limit: usize) -> Self {
        Self {
            inner,
            limit,
            produced: 0,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RecordSource> RecordSource for Limit<S> {
    fn table_name(&self) -> &str {
        self.inner.table_name()
    }

    fn line_number(&self) -> u64 {
        self.inner.line_number()
    }

    fn fields(&self) -> &[Field] {
        self.inner.fields()
    }

    fn next_row(&mut self) -> Option<LoaderResult<Row>> {
        if self.produced >= self.limit {
            return None;
        }
        let item = self.inner.next_row()?;
        self.produced += 1;
        Some(item)
    }

    fn rewind(&mut self) -> LoaderResult<()> {
        self.inner.rewind()?;
        self.produced = 0;
        Ok(())
    }
}

/// Forwards every call to the inner source unchanged.
///
/// Each produced row is reported as a `trace`-level `tracing` event tagged with `label`, which
/// makes this the place to hang cross-cutting behavior without altering the wrapped source.
#[derive(Debug)]
pub struct PassThrough<S> {
    inner: S,
    label: String,
}

impl<S: RecordSource> PassThrough<S> {
    pub fn new(inner: S, label: impl Into<String>) -> Self {
        Self {
            inner,
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RecordSource> RecordSource for PassThrough<S> {
    fn table_name(&self) -> &str {
        self.inner.table_name()
    }

    fn line_number(&self) -> u64 {
        self.inner.line_number()
    }

    fn fields(&self) -> &[Field] {
        self.inner.fields()
    }

    fn next_row(&mut self) -> Option<LoaderResult<Row>> {
        let item = self.inner.next_row();
        if let Some(Ok(row)) = &item {
            trace!(
                source = %self.label,
                table = self.inner.table_name(),
                line = self.inner.line_number(),
                width = row.len(),
                "row produced"
            );
        }
        item
    }

    fn rewind(&mut self) -> LoaderResult<()> {
        self.inner.rewind()
    }
}
