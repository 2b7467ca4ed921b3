//! Execution collaborator seam.
//!
//! Statements compile to SQL text plus [`Parameters`] and hand both to a
//! [`GenericClient`]. The crate ships an implementation for
//! `rusqlite::Connection` (feature `sqlite`); anything else that can run SQL
//! can implement the trait.

use crate::error::FluentResult;
use crate::params::Parameters;
use crate::row::Row;
use std::fmt;

/// A trait that unifies connections able to run compiled statements.
pub trait GenericClient {
    /// Run `sql` with `params` bound to its placeholders.
    ///
    /// Row-returning statements yield a [`Cursor`]; others report rows
    /// affected and, for inserts, the last insert id.
    fn execute(&self, sql: &str, params: &Parameters) -> FluentResult<Execution>;

    /// Same as [`GenericClient::execute`], associating a tag for monitoring.
    ///
    /// The default implementation ignores `tag`.
    fn execute_tagged(&self, tag: &str, sql: &str, params: &Parameters) -> FluentResult<Execution> {
        let _ = tag;
        self.execute(sql, params)
    }
}

impl<C: GenericClient + ?Sized> GenericClient for &C {
    fn execute(&self, sql: &str, params: &Parameters) -> FluentResult<Execution> {
        (**self).execute(sql, params)
    }

    fn execute_tagged(&self, tag: &str, sql: &str, params: &Parameters) -> FluentResult<Execution> {
        (**self).execute_tagged(tag, sql, params)
    }
}

/// Outcome of one execution.
#[derive(Debug)]
pub struct Execution {
    rows_affected: u64,
    last_insert_id: Option<i64>,
    returns_rows: bool,
    cursor: Cursor,
}

impl Execution {
    /// Result of a statement that returned rows.
    pub fn rows(cursor: Cursor) -> Self {
        Self {
            rows_affected: 0,
            last_insert_id: None,
            returns_rows: true,
            cursor,
        }
    }

    /// Result of a statement that modified rows.
    pub fn affected(rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
            returns_rows: false,
            cursor: Cursor::empty(),
        }
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    pub fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    /// Whether the statement produced a result set.
    pub fn returns_rows(&self) -> bool {
        self.returns_rows
    }

    pub fn into_cursor(self) -> Cursor {
        self.cursor
    }
}

/// Forward-only, single-pass row iterator.
///
/// Re-iterating requires executing the statement again.
#[must_use]
pub struct Cursor {
    inner: Box<dyn Iterator<Item = FluentResult<Row>>>,
}

impl Cursor {
    /// Create a new `Cursor` from any compatible iterator.
    pub fn new<I>(rows: I) -> Self
    where
        I: Iterator<Item = FluentResult<Row>> + 'static,
    {
        Self {
            inner: Box::new(rows),
        }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(rows.into_iter().map(Ok))
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Apply `f` to every row as it is produced.
    pub(crate) fn map_rows<F>(self, mut f: F) -> Self
    where
        F: FnMut(Row) -> Row + 'static,
    {
        Self::new(self.inner.map(move |row| row.map(&mut f)))
    }
}

impl Iterator for Cursor {
    type Item = FluentResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").finish_non_exhaustive()
    }
}
