//! Fetch family: run a statement and shape its rows.
//!
//! "No matching row" is `Ok(None)` / an empty list, never an error.

use crate::client::{Cursor, GenericClient};
use crate::error::{FluentError, FluentResult};
use crate::row::Row;
use crate::statement::{Compiled, Statement, StatementKind};
use crate::value::Value;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

impl Statement {
    /// Execute and return the lazy row cursor, column case applied.
    pub fn iter<C: GenericClient + ?Sized>(&self, client: &C) -> FluentResult<Cursor> {
        let case = self.config().column_case;
        let cursor = self.execute(client)?.into_cursor();
        Ok(cursor.map_rows(move |row| row.with_column_case(case)))
    }

    /// First row, if any.
    pub fn fetch<C: GenericClient + ?Sized>(&self, client: &C) -> FluentResult<Option<Row>> {
        self.iter(client)?.next().transpose()
    }

    /// One column of the first row, by name.
    pub fn fetch_field<C: GenericClient + ?Sized>(
        &self,
        client: &C,
        column: &str,
    ) -> FluentResult<Option<Value>> {
        Ok(self.fetch(client)?.and_then(|row| row.get(column).cloned()))
    }

    /// One column of the first row, by position.
    pub fn fetch_column<C: GenericClient + ?Sized>(
        &self,
        client: &C,
        index: usize,
    ) -> FluentResult<Option<Value>> {
        Ok(self.fetch(client)?.and_then(|row| row.get_index(index).cloned()))
    }

    pub fn fetch_all<C: GenericClient + ?Sized>(&self, client: &C) -> FluentResult<Vec<Row>> {
        self.iter(client)?.collect()
    }

    /// Rows keyed by the value of `key`; a repeated key replaces the earlier
    /// row in place.
    ///
    /// With a non-empty `columns` the select list is replaced by
    /// `<key>, <columns>`; otherwise rows are keyed by the column named after
    /// the last `.` of `key`.
    pub fn fetch_all_keyed<C: GenericClient + ?Sized>(
        &self,
        client: &C,
        key: &str,
        columns: &str,
    ) -> FluentResult<Vec<(Value, Row)>> {
        let (rows, by_index) = if columns.trim().is_empty() {
            (self.fetch_all(client)?, false)
        } else {
            let statement = self
                .clone()
                .clear_select()
                .select(&format!("{key}, {columns}"));
            (statement.fetch_all(client)?, true)
        };

        let name = key.rsplit('.').next().unwrap_or(key).trim();
        let name = self.config().column_case.apply(name);
        let mut keyed: Vec<(Value, Row)> = Vec::with_capacity(rows.len());
        for row in rows {
            let value = if by_index {
                row.get_index(0)
            } else {
                row.get(&name)
            };
            let value = value
                .cloned()
                .ok_or_else(|| FluentError::decode(key, "key column missing from result"))?;
            match keyed.iter_mut().find(|(k, _)| *k == value) {
                Some(slot) => slot.1 = row,
                None => keyed.push((value, row)),
            }
        }
        Ok(keyed)
    }

    /// `(key, value)` pairs from a `SELECT <key>, <value>` rewrite.
    pub fn fetch_pairs<C: GenericClient + ?Sized>(
        &self,
        client: &C,
        key: &str,
        value: &str,
    ) -> FluentResult<Vec<(Value, Value)>> {
        let statement = self
            .clone()
            .clear_select()
            .select(&format!("{key}, {value}"));
        statement
            .iter(client)?
            .map(|row| {
                let row = row?;
                let pair = (row.get_index(0).cloned(), row.get_index(1).cloned());
                match pair {
                    (Some(k), Some(v)) => Ok((k, v)),
                    _ => Err(FluentError::decode(value, "pair query returned fewer than two columns")),
                }
            })
            .collect()
    }

    /// `SELECT COUNT(*) FROM (<statement>) AS t`.
    pub fn count_query(&self) -> FluentResult<Compiled> {
        if self.kind() != StatementKind::Select {
            return Err(FluentError::InvalidClause {
                clause: "COUNT",
                kind: self.kind(),
            });
        }
        let inner = self.compile()?;
        Ok(Compiled {
            sql: format!("SELECT COUNT(*) FROM ({}) AS t", inner.sql),
            params: inner.params,
        })
    }

    /// Number of rows the statement would return.
    pub fn count<C: GenericClient + ?Sized>(&self, client: &C) -> FluentResult<i64> {
        let compiled = self.count_query()?;
        tracing::debug!(
            target: "fluentsql.sql",
            kind = %self.kind(),
            sql = %compiled.sql,
            param_count = compiled.params.len(),
            "count"
        );
        let row = client
            .execute(&compiled.sql, &compiled.params)?
            .into_cursor()
            .next()
            .transpose()?;
        Ok(row.and_then(|r| r.get_index(0).and_then(Value::as_i64)).unwrap_or(0))
    }

    /// Fetch rows as `T` instead of [`Row`].
    pub fn as_object<T: DeserializeOwned>(self) -> TypedStatement<T> {
        TypedStatement {
            statement: self,
            _marker: PhantomData,
        }
    }
}

/// A statement whose rows are deserialized into `T` by column name.
#[derive(Debug, Clone)]
pub struct TypedStatement<T> {
    statement: Statement,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> TypedStatement<T> {
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn into_statement(self) -> Statement {
        self.statement
    }

    pub fn fetch<C: GenericClient + ?Sized>(&self, client: &C) -> FluentResult<Option<T>> {
        self.statement
            .fetch(client)?
            .map(|row| row.decode())
            .transpose()
    }

    pub fn fetch_all<C: GenericClient + ?Sized>(&self, client: &C) -> FluentResult<Vec<T>> {
        self.iter(client)?.collect()
    }

    pub fn iter<C: GenericClient + ?Sized>(
        &self,
        client: &C,
    ) -> FluentResult<impl Iterator<Item = FluentResult<T>> + use<T, C>> {
        Ok(self
            .statement
            .iter(client)?
            .map(|row| row.and_then(|row| row.decode())))
    }
}
