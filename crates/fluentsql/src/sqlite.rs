//! `rusqlite` execution adapter.
//!
//! Row-returning statements are read eagerly into a [`Cursor`] because the
//! prepared statement borrows the connection.

use crate::client::{Cursor, Execution, GenericClient};
use crate::error::FluentResult;
use crate::monitor::QueryType;
use crate::params::Parameters;
use crate::row::Row;
use crate::value::{DATETIME_FORMAT, Value};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, Params, ToSql};
use std::sync::Arc;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Bool(v) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(i64::from(*v))),
            Value::Int(v) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*v)),
            Value::Float(v) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*v)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Value::DateTime(dt) => ToSqlOutput::Owned(rusqlite::types::Value::Text(
                dt.format(DATETIME_FORMAT).to_string(),
            )),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Int(v),
            ValueRef::Real(v) => Value::Float(v),
            ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        }
    }
}

impl GenericClient for Connection {
    fn execute(&self, sql: &str, params: &Parameters) -> FluentResult<Execution> {
        let mut stmt = self.prepare_cached(sql)?;
        match params {
            Parameters::Positional(values) => {
                let bound: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
                run(self, &mut stmt, sql, bound.as_slice())
            }
            Parameters::Named(pairs) => {
                let bound: Vec<(&str, &dyn ToSql)> = pairs
                    .iter()
                    .map(|(k, v)| (k.as_str(), v as &dyn ToSql))
                    .collect();
                run(self, &mut stmt, sql, bound.as_slice())
            }
        }
    }
}

fn run<P: Params>(
    conn: &Connection,
    stmt: &mut rusqlite::Statement<'_>,
    sql: &str,
    params: P,
) -> FluentResult<Execution> {
    if stmt.column_count() == 0 {
        let changed = stmt.execute(params)?;
        let last_insert_id =
            (QueryType::from_sql(sql) == QueryType::Insert).then(|| conn.last_insert_rowid());
        return Ok(Execution::affected(changed as u64, last_insert_id));
    }

    let columns: Arc<[String]> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..columns.len())
            .map(|i| row.get_ref(i).map(Value::from))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        out.push(Row::new(columns.clone(), values));
    }
    Ok(Execution::rows(Cursor::from_rows(out)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluent::Fluent;
    use crate::value::named;
    use chrono::NaiveDate;

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT, active INTEGER, seen TEXT);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn insert_reports_last_id_and_select_reads_rows() {
        let conn = connection();
        let fluent = Fluent::new();

        let seen = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let execution = fluent
            .insert_into("user")
            .values([
                ("name", Value::from("Marek")),
                ("active", Value::Bool(true)),
                ("seen", Value::DateTime(seen)),
            ])
            .execute(&conn)
            .unwrap();
        assert_eq!(execution.rows_affected(), 1);
        assert_eq!(execution.last_insert_id(), Some(1));

        let row = fluent.from("user").where_("id", 1).fetch(&conn).unwrap().unwrap();
        assert_eq!(row.get("name"), Some(&Value::Text("Marek".into())));
        assert_eq!(row.get("active"), Some(&Value::Int(1)));
        assert_eq!(row.get("seen"), Some(&Value::Text("2024-05-01 08:30:00".into())));
    }

    #[test]
    fn named_parameters_bind_by_name() {
        let conn = connection();
        conn.execute_batch("INSERT INTO user (id, name) VALUES (1, 'a'), (2, 'b');")
            .unwrap();

        let rows = Fluent::new()
            .from("user")
            .where_("id > :low AND id <= :high", named([(":low", 0), ("high", 1)]))
            .fetch_all(&conn)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name").and_then(Value::as_str), Some("a"));
    }

    #[test]
    fn update_reports_changes_without_insert_id() {
        let conn = connection();
        conn.execute_batch("INSERT INTO user (id, name) VALUES (1, 'a'), (2, 'b');")
            .unwrap();

        let execution = Fluent::new()
            .update("user")
            .set("name", "c")
            .execute(&conn)
            .unwrap();
        assert_eq!(execution.rows_affected(), 2);
        assert_eq!(execution.last_insert_id(), None);
    }

    #[test]
    fn driver_errors_surface_as_execution() {
        let conn = connection();
        let err = Fluent::new().from("missing").fetch_all(&conn).unwrap_err();
        assert!(err.is_execution());
    }
}
