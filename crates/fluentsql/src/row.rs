//! Result rows and typed mapping.

use crate::config::ColumnCase;
use crate::error::{FluentError, FluentResult};
use crate::value::Value;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// One result row: column names in select order with their values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: impl Into<Arc<[String]>>, values: Vec<Value>) -> Self {
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Same row with column names converted by `case`.
    pub fn with_column_case(self, case: ColumnCase) -> Self {
        if case == ColumnCase::Natural {
            return self;
        }
        let columns: Vec<String> = self.columns.iter().map(|c| case.apply(c)).collect();
        Self {
            columns: columns.into(),
            values: self.values,
        }
    }

    /// Column → value object. Later duplicate names overwrite earlier ones.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(c, v)| (c.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Map the row onto `T` by column name.
    pub fn decode<T: DeserializeOwned>(&self) -> FluentResult<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }

    /// Try to get a typed column value, returning [`FluentError::Decode`] on failure.
    pub fn try_get<T: DeserializeOwned>(&self, column: &str) -> FluentResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| FluentError::decode(column, "no such column"))?;
        serde_json::from_value(value.to_json()).map_err(|e| FluentError::decode(column, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: i64,
        name: String,
        country_id: Option<i64>,
    }

    fn row() -> Row {
        Row::new(
            vec!["ID".to_string(), "NAME".to_string(), "COUNTRY_ID".to_string()],
            vec![Value::Int(1), Value::from("Marek"), Value::Null],
        )
    }

    #[test]
    fn lookup_by_name_and_index() {
        let row = row();
        assert_eq!(row.get("NAME"), Some(&Value::from("Marek")));
        assert_eq!(row.get("name"), None);
        assert_eq!(row.get_index(0), Some(&Value::Int(1)));
        assert_eq!(row.get_index(3), None);
    }

    #[test]
    fn decodes_after_case_mapping() {
        let row = row().with_column_case(ColumnCase::Lower);
        let user: User = row.decode().unwrap();
        assert_eq!(
            user,
            User {
                id: 1,
                name: "Marek".to_string(),
                country_id: None,
            }
        );
        assert_eq!(row.try_get::<String>("name").unwrap(), "Marek");

        let err = row.try_get::<i64>("name").unwrap_err();
        assert!(matches!(err, FluentError::Decode { .. }));
    }
}
