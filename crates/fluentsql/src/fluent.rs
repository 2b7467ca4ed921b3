//! Statement factory.

use crate::config::FluentConfig;
use crate::error::FluentResult;
use crate::statement::{Statement, StatementKind};
use std::sync::Arc;

/// Creates statements sharing one read-only configuration.
///
/// ```ignore
/// let fluent = Fluent::new();
/// let sql = fluent.from("user").where_("type", "author").get_query(false)?;
/// assert_eq!(sql, "SELECT user.* FROM user WHERE type = ?");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Fluent {
    config: Arc<FluentConfig>,
}

impl Fluent {
    /// Factory with the default configuration (smart joins on, `id` /
    /// `{table}_id` naming).
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with a custom configuration; the naming structure is
    /// validated up front.
    pub fn with_config(config: FluentConfig) -> FluentResult<Self> {
        config.structure.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &FluentConfig {
        &self.config
    }

    fn statement(&self, kind: StatementKind, table: &str) -> Statement {
        Statement::new(kind, table, Arc::clone(&self.config))
    }

    /// `SELECT <table>.* FROM <table>`; `table` may carry an alias
    /// (`user AS author`) or a database (`db2.user`).
    pub fn from(&self, table: &str) -> Statement {
        self.statement(StatementKind::Select, table)
    }

    pub fn insert_into(&self, table: &str) -> Statement {
        self.statement(StatementKind::Insert, table)
    }

    pub fn update(&self, table: &str) -> Statement {
        self.statement(StatementKind::Update, table)
    }

    pub fn delete_from(&self, table: &str) -> Statement {
        self.statement(StatementKind::Delete, table)
    }

    /// Same as [`delete_from`](Self::delete_from); pair with
    /// [`Statement::from`] for multi-table deletes.
    pub fn delete(&self, table: &str) -> Statement {
        self.delete_from(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Structure;

    #[test]
    fn statements_share_config() {
        let fluent = Fluent::with_config(FluentConfig::new().with_smart_join(false)).unwrap();
        let statement = fluent.from("user");
        assert!(!statement.is_smart_join_enabled());
        assert_eq!(statement.kind(), StatementKind::Select);
        assert_eq!(fluent.delete("user").kind(), StatementKind::Delete);
    }

    #[test]
    fn rejects_invalid_structure() {
        let mut structure = Structure::default();
        structure.foreign_key = "fk".to_string();
        let err = Fluent::with_config(FluentConfig::new().with_structure(structure)).unwrap_err();
        assert!(err.is_configuration());
    }
}
