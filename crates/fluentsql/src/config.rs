//! Builder configuration: naming conventions and statement defaults.
//!
//! Configuration can be built in code or loaded from TOML:
//!
//! ```toml
//! smart_join = true
//! column_case = "lower"
//!
//! [structure]
//! primary_key = "id"
//! foreign_key = "{table}_id"
//!
//! [structure.primary_keys]
//! country = "code"
//!
//! [structure.foreign_keys]
//! "article.user" = ["author_id"]
//! ```

use crate::error::{FluentError, FluentResult};
use serde::Deserialize;
use std::collections::BTreeMap;

const TABLE_PLACEHOLDER: &str = "{table}";

/// Top-level builder configuration shared by every statement a
/// [`Fluent`](crate::Fluent) factory creates.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FluentConfig {
    /// Whether new statements infer joins from relation tokens.
    pub smart_join: bool,
    /// Case applied to column names of fetched rows.
    pub column_case: ColumnCase,
    /// Key naming conventions.
    pub structure: Structure,
}

impl Default for FluentConfig {
    fn default() -> Self {
        Self {
            smart_join: true,
            column_case: ColumnCase::Natural,
            structure: Structure::default(),
        }
    }
}

impl FluentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> FluentResult<Self> {
        let config: FluentConfig = toml::from_str(raw)
            .map_err(|e| FluentError::configuration(format!("failed to parse config: {e}")))?;
        config.structure.validate()?;
        Ok(config)
    }

    pub fn with_smart_join(mut self, enabled: bool) -> Self {
        self.smart_join = enabled;
        self
    }

    pub fn with_column_case(mut self, case: ColumnCase) -> Self {
        self.column_case = case;
        self
    }

    pub fn with_structure(mut self, structure: Structure) -> Self {
        self.structure = structure;
        self
    }
}

/// Case conversion for result column names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCase {
    /// Keep names as reported by the driver
    #[default]
    Natural,
    Lower,
    Upper,
}

impl ColumnCase {
    pub fn apply(self, name: &str) -> String {
        match self {
            ColumnCase::Natural => name.to_string(),
            ColumnCase::Lower => name.to_lowercase(),
            ColumnCase::Upper => name.to_uppercase(),
        }
    }
}

/// Primary/foreign key naming conventions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Structure {
    /// Default primary key column.
    pub primary_key: String,
    /// Foreign key pattern; `{table}` is replaced by the referenced table.
    pub foreign_key: String,
    /// Per-table primary key overrides.
    pub primary_keys: BTreeMap<String, String>,
    /// Candidate FK columns keyed by `"<holder>.<referenced>"`.
    /// More than one candidate makes the hop ambiguous.
    pub foreign_keys: BTreeMap<String, Vec<String>>,
}

impl Default for Structure {
    fn default() -> Self {
        Self {
            primary_key: "id".to_string(),
            foreign_key: "{table}_id".to_string(),
            primary_keys: BTreeMap::new(),
            foreign_keys: BTreeMap::new(),
        }
    }
}

impl Structure {
    /// Create a validated structure.
    pub fn new(primary_key: impl Into<String>, foreign_key: impl Into<String>) -> FluentResult<Self> {
        let structure = Self {
            primary_key: primary_key.into(),
            foreign_key: foreign_key.into(),
            ..Self::default()
        };
        structure.validate()?;
        Ok(structure)
    }

    /// Override the primary key of one table.
    pub fn with_primary_key(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.primary_keys.insert(table.into(), column.into());
        self
    }

    /// Add a candidate FK column held by `holder` referencing `referenced`.
    pub fn with_foreign_key(
        mut self,
        holder: &str,
        referenced: &str,
        column: impl Into<String>,
    ) -> Self {
        self.foreign_keys
            .entry(format!("{holder}.{referenced}"))
            .or_default()
            .push(column.into());
        self
    }

    pub fn validate(&self) -> FluentResult<()> {
        if self.primary_key.trim().is_empty() {
            return Err(FluentError::configuration("primary key name is empty"));
        }
        if !self.foreign_key.contains(TABLE_PLACEHOLDER) {
            return Err(FluentError::configuration(format!(
                "foreign key pattern '{}' must contain {TABLE_PLACEHOLDER}",
                self.foreign_key
            )));
        }
        Ok(())
    }

    /// Primary key column of `table`.
    pub fn primary_key_for(&self, table: &str) -> &str {
        self.primary_keys
            .get(table)
            .map(String::as_str)
            .unwrap_or(&self.primary_key)
    }

    /// FK column in `holder` that references `referenced`.
    pub fn foreign_key_for(&self, holder: &str, referenced: &str) -> FluentResult<String> {
        let key = format!("{holder}.{referenced}");
        match self.foreign_keys.get(&key).map(Vec::as_slice) {
            Some([single]) => Ok(single.clone()),
            Some(candidates) if candidates.len() > 1 => Err(FluentError::resolution(format!(
                "ambiguous foreign key from {holder} to {referenced}: {}",
                candidates.join(", ")
            ))),
            _ => Ok(self.foreign_key.replace(TABLE_PLACEHOLDER, referenced)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_conventions() {
        let s = Structure::default();
        assert_eq!(s.primary_key_for("user"), "id");
        assert_eq!(s.foreign_key_for("article", "user").unwrap(), "user_id");
    }

    #[test]
    fn pattern_must_mention_table() {
        let err = Structure::new("id", "fk").unwrap_err();
        assert!(err.is_configuration());
        assert!(Structure::new("id", "fk_{table}").is_ok());
    }

    #[test]
    fn overrides() {
        let s = Structure::default()
            .with_primary_key("country", "code")
            .with_foreign_key("article", "user", "author_id");
        assert_eq!(s.primary_key_for("country"), "code");
        assert_eq!(s.foreign_key_for("article", "user").unwrap(), "author_id");
        assert_eq!(s.foreign_key_for("comment", "user").unwrap(), "user_id");

        let s = s.with_foreign_key("article", "user", "editor_id");
        assert!(s.foreign_key_for("article", "user").unwrap_err().is_resolution());
    }

    #[test]
    fn loads_from_toml() {
        let config = FluentConfig::from_toml_str(
            r#"
smart_join = false
column_case = "upper"

[structure]
foreign_key = "fk_{table}"

[structure.primary_keys]
country = "code"
"#,
        )
        .unwrap();
        assert!(!config.smart_join);
        assert_eq!(config.column_case, ColumnCase::Upper);
        assert_eq!(config.structure.primary_key, "id");
        assert_eq!(config.structure.foreign_key_for("user", "country").unwrap(), "fk_country");
        assert_eq!(config.structure.primary_key_for("country"), "code");
    }

    #[test]
    fn invalid_toml_pattern_is_rejected() {
        let err = FluentConfig::from_toml_str("[structure]\nforeign_key = \"owner\"\n").unwrap_err();
        assert!(err.is_configuration());
    }
}
