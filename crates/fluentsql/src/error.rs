//! Error types for fluentsql

use thiserror::Error;

use crate::statement::StatementKind;

/// Result type alias for fluentsql operations
pub type FluentResult<T> = Result<T, FluentError>;

/// Boxed error produced by an execution collaborator.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum FluentError {
    /// Positional and named parameters mixed in one statement
    #[error("Ambiguous parameter style: {0}")]
    AmbiguousParameterStyle(String),

    /// An alias is already bound to a different table
    #[error("Ambiguous alias '{alias}': bound to '{existing}', cannot rebind to '{table}'")]
    AmbiguousAlias {
        alias: String,
        existing: String,
        table: String,
    },

    /// Clause method called on a statement kind that does not support it
    #[error("{clause} is not valid for {kind} statements")]
    InvalidClause {
        clause: &'static str,
        kind: StatementKind,
    },

    /// Other builder misconfiguration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Relation token cannot be mapped to a join chain
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Error surfaced by the execution collaborator
    #[error("Execution error: {0}")]
    Execution(#[source] SourceError),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl FluentError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a resolution error
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    /// Wrap a collaborator error without interpreting it
    pub fn execution(err: impl Into<SourceError>) -> Self {
        Self::Execution(err.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a configuration error (style, alias, clause gating, ...)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousParameterStyle(_)
                | Self::AmbiguousAlias { .. }
                | Self::InvalidClause { .. }
                | Self::Configuration(_)
        )
    }

    /// Check if this is a resolution error
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }

    /// Check if this error came from the execution collaborator
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Copy of an error recorded by a builder call.
    ///
    /// Recorded errors never carry a source, so only execution errors lose
    /// information (they are flattened to their message).
    pub(crate) fn replay(&self) -> Self {
        match self {
            Self::AmbiguousParameterStyle(msg) => Self::AmbiguousParameterStyle(msg.clone()),
            Self::AmbiguousAlias {
                alias,
                existing,
                table,
            } => Self::AmbiguousAlias {
                alias: alias.clone(),
                existing: existing.clone(),
                table: table.clone(),
            },
            Self::InvalidClause { clause, kind } => Self::InvalidClause {
                clause: *clause,
                kind: *kind,
            },
            Self::Configuration(msg) => Self::Configuration(msg.clone()),
            Self::Resolution(msg) => Self::Resolution(msg.clone()),
            Self::Decode { column, message } => Self::Decode {
                column: column.clone(),
                message: message.clone(),
            },
            Self::Execution(err) => Self::Execution(err.to_string().into()),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for FluentError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Execution(Box::new(err))
    }
}

impl From<serde_json::Error> for FluentError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode("<row>", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_error_families() {
        let err = FluentError::AmbiguousParameterStyle("mixed".into());
        assert!(err.is_configuration());
        assert!(!err.is_resolution());

        let err = FluentError::InvalidClause {
            clause: "GROUP BY",
            kind: StatementKind::Delete,
        };
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "GROUP BY is not valid for DELETE statements");

        assert!(FluentError::resolution("empty segment").is_resolution());
    }

    #[test]
    fn execution_keeps_source() {
        let io = std::io::Error::other("server went away");
        let err = FluentError::execution(io);
        assert!(err.is_execution());
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "server went away");
    }
}
