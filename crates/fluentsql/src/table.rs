//! Table references, join kinds and the per-statement join registry.

use crate::error::{FluentError, FluentResult};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// `table [AS] alias`
static TABLE_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(?P<table>\S+)(?:\s+(?:AS\s+)?(?P<alias>\S+))?\s*$")
        .expect("valid table regex")
});

/// `path [[AS] alias] [ON ...|USING ...]`
static JOIN_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*(?P<path>\S+)(?:\s+(?:AS\s+)?(?P<alias>\S+))?(?:\s+(?P<cond>(?:ON|USING)\b.*?))?\s*$",
    )
    .expect("valid join regex")
});

fn is_condition_keyword(word: &str) -> bool {
    word.eq_ignore_ascii_case("ON") || word.eq_ignore_ascii_case("USING")
}

fn unquote(name: &str) -> &str {
    let stripped = name
        .strip_prefix('`')
        .and_then(|n| n.strip_suffix('`'))
        .or_else(|| name.strip_prefix('[').and_then(|n| n.strip_suffix(']')));
    stripped.unwrap_or(name)
}

/// The statement's own table: `user`, `user AS author`, `db2.user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    raw: String,
    database: Option<String>,
    name: String,
    alias: Option<String>,
}

impl TableRef {
    pub fn parse(spec: &str) -> FluentResult<Self> {
        let caps = TABLE_SPEC
            .captures(spec)
            .ok_or_else(|| FluentError::configuration(format!("invalid table '{spec}'")))?;
        let table = caps.name("table").map_or("", |m| m.as_str());
        let (database, name) = match table.rsplit_once('.') {
            Some((db, name)) if !db.is_empty() && !name.is_empty() => {
                (Some(unquote(db).to_string()), unquote(name).to_string())
            }
            _ => (None, unquote(table).to_string()),
        };
        Ok(Self {
            raw: spec.trim().to_string(),
            database,
            name,
            alias: caps.name("alias").map(|m| m.as_str().to_string()),
        })
    }

    /// Unparsed fallback; emitted as written and never matched as a path.
    pub(crate) fn verbatim(spec: &str) -> Self {
        Self {
            raw: spec.trim().to_string(),
            database: None,
            name: spec.trim().to_string(),
            alias: None,
        }
    }

    /// Text emitted after FROM/UPDATE/INTO, as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Unqualified table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// `db.table`, or the bare name.
    pub fn qualified_name(&self) -> String {
        match &self.database {
            Some(db) => format!("{db}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Name used to refer to the table in other clauses.
    pub fn reference(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.qualified_name(),
        }
    }

    /// Whether a leading path names this table.
    pub fn is_named(&self, path: &str) -> bool {
        path == self.name || path == self.qualified_name() || self.alias.as_deref() == Some(path)
    }
}

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Outer,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Outer => "OUTER JOIN",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parsed explicit join argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    /// Table or relation path (`user`, `article:`, `comment:user`)
    pub path: String,
    pub alias: Option<String>,
    /// `ON ...` / `USING ...` text, if the join spells its own condition
    pub condition: Option<String>,
}

impl JoinSpec {
    pub fn parse(spec: &str) -> FluentResult<Self> {
        let caps = JOIN_SPEC
            .captures(spec)
            .ok_or_else(|| FluentError::configuration(format!("invalid join '{spec}'")))?;
        let path = caps.name("path").map_or("", |m| m.as_str()).to_string();
        let alias = caps
            .name("alias")
            .map(|m| m.as_str())
            .filter(|a| !is_condition_keyword(a))
            .map(str::to_string);
        Ok(Self {
            path,
            alias,
            condition: caps.name("cond").map(|m| m.as_str().to_string()),
        })
    }

    /// Alias the join registers under.
    pub fn target_alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.path)
    }
}

/// A join present in a compiled statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEdge {
    pub kind: JoinKind,
    pub table: String,
    pub alias: String,
    /// Alias the join was reached from; `None` for joins spelling their own
    /// ON/USING condition.
    pub source: Option<String>,
    /// Full clause text, keyword included.
    pub sql: String,
    /// Added by a join call rather than inferred from clause text.
    pub explicit: bool,
}

/// Ordered joins keyed by target alias.
#[derive(Debug, Clone, Default)]
pub struct JoinSet {
    edges: Vec<JoinEdge>,
}

impl JoinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table bound to `alias`.
    pub fn table_of(&self, alias: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|e| e.alias == alias)
            .map(|e| e.table.as_str())
    }

    /// Earlier join of `table` under an alias of its own, reached from
    /// `source`. Joins with their own condition match only hops starting at
    /// the base table.
    pub fn aliased(&self, table: &str, source: &str, from_base: bool) -> Option<&JoinEdge> {
        self.edges.iter().find(|e| {
            e.alias != e.table
                && unquote(&e.table) == unquote(table)
                && e.source.as_deref().map_or(from_base, |s| s == source)
        })
    }

    /// Add an edge unless its alias is already joined.
    ///
    /// Returns `false` for a duplicate of the same table and an
    /// [`FluentError::AmbiguousAlias`] when the alias names another table.
    pub fn push(&mut self, edge: JoinEdge) -> FluentResult<bool> {
        match self.table_of(&edge.alias) {
            None => {
                self.edges.push(edge);
                Ok(true)
            }
            Some(existing) if unquote(existing) == unquote(&edge.table) => Ok(false),
            Some(existing) => Err(FluentError::AmbiguousAlias {
                alias: edge.alias,
                existing: existing.to_string(),
                table: edge.table,
            }),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &JoinEdge> {
        self.edges.iter()
    }

    /// Space separated join clauses.
    pub fn render(&self) -> String {
        self.edges
            .iter()
            .map(|e| e.sql.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
