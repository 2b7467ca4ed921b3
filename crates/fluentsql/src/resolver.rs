//! Relation path resolution.
//!
//! Turns a sequence of table segments into join edges relative to the
//! statement's base table, using the configured key naming conventions.
//!
//! For a hop from source `S` to target `T`:
//!
//! - forward (`S.T`, `S` holds the key): `T.<pk(T)> = S.<fk(S -> T)>`
//! - backward (`S:T`, `T` holds the key): `T.<fk(T -> S)> = S.<pk(S)>`

use crate::config::Structure;
use crate::error::{FluentError, FluentResult};
use crate::lexer::{Segment, Separator};
use crate::table::{JoinEdge, JoinKind, JoinSet, TableRef};

/// Where a resolved path ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Number of join hops the path walked (new or reused).
    pub hops: usize,
    /// Alias of the last table, spelled as in the path when possible.
    pub reference: String,
}

/// Table reached so far while walking a path.
struct Cursor {
    alias: String,
    table: String,
}

pub struct Resolver<'a> {
    base: &'a TableRef,
    structure: &'a Structure,
    explicit: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(base: &'a TableRef, structure: &'a Structure) -> Self {
        Self {
            base,
            structure,
            explicit: false,
        }
    }

    /// Mark edges as coming from a join call.
    pub fn explicit(mut self) -> Self {
        self.explicit = true;
        self
    }

    /// Walk `segments`, adding missing edges to `joins`.
    ///
    /// `alias` renames only the last target. `raw` is used in error messages.
    pub fn resolve(
        &self,
        joins: &mut JoinSet,
        segments: &[Segment],
        kind: JoinKind,
        alias: Option<&str>,
        raw: &str,
    ) -> FluentResult<Resolved> {
        for segment in segments {
            if segment.name.is_empty() {
                return Err(FluentError::resolution(format!("empty table segment in '{raw}'")));
            }
            if segment.name == "*" {
                return Err(FluentError::resolution(format!(
                    "'*' cannot name a table in '{raw}'"
                )));
            }
        }

        let (start, mut cursor) = self.leading_reference(joins, segments, alias.is_some());
        let mut reference = match start {
            0 => cursor.alias.clone(),
            n => segments[n - 1].raw.clone(),
        };

        for (i, segment) in segments.iter().enumerate().skip(start) {
            let is_last = i + 1 == segments.len();
            let target_alias = match alias {
                Some(alias) if is_last => alias.to_string(),
                _ => segment.name.clone(),
            };
            let target_table = segment.name.clone();

            if self.base.is_named(&target_alias) && alias.is_none() {
                if target_table != self.base.name() {
                    return Err(FluentError::AmbiguousAlias {
                        alias: target_alias,
                        existing: self.base.name().to_string(),
                        table: target_table,
                    });
                }
                cursor = self.base_cursor();
                reference = segment.raw.clone();
                continue;
            }

            let reusable = !(is_last && alias.is_some()) && joins.table_of(&target_alias).is_none();
            let from_base = cursor.alias == self.base.reference();
            if let Some(edge) = joins
                .aliased(&target_table, &cursor.alias, from_base)
                .filter(|_| reusable)
            {
                let alias = edge.alias.clone();
                reference = alias.clone();
                cursor = Cursor {
                    alias,
                    table: target_table,
                };
                continue;
            }

            let condition = match segment.sep {
                Separator::Forward => format!(
                    "{target_alias}.{} = {}.{}",
                    self.structure.primary_key_for(&target_table),
                    cursor.alias,
                    self.structure.foreign_key_for(&cursor.table, &target_table)?,
                ),
                Separator::Backward => format!(
                    "{target_alias}.{} = {}.{}",
                    self.structure.foreign_key_for(&target_table, &cursor.table)?,
                    cursor.alias,
                    self.structure.primary_key_for(&cursor.table),
                ),
            };
            let head = if target_alias == target_table {
                target_table.clone()
            } else {
                format!("{target_table} AS {target_alias}")
            };
            let edge = JoinEdge {
                kind,
                table: target_table.clone(),
                alias: target_alias.clone(),
                source: Some(cursor.alias.clone()),
                sql: format!("{} {head} ON {condition}", kind.keyword()),
                explicit: self.explicit,
            };
            if joins.push(edge)? && !self.explicit {
                tracing::trace!(
                    target: "fluentsql.join",
                    kind = %kind,
                    table = %target_table,
                    alias = %target_alias,
                    from = %cursor.alias,
                    "inferred join"
                );
            }

            reference = if target_alias == segment.name {
                segment.raw.clone()
            } else {
                target_alias.clone()
            };
            cursor = Cursor {
                alias: target_alias,
                table: target_table,
            };
        }

        Ok(Resolved {
            hops: segments.len() - start,
            reference,
        })
    }

    fn base_cursor(&self) -> Cursor {
        Cursor {
            alias: self.base.reference(),
            table: self.base.name().to_string(),
        }
    }

    /// Count leading segments that name the base table or an existing alias.
    ///
    /// The base may be matched by a dotted, database-qualified prefix. With an
    /// explicit alias the last segment is always a join target.
    fn leading_reference(
        &self,
        joins: &JoinSet,
        segments: &[Segment],
        aliased: bool,
    ) -> (usize, Cursor) {
        let limit = if aliased {
            segments.len().saturating_sub(1)
        } else {
            segments.len()
        };

        for n in (1..=limit).rev() {
            let forward = segments[..n - 1]
                .iter()
                .all(|s| s.sep == Separator::Forward);
            if !forward {
                continue;
            }
            let path = segments[..n]
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(".");
            if self.base.is_named(&path) {
                return (n, self.base_cursor());
            }
        }

        if limit >= 1 {
            let first = &segments[0].name;
            if let Some(table) = joins.table_of(first) {
                return (
                    1,
                    Cursor {
                        alias: first.clone(),
                        table: table.to_string(),
                    },
                );
            }
        }

        (0, self.base_cursor())
    }
}
