//! Statement compilation.
//!
//! Compilation never mutates the statement: the join planner works on its
//! own registry, so two compiles of an unchanged statement are identical.

use super::{Statement, StatementKind};
use crate::clause::Clause;
use crate::error::{FluentError, FluentResult};
use crate::lexer::{Token, tokenize};
use crate::params::{ParamTracker, Parameters};
use crate::smart_join::JoinPlanner;

/// SQL text plus parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub sql: String,
    pub params: Parameters,
}

impl Compiled {
    /// SQL with every placeholder replaced by its value's literal form.
    /// For logs and debugging only.
    pub fn inline(&self) -> String {
        let mut positional = self.params.positional().unwrap_or_default().iter();
        let mut out = String::with_capacity(self.sql.len());
        for token in tokenize(&self.sql) {
            match token {
                Token::Positional => match positional.next() {
                    Some(value) => out.push_str(&value.to_sql_literal()),
                    None => out.push('?'),
                },
                Token::Named(name) => match self.params.get(name) {
                    Some(value) => out.push_str(&value.to_sql_literal()),
                    None => out.push_str(name),
                },
                Token::Text(t) => out.push_str(t),
                Token::Relation(r) => out.push_str(&r.raw),
            }
        }
        out
    }
}

/// Clause body rewritten by the planner.
struct Part {
    keyword: &'static str,
    body: String,
}

fn push_clause(parts: &mut Vec<String>, part: Part) {
    if !part.body.is_empty() {
        parts.push(format!("{} {}", part.keyword, part.body));
    }
}

impl Statement {
    /// Build SQL text and parameters.
    ///
    /// Returns the first error recorded by a builder call, if any.
    pub fn compile(&self) -> FluentResult<Compiled> {
        if let Some(err) = self.error() {
            return Err(err.replay());
        }
        match self.kind {
            StatementKind::Insert => self.compile_insert(),
            StatementKind::Select | StatementKind::Update | StatementKind::Delete => {
                self.compile_filtered()
            }
        }
    }

    fn compile_insert(&self) -> FluentResult<Compiled> {
        if self.rows.is_empty() {
            return Err(FluentError::configuration(format!(
                "INSERT INTO {} has no values",
                self.base.raw()
            )));
        }
        let mut parts = vec!["INSERT".to_string()];
        if self.ignore {
            parts.push("IGNORE".to_string());
        }
        parts.push(format!("INTO {}", self.base.raw()));
        parts.push(format!("({})", self.columns.join(", ")));
        let rows: Vec<&str> = self.rows.iter().map(|r| r.text()).collect();
        parts.push(format!("VALUES {}", rows.join(", ")));

        let mut params = ParamTracker::new();
        for row in &self.rows {
            params.merge(row.params())?;
        }
        if !self.on_duplicate.is_empty() {
            parts.push(format!(
                "{} {}",
                self.on_duplicate.kind().keyword(),
                self.on_duplicate.render()
            ));
            params.merge(&self.on_duplicate.params()?)?;
        }
        Ok(Compiled {
            sql: parts.join(" "),
            params: params.snapshot(),
        })
    }

    fn compile_filtered(&self) -> FluentResult<Compiled> {
        let mut planner = JoinPlanner::new(&self.base, &self.config.structure, self.smart_join);
        for join in &self.joins {
            planner.explicit(join)?;
        }

        let select = match self.kind {
            StatementKind::Select => rewrite(&mut planner, &self.select)?.body,
            _ => String::new(),
        };
        for join in &self.joins {
            if let Some(condition) = &join.spec.condition {
                planner.discover(condition)?;
            }
        }
        let where_ = rewrite(&mut planner, &self.where_)?;
        let group_by = rewrite(&mut planner, &self.group_by)?;
        let having = rewrite(&mut planner, &self.having)?;
        let order_by = rewrite(&mut planner, &self.order_by)?;
        let (joins, join_params) = planner.finish();

        let mut parts = Vec::new();
        let mut params = ParamTracker::new();
        match self.kind {
            StatementKind::Update => {
                if self.set.is_empty() {
                    return Err(FluentError::configuration(format!(
                        "UPDATE {} has no SET assignments",
                        self.base.raw()
                    )));
                }
                parts.push("UPDATE".to_string());
                if self.ignore {
                    parts.push("IGNORE".to_string());
                }
                parts.push(self.base.raw().to_string());
            }
            StatementKind::Delete => {
                parts.push("DELETE".to_string());
                if self.ignore {
                    parts.push("IGNORE".to_string());
                }
                if let Some(targets) = &self.targets {
                    parts.push(targets.clone());
                }
                parts.push(format!("FROM {}", self.base.raw()));
            }
            StatementKind::Select | StatementKind::Insert => {
                let columns = if select.is_empty() { "*" } else { select.as_str() };
                parts.push(format!("SELECT {columns}"));
                parts.push(format!("FROM {}", self.base.raw()));
                params.merge(&self.select.params()?)?;
            }
        }

        if !joins.is_empty() {
            parts.push(joins.render());
        }
        params.merge(&join_params)?;

        if self.kind == StatementKind::Update {
            parts.push(format!("SET {}", self.set.render()));
            params.merge(&self.set.params()?)?;
        }

        push_clause(&mut parts, where_);
        params.merge(&self.where_.params()?)?;

        if self.kind == StatementKind::Select {
            push_clause(&mut parts, group_by);
            push_clause(&mut parts, having);
            params.merge(&self.having.params()?)?;
        }
        push_clause(&mut parts, order_by);

        if let Some(limit) = self.limit {
            parts.push(format!("LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("OFFSET {offset}"));
        }

        Ok(Compiled {
            sql: parts.join(" "),
            params: params.snapshot(),
        })
    }
}

fn rewrite(planner: &mut JoinPlanner<'_>, clause: &Clause) -> FluentResult<Part> {
    let texts = planner.rewrite_clause(clause)?;
    Ok(Part {
        keyword: clause.kind().keyword(),
        body: clause.render_with(&texts),
    })
}
