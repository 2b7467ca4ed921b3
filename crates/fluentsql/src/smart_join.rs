//! Join planning for one compile.
//!
//! Explicit join calls are applied first, in call order. When smart joins are
//! enabled, clause text is then scanned for relation tokens: each token adds
//! the LEFT JOINs it needs and is rewritten to reference the last table
//! (`user.country.name` becomes `country.name`). The statement itself is never
//! mutated, so compiling twice yields the same output.

use crate::clause::Clause;
use crate::config::Structure;
use crate::error::{FluentError, FluentResult};
use crate::lexer::{RelationToken, Separator, Token, relation_tokens, tokenize};
use crate::params::ParamTracker;
use crate::resolver::Resolver;
use crate::table::{JoinEdge, JoinKind, JoinSet, JoinSpec, TableRef};

/// A join call recorded on a statement.
#[derive(Debug, Clone)]
pub(crate) struct JoinRequest {
    pub kind: JoinKind,
    pub spec: JoinSpec,
    /// Argument text as given, already bound
    pub text: String,
    pub params: ParamTracker,
}

impl JoinRequest {
    pub fn new(kind: JoinKind, text: String, params: ParamTracker) -> FluentResult<Self> {
        Ok(Self {
            kind,
            spec: JoinSpec::parse(&text)?,
            text,
            params,
        })
    }
}

pub(crate) struct JoinPlanner<'a> {
    base: &'a TableRef,
    structure: &'a Structure,
    smart: bool,
    joins: JoinSet,
    params: ParamTracker,
}

impl<'a> JoinPlanner<'a> {
    pub fn new(base: &'a TableRef, structure: &'a Structure, smart: bool) -> Self {
        Self {
            base,
            structure,
            smart,
            joins: JoinSet::new(),
            params: ParamTracker::new(),
        }
    }

    /// Apply a join call. Duplicates of an already joined alias are dropped
    /// together with their parameters.
    pub fn explicit(&mut self, request: &JoinRequest) -> FluentResult<()> {
        if request.spec.condition.is_some() {
            let edge = JoinEdge {
                kind: request.kind,
                table: request.spec.path.clone(),
                alias: request.spec.target_alias().to_string(),
                source: None,
                sql: format!("{} {}", request.kind.keyword(), request.text),
                explicit: true,
            };
            if self.joins.push(edge)? {
                self.params.merge(&request.params)?;
            }
            return Ok(());
        }

        let path = &request.spec.path;
        let padded = if path.ends_with('.') || path.ends_with(':') {
            path.clone()
        } else {
            format!("{path}.")
        };
        let token = match relation_tokens(&padded).as_slice() {
            [token] if token.raw == padded && token.column.is_none() => token.clone(),
            _ => {
                return Err(FluentError::configuration(format!(
                    "cannot resolve join '{}'",
                    request.text
                )));
            }
        };
        Resolver::new(self.base, self.structure).explicit().resolve(
            &mut self.joins,
            &token.segments,
            request.kind,
            request.spec.alias.as_deref(),
            &request.text,
        )?;
        Ok(())
    }

    /// Register joins needed by `text` without rewriting it.
    pub fn discover(&mut self, text: &str) -> FluentResult<()> {
        if !self.smart {
            return Ok(());
        }
        for token in relation_tokens(text) {
            self.resolve(&token)?;
        }
        Ok(())
    }

    /// Resolve relation tokens in `text` and return the rewritten text.
    pub fn rewrite(&mut self, text: &str) -> FluentResult<String> {
        if !self.smart {
            return Ok(text.to_string());
        }
        let mut out = String::with_capacity(text.len());
        for token in tokenize(text) {
            match token {
                Token::Relation(relation) => out.push_str(&self.resolve(&relation)?),
                Token::Text(t) | Token::Named(t) => out.push_str(t),
                Token::Positional => out.push('?'),
            }
        }
        Ok(out)
    }

    /// Rewritten text of every fragment of `clause`.
    pub fn rewrite_clause(&mut self, clause: &Clause) -> FluentResult<Vec<String>> {
        clause
            .fragments()
            .iter()
            .map(|f| self.rewrite(f.text()))
            .collect()
    }

    fn resolve(&mut self, token: &RelationToken) -> FluentResult<String> {
        let resolved = Resolver::new(self.base, self.structure).resolve(
            &mut self.joins,
            &token.segments,
            JoinKind::Left,
            None,
            &token.raw,
        )?;
        let forward = token.segments.iter().all(|s| s.sep == Separator::Forward);
        if resolved.hops == 0 && forward {
            return Ok(token.raw.clone());
        }
        Ok(match &token.column {
            Some(column) => format!("{}.{column}", resolved.reference),
            None => String::new(),
        })
    }

    /// Joins in emission order plus the values bound by explicit conditions.
    pub fn finish(self) -> (JoinSet, ParamTracker) {
        (self.joins, self.params)
    }
}
