//! Statement builder.
//!
//! A [`Statement`] is created by a [`Fluent`](crate::Fluent) factory call and
//! mutated through chained calls that consume and return it. Misuse (a clause
//! the statement kind does not support, mixed placeholder styles, argument
//! count mismatches, ...) is recorded and returned by the next terminal call
//! (`compile`, `get_query`, `get_parameters`, `execute`, `fetch*`).
//!
//! ```ignore
//! let fluent = Fluent::new();
//! let query = fluent
//!     .from("article")
//!     .where_("comment:content <> '' AND user.country.id = ?", 1)
//!     .order_by("article.published_at DESC")
//!     .limit(10);
//!
//! assert_eq!(
//!     query.get_query(false)?,
//!     "SELECT article.* FROM article \
//!      LEFT JOIN comment ON comment.article_id = article.id \
//!      LEFT JOIN user ON user.id = article.user_id \
//!      LEFT JOIN country ON country.id = user.country_id \
//!      WHERE comment.content <> '' AND country.id = ? \
//!      ORDER BY article.published_at DESC LIMIT 10"
//! );
//! ```

mod compile;
mod delete;
mod insert;
mod select;
mod update;

#[cfg(test)]
mod tests;

pub use compile::Compiled;

use crate::clause::{Clause, ClauseKind, Fragment, Glue};
use crate::client::{Execution, GenericClient};
use crate::config::FluentConfig;
use crate::error::{FluentError, FluentResult};
use crate::params::{ParamStyle, Parameters};
use crate::predicate;
use crate::smart_join::JoinRequest;
use crate::table::{JoinKind, TableRef};
use crate::value::{Args, IntoArgs, IntoPairs, Value};
use std::fmt;
use std::sync::Arc;

/// Statement shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use StatementKind::{Delete, Insert, Select, Update};

const FILTERED: &[StatementKind] = &[Select, Update, Delete];
const MODIFIERS: &[StatementKind] = &[Insert, Update, Delete];

/// A SELECT/INSERT/UPDATE/DELETE statement under construction.
#[derive(Debug, Clone)]
pub struct Statement {
    kind: StatementKind,
    config: Arc<FluentConfig>,
    base: TableRef,
    /// DELETE targets listed before FROM
    targets: Option<String>,
    ignore: bool,
    smart_join: bool,
    select: Clause,
    joins: Vec<JoinRequest>,
    set: Clause,
    where_: Clause,
    group_by: Clause,
    having: Clause,
    order_by: Clause,
    limit: Option<u64>,
    offset: Option<u64>,
    columns: Vec<String>,
    rows: Vec<Fragment>,
    on_duplicate: Clause,
    style: Option<ParamStyle>,
    /// Unparseable table; cleared when a DELETE names its FROM table
    base_error: Option<Arc<FluentError>>,
    error: Option<Arc<FluentError>>,
}

impl Statement {
    pub(crate) fn new(kind: StatementKind, table: &str, config: Arc<FluentConfig>) -> Self {
        let (base, base_error) = match TableRef::parse(table) {
            Ok(base) => (base, None),
            Err(err) => (TableRef::verbatim(table), Some(Arc::new(err))),
        };
        let smart_join = config.smart_join;
        let mut statement = Self {
            kind,
            config,
            base,
            targets: None,
            ignore: false,
            smart_join,
            select: Clause::new(ClauseKind::Select),
            joins: Vec::new(),
            set: Clause::new(ClauseKind::Set),
            where_: Clause::new(ClauseKind::Where),
            group_by: Clause::new(ClauseKind::GroupBy),
            having: Clause::new(ClauseKind::Having),
            order_by: Clause::new(ClauseKind::OrderBy),
            limit: None,
            offset: None,
            columns: Vec::new(),
            rows: Vec::new(),
            on_duplicate: Clause::new(ClauseKind::OnDuplicateKeyUpdate),
            style: None,
            base_error,
            error: None,
        };
        if kind == Select {
            let all = format!("{}.*", statement.base.reference());
            statement.select.append(Fragment::raw(all));
        }
        statement
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The statement's own table.
    pub fn base(&self) -> &TableRef {
        &self.base
    }

    pub fn config(&self) -> &FluentConfig {
        &self.config
    }

    /// Whether relation tokens will be resolved at the next compile.
    pub fn is_smart_join_enabled(&self) -> bool {
        self.smart_join
    }

    /// First error recorded by a builder call, if any.
    pub fn error(&self) -> Option<&FluentError> {
        self.error.as_deref().or(self.base_error.as_deref())
    }

    // ==================== error bookkeeping ====================

    pub(crate) fn record(&mut self, err: FluentError) {
        tracing::warn!(
            target: "fluentsql.sql",
            kind = %self.kind,
            table = %self.base.raw(),
            error = %err,
            "statement builder error"
        );
        if self.error.is_none() {
            self.error = Some(Arc::new(err));
        }
    }

    /// Record an [`FluentError::InvalidClause`] unless the kind is allowed.
    pub(crate) fn allow(&mut self, clause: &'static str, kinds: &[StatementKind]) -> bool {
        if kinds.contains(&self.kind) {
            return true;
        }
        self.record(FluentError::InvalidClause {
            clause,
            kind: self.kind,
        });
        false
    }

    fn claim_style(&mut self, fragment: &Fragment) -> FluentResult<()> {
        let Some(style) = fragment.params().style() else {
            return Ok(());
        };
        match self.style {
            None => {
                self.style = Some(style);
                Ok(())
            }
            Some(current) if current == style => Ok(()),
            Some(current) => Err(FluentError::AmbiguousParameterStyle(format!(
                "statement already binds {current} parameters, cannot add {style} ones"
            ))),
        }
    }

    /// Recompute the style after fragments were dropped.
    fn refresh_style(&mut self) {
        let clauses = [
            &self.select,
            &self.set,
            &self.where_,
            &self.having,
            &self.on_duplicate,
        ];
        self.style = clauses
            .iter()
            .flat_map(|c| c.fragments())
            .chain(self.rows.iter())
            .find_map(|f| f.params().style())
            .or_else(|| self.joins.iter().find_map(|j| j.params.style()));
    }

    fn clause_mut(&mut self, kind: ClauseKind) -> &mut Clause {
        match kind {
            ClauseKind::Select => &mut self.select,
            ClauseKind::Set => &mut self.set,
            ClauseKind::Where => &mut self.where_,
            ClauseKind::GroupBy => &mut self.group_by,
            ClauseKind::Having => &mut self.having,
            ClauseKind::OrderBy => &mut self.order_by,
            ClauseKind::OnDuplicateKeyUpdate => &mut self.on_duplicate,
        }
    }

    /// Append a built fragment, or record why it could not be built.
    pub(crate) fn push(&mut self, kind: ClauseKind, fragment: FluentResult<Fragment>) {
        match fragment.and_then(|f| self.claim_style(&f).map(|()| f)) {
            Ok(fragment) => self.clause_mut(kind).append(fragment),
            Err(err) => self.record(err),
        }
    }

    // ==================== WHERE ====================

    /// Add a WHERE predicate joined with AND.
    ///
    /// `condition` may contain `?` or `:name` placeholders. Without
    /// placeholders a single argument turns it into `condition = ?`,
    /// `condition IS NULL` (for `None`), `condition IN (...)` (for a list)
    /// or `condition = <literal>`.
    pub fn where_(self, condition: &str, args: impl IntoArgs) -> Self {
        self.filter(condition, args.into_args(), Glue::And)
    }

    /// Add a WHERE predicate joined with OR.
    pub fn or_where(self, condition: &str, args: impl IntoArgs) -> Self {
        self.filter(condition, args.into_args(), Glue::Or)
    }

    fn filter(mut self, condition: &str, args: Args, glue: Glue) -> Self {
        if !self.allow("WHERE", FILTERED) {
            return self;
        }
        let fragment = predicate::condition(condition, args).map(|f| f.with_glue(glue));
        self.push(ClauseKind::Where, fragment);
        self
    }

    /// Add one `column = ?` predicate per pair, joined with AND.
    pub fn where_all(mut self, pairs: impl IntoPairs) -> Self {
        if !self.allow("WHERE", FILTERED) {
            return self;
        }
        for (column, arg) in pairs.into_pairs().into_vec() {
            let fragment = predicate::condition(&column, Args::Positional(vec![arg]));
            self.push(ClauseKind::Where, fragment);
        }
        self
    }

    /// Drop every WHERE predicate and its parameters.
    pub fn clear_where(mut self) -> Self {
        if self.allow("WHERE", FILTERED) {
            self.where_.reset();
            self.refresh_style();
        }
        self
    }

    /// Filter by primary key: `<alias>.<pk> = ?` for SELECT, `<pk> = ?`
    /// for UPDATE and DELETE.
    pub fn by_id(mut self, id: impl Into<Value>) -> Self {
        if !self.allow("by_id", FILTERED) {
            return self;
        }
        let pk = self.config.structure.primary_key_for(self.base.name());
        let column = match self.kind {
            Select => format!("{}.{pk}", self.base.reference()),
            _ => pk.to_string(),
        };
        let value: Value = id.into();
        let fragment = predicate::condition(&column, value.into_args());
        self.push(ClauseKind::Where, fragment);
        self
    }

    // ==================== JOIN ====================

    /// `INNER JOIN`: a table path (`user`, `article:`, `comment:user AS u`)
    /// or a full `table [AS alias] ON ...` / `USING (...)` clause.
    pub fn inner_join(self, join: &str) -> Self {
        self.join_with(JoinKind::Inner, join, ())
    }

    pub fn left_join(self, join: &str) -> Self {
        self.join_with(JoinKind::Left, join, ())
    }

    pub fn outer_join(self, join: &str) -> Self {
        self.join_with(JoinKind::Outer, join, ())
    }

    /// Join of any kind; `args` bind placeholders in an explicit condition.
    pub fn join_with(mut self, kind: JoinKind, join: &str, args: impl IntoArgs) -> Self {
        if !self.allow("JOIN", FILTERED) {
            return self;
        }
        let request = predicate::bound_text(join, args.into_args()).and_then(|fragment| {
            self.claim_style(&fragment)?;
            JoinRequest::new(kind, fragment.text().to_string(), fragment.params().clone())
        });
        match request {
            Ok(request) => self.joins.push(request),
            Err(err) => self.record(err),
        }
        self
    }

    // ==================== ORDER / LIMIT ====================

    pub fn order_by(mut self, columns: &str) -> Self {
        if self.allow("ORDER BY", FILTERED) {
            let fragment = predicate::bound_text(columns, Args::none());
            self.push(ClauseKind::OrderBy, fragment);
        }
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        if self.allow("LIMIT", FILTERED) {
            self.limit = Some(limit);
        }
        self
    }

    // ==================== modifiers ====================

    /// `INSERT IGNORE` / `UPDATE IGNORE` / `DELETE IGNORE`.
    pub fn ignore(mut self) -> Self {
        if self.allow("IGNORE", MODIFIERS) {
            self.ignore = true;
        }
        self
    }

    pub fn enable_smart_join(mut self) -> Self {
        self.smart_join = true;
        self
    }

    /// Keep only explicitly requested joins; clause text is not scanned.
    pub fn disable_smart_join(mut self) -> Self {
        self.smart_join = false;
        self
    }

    // ==================== terminals ====================

    /// SQL text. With `inline` the parameters are substituted as literals;
    /// that form is for debugging and never executed.
    pub fn get_query(&self, inline: bool) -> FluentResult<String> {
        let compiled = self.compile()?;
        Ok(if inline { compiled.inline() } else { compiled.sql })
    }

    /// Parameters in placeholder order.
    pub fn get_parameters(&self) -> FluentResult<Parameters> {
        Ok(self.compile()?.params)
    }

    /// Compile and hand the statement to `client`.
    pub fn execute<C: GenericClient + ?Sized>(&self, client: &C) -> FluentResult<Execution> {
        let compiled = self.compile()?;
        tracing::debug!(
            target: "fluentsql.sql",
            kind = %self.kind,
            sql = %compiled.sql,
            param_count = compiled.params.len(),
            "execute"
        );
        client.execute(&compiled.sql, &compiled.params)
    }
}
