use super::{Statement, StatementKind};
use crate::clause::ClauseKind;
use crate::predicate;
use crate::value::{Args, IntoArgs};

const SELECT: &[StatementKind] = &[StatementKind::Select];

/// SELECT-only clauses.
impl Statement {
    /// Append to the select list. A new SELECT starts with `<table>.*`;
    /// call [`clear_select`](Self::clear_select) first to replace it.
    /// Text with placeholders is rejected; use [`select_with`](Self::select_with).
    pub fn select(mut self, columns: &str) -> Self {
        if self.allow("SELECT", SELECT) {
            let fragment = predicate::bound_text(columns, Args::none());
            self.push(ClauseKind::Select, fragment);
        }
        self
    }

    /// Select expression with its own placeholders.
    pub fn select_with(mut self, expression: &str, args: impl IntoArgs) -> Self {
        if self.allow("SELECT", SELECT) {
            let fragment = predicate::bound_text(expression, args.into_args());
            self.push(ClauseKind::Select, fragment);
        }
        self
    }

    pub fn select_many(mut self, columns: &[&str]) -> Self {
        if self.allow("SELECT", SELECT) {
            for column in columns {
                let fragment = predicate::bound_text(column, Args::none());
                self.push(ClauseKind::Select, fragment);
            }
        }
        self
    }

    /// Empty the select list, including the default `<table>.*`.
    pub fn clear_select(mut self) -> Self {
        if self.allow("SELECT", SELECT) {
            self.select.reset();
            self.refresh_style();
        }
        self
    }

    pub fn group_by(mut self, columns: &str) -> Self {
        if self.allow("GROUP BY", SELECT) {
            let fragment = predicate::bound_text(columns, Args::none());
            self.push(ClauseKind::GroupBy, fragment);
        }
        self
    }

    pub fn group_by_many(self, columns: &[&str]) -> Self {
        self.group_by(&columns.join(", "))
    }

    /// HAVING predicate; same argument rules as [`where_`](Self::where_).
    pub fn having(mut self, condition: &str, args: impl IntoArgs) -> Self {
        if self.allow("HAVING", SELECT) {
            let fragment = predicate::condition(condition, args.into_args());
            self.push(ClauseKind::Having, fragment);
        }
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        if self.allow("OFFSET", SELECT) {
            self.offset = Some(offset);
        }
        self
    }
}
