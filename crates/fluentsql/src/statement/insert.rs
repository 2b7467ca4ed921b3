use super::{Statement, StatementKind};
use crate::clause::{ClauseKind, Fragment};
use crate::error::{FluentError, FluentResult};
use crate::params::ParamTracker;
use crate::predicate;
use crate::value::{Arg, IntoPairs};

const INSERT: &[StatementKind] = &[StatementKind::Insert];

impl Statement {
    /// Add one row. The first row fixes the column list; later rows must
    /// name the same columns in the same order.
    pub fn values(mut self, row: impl IntoPairs) -> Self {
        if !self.allow("VALUES", INSERT) {
            return self;
        }
        let pairs = row.into_pairs().into_vec();
        let row = self.row(pairs).and_then(|f| self.claim_style(&f).map(|()| f));
        match row {
            Ok(row) => self.rows.push(row),
            Err(err) => self.record(err),
        }
        self
    }

    /// Add several rows at once.
    pub fn values_many<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoPairs,
    {
        for row in rows {
            self = self.values(row);
        }
        self
    }

    fn row(&mut self, pairs: Vec<(String, Arg)>) -> FluentResult<Fragment> {
        if pairs.is_empty() {
            return Err(FluentError::configuration("an inserted row needs at least one column"));
        }
        let columns: Vec<String> = pairs.iter().map(|(c, _)| c.trim().to_string()).collect();
        if self.columns.is_empty() {
            self.columns = columns;
        } else if self.columns != columns {
            return Err(FluentError::configuration(format!(
                "row columns ({}) differ from the first row ({})",
                columns.join(", "),
                self.columns.join(", ")
            )));
        }

        let mut tracker = ParamTracker::new();
        let mut slots = Vec::with_capacity(pairs.len());
        for (column, arg) in pairs {
            match arg {
                Arg::Value(value) => {
                    tracker.add(value)?;
                    slots.push("?".to_string());
                }
                Arg::Literal(literal) => slots.push(literal.as_str().to_string()),
                Arg::List(_) => {
                    return Err(FluentError::configuration(format!(
                        "cannot insert a list into '{column}'"
                    )));
                }
            }
        }
        Ok(Fragment::new(format!("({})", slots.join(", ")), tracker))
    }

    /// `ON DUPLICATE KEY UPDATE` assignments.
    pub fn on_duplicate_key_update(mut self, pairs: impl IntoPairs) -> Self {
        if !self.allow("ON DUPLICATE KEY UPDATE", INSERT) {
            return self;
        }
        for (column, arg) in pairs.into_pairs().into_vec() {
            let fragment = predicate::assignment(&column, arg);
            self.push(ClauseKind::OnDuplicateKeyUpdate, fragment);
        }
        self
    }
}
