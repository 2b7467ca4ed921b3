use super::{Statement, StatementKind};
use crate::clause::ClauseKind;
use crate::predicate;
use crate::value::{Arg, IntoPairs};

const UPDATE: &[StatementKind] = &[StatementKind::Update];

impl Statement {
    /// `SET column = ?`, or `column = <literal>` for a [`Literal`](crate::Literal).
    /// Assignment text is emitted as written; relation tokens are not
    /// resolved in SET.
    pub fn set(mut self, column: &str, value: impl Into<Arg>) -> Self {
        if self.allow("SET", UPDATE) {
            let fragment = predicate::assignment(column, value.into());
            self.push(ClauseKind::Set, fragment);
        }
        self
    }

    pub fn set_all(mut self, pairs: impl IntoPairs) -> Self {
        if !self.allow("SET", UPDATE) {
            return self;
        }
        for (column, arg) in pairs.into_pairs().into_vec() {
            self = self.set(&column, arg);
        }
        self
    }
}
