use super::{Statement, StatementKind};
use crate::table::TableRef;

impl Statement {
    /// Multi-table DELETE: the table given to `delete_from` becomes the
    /// target list and `table` the FROM table.
    ///
    /// `delete_from("t1, t2").from("t1")` compiles to
    /// `DELETE t1, t2 FROM t1 ...`.
    pub fn from(mut self, table: &str) -> Self {
        if !self.allow("FROM", &[StatementKind::Delete]) {
            return self;
        }
        match TableRef::parse(table) {
            Ok(base) => {
                let targets = std::mem::replace(&mut self.base, base);
                self.targets = Some(targets.raw().to_string());
                self.base_error = None;
            }
            Err(err) => self.record(err),
        }
        self
    }
}
