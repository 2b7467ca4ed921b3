//! Per-kind clause accumulators.

use crate::error::FluentResult;
use crate::params::ParamTracker;

/// Clause kinds a statement accumulates fragments for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Select,
    Set,
    Where,
    GroupBy,
    Having,
    OrderBy,
    OnDuplicateKeyUpdate,
}

impl ClauseKind {
    /// Keyword that opens the clause.
    pub fn keyword(self) -> &'static str {
        match self {
            ClauseKind::Select => "SELECT",
            ClauseKind::Set => "SET",
            ClauseKind::Where => "WHERE",
            ClauseKind::GroupBy => "GROUP BY",
            ClauseKind::Having => "HAVING",
            ClauseKind::OrderBy => "ORDER BY",
            ClauseKind::OnDuplicateKeyUpdate => "ON DUPLICATE KEY UPDATE",
        }
    }

    pub fn default_glue(self) -> Glue {
        match self {
            ClauseKind::Where | ClauseKind::Having => Glue::And,
            _ => Glue::Comma,
        }
    }
}

/// Text placed between two fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glue {
    Comma,
    And,
    Or,
}

impl Glue {
    pub fn as_str(self) -> &'static str {
        match self {
            Glue::Comma => ", ",
            Glue::And => " AND ",
            Glue::Or => " OR ",
        }
    }
}

/// Clause text with the values it binds. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Fragment {
    text: String,
    params: ParamTracker,
    glue: Option<Glue>,
}

impl Fragment {
    /// Fragment binding nothing.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, ParamTracker::new())
    }

    pub fn new(text: impl Into<String>, params: ParamTracker) -> Self {
        Self {
            text: text.into(),
            params,
            glue: None,
        }
    }

    /// Override the glue placed before this fragment.
    pub fn with_glue(mut self, glue: Glue) -> Self {
        self.glue = Some(glue);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &ParamTracker {
        &self.params
    }
}

/// Ordered fragments of one clause kind.
#[derive(Debug, Clone)]
pub struct Clause {
    kind: ClauseKind,
    fragments: Vec<Fragment>,
}

impl Clause {
    pub fn new(kind: ClauseKind) -> Self {
        Self {
            kind,
            fragments: Vec::new(),
        }
    }

    pub fn kind(&self) -> ClauseKind {
        self.kind
    }

    pub fn append(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// Drop all fragments and the values they bind.
    pub fn reset(&mut self) {
        self.fragments.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Join `texts` (one per fragment, possibly rewritten) with each
    /// fragment's glue.
    pub fn render_with<S: AsRef<str>>(&self, texts: &[S]) -> String {
        let mut out = String::new();
        for (i, (fragment, text)) in self.fragments.iter().zip(texts).enumerate() {
            if i > 0 {
                out.push_str(fragment.glue.unwrap_or(self.kind.default_glue()).as_str());
            }
            out.push_str(text.as_ref());
        }
        out
    }

    /// Clause body without the keyword.
    pub fn render(&self) -> String {
        let texts: Vec<&str> = self.fragments.iter().map(Fragment::text).collect();
        self.render_with(&texts)
    }

    /// Values bound by all fragments, in order.
    pub fn params(&self) -> FluentResult<ParamTracker> {
        let mut tracker = ParamTracker::new();
        for fragment in &self.fragments {
            tracker.merge(&fragment.params)?;
        }
        Ok(tracker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn glue_per_kind() {
        let mut clause = Clause::new(ClauseKind::Where);
        clause.append(Fragment::raw("a = 1"));
        clause.append(Fragment::raw("b = 2"));
        clause.append(Fragment::raw("c = 3").with_glue(Glue::Or));
        assert_eq!(clause.render(), "a = 1 AND b = 2 OR c = 3");

        let mut clause = Clause::new(ClauseKind::OrderBy);
        clause.append(Fragment::raw("name"));
        clause.append(Fragment::raw("id DESC"));
        assert_eq!(clause.render(), "name, id DESC");
    }

    #[test]
    fn reset_drops_params() {
        let mut tracker = ParamTracker::new();
        tracker.add(Value::Int(1)).unwrap();
        let mut clause = Clause::new(ClauseKind::Where);
        clause.append(Fragment::new("id = ?", tracker));
        assert_eq!(clause.params().unwrap().len(), 1);
        clause.reset();
        assert!(clause.is_empty());
        assert!(clause.params().unwrap().is_empty());
    }
}
