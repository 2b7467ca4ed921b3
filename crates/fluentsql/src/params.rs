//! Parameter tracking.
//!
//! A statement binds either positional (`?`) or named (`:name`) parameters,
//! never both. [`ParamTracker`] enforces that and hands out a [`Parameters`]
//! snapshot for execution.

use crate::error::{FluentError, FluentResult};
use crate::value::Value;
use std::fmt;

/// Placeholder style used by a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `?`
    Positional,
    /// `:name`
    Named,
}

impl fmt::Display for ParamStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamStyle::Positional => f.write_str("positional"),
            ParamStyle::Named => f.write_str("named"),
        }
    }
}

/// Ordered parameters handed to the execution collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameters {
    Positional(Vec<Value>),
    /// Keys carry the leading `:`.
    Named(Vec<(String, Value)>),
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters::Positional(Vec::new())
    }
}

impl Parameters {
    pub fn len(&self) -> usize {
        match self {
            Parameters::Positional(v) => v.len(),
            Parameters::Named(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Style of a non-empty parameter set.
    pub fn style(&self) -> Option<ParamStyle> {
        match self {
            _ if self.is_empty() => None,
            Parameters::Positional(_) => Some(ParamStyle::Positional),
            Parameters::Named(_) => Some(ParamStyle::Named),
        }
    }

    /// Positional values, if this is a positional set.
    pub fn positional(&self) -> Option<&[Value]> {
        match self {
            Parameters::Positional(v) => Some(v),
            Parameters::Named(_) => None,
        }
    }

    /// Look up a named value (`key` with or without `:`).
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Parameters::Named(pairs) => {
                let key = normalize_key(key);
                pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
            }
            Parameters::Positional(_) => None,
        }
    }

    /// Values in bind order, ignoring names.
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Parameters::Positional(v) => v.iter().collect(),
            Parameters::Named(pairs) => pairs.iter().map(|(_, v)| v).collect(),
        }
    }
}

/// Ensure a named key carries the leading `:`.
pub(crate) fn normalize_key(key: &str) -> String {
    if key.starts_with(':') {
        key.to_string()
    } else {
        format!(":{key}")
    }
}

/// Collects bound values while enforcing a single placeholder style.
#[derive(Debug, Clone, Default)]
pub struct ParamTracker {
    style: Option<ParamStyle>,
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl ParamTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Style claimed by the first bound value, if any.
    pub fn style(&self) -> Option<ParamStyle> {
        self.style
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn claim(&mut self, style: ParamStyle) -> FluentResult<()> {
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

    /// Append a positional value.
    pub fn add(&mut self, value: Value) -> FluentResult<()> {
        self.claim(ParamStyle::Positional)?;
        self.positional.push(value);
        Ok(())
    }

    /// Bind a named value. A repeated key overwrites the earlier value in place.
    pub fn add_named(&mut self, key: &str, value: Value) -> FluentResult<()> {
        self.claim(ParamStyle::Named)?;
        let key = normalize_key(key);
        match self.named.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.named.push((key, value)),
        }
        Ok(())
    }

    /// Add every value of a parameter set.
    pub fn add_many(&mut self, params: Parameters) -> FluentResult<()> {
        match params {
            Parameters::Positional(values) => {
                for value in values {
                    self.add(value)?;
                }
            }
            Parameters::Named(pairs) => {
                for (key, value) in pairs {
                    self.add_named(&key, value)?;
                }
            }
        }
        Ok(())
    }

    /// Append another tracker's values after this one's.
    pub fn merge(&mut self, other: &ParamTracker) -> FluentResult<()> {
        for value in &other.positional {
            self.add(value.clone())?;
        }
        for (key, value) in &other.named {
            self.add_named(key, value.clone())?;
        }
        Ok(())
    }

    /// Forget all values and the claimed style.
    pub fn reset(&mut self) {
        self.style = None;
        self.positional.clear();
        self.named.clear();
    }

    /// Current values; an empty tracker yields an empty positional set.
    pub fn snapshot(&self) -> Parameters {
        match self.style {
            Some(ParamStyle::Named) => Parameters::Named(self.named.clone()),
            _ => Parameters::Positional(self.positional.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_then_named_is_rejected() {
        let mut tracker = ParamTracker::new();
        tracker.add(Value::Int(1)).unwrap();
        let err = tracker.add_named("id", Value::Int(2)).unwrap_err();
        assert!(matches!(err, FluentError::AmbiguousParameterStyle(_)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn named_keys_are_prefixed_and_last_write_wins() {
        let mut tracker = ParamTracker::new();
        tracker.add_named("type", Value::from("author")).unwrap();
        tracker.add_named(":id", Value::from(1)).unwrap();
        tracker.add_named(":type", Value::from("admin")).unwrap();
        assert_eq!(
            tracker.snapshot(),
            Parameters::Named(vec![
                (":type".to_string(), Value::from("admin")),
                (":id".to_string(), Value::from(1)),
            ])
        );
    }

    #[test]
    fn reset_releases_style() {
        let mut tracker = ParamTracker::new();
        tracker.add_named(":id", Value::Int(1)).unwrap();
        tracker.reset();
        assert!(tracker.is_empty());
        assert_eq!(tracker.style(), None);
        tracker.add(Value::Int(2)).unwrap();
        assert_eq!(tracker.snapshot(), Parameters::Positional(vec![Value::Int(2)]));
    }

    #[test]
    fn merge_keeps_order() {
        let mut a = ParamTracker::new();
        a.add(Value::Int(1)).unwrap();
        let mut b = ParamTracker::new();
        b.add(Value::Int(2)).unwrap();
        b.add(Value::Int(3)).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(
            a.snapshot().positional().unwrap(),
            &[Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn empty_snapshot_is_positional() {
        let params = ParamTracker::new().snapshot();
        assert!(params.is_empty());
        assert_eq!(params.style(), None);
        assert_eq!(params, Parameters::default());
    }
}
