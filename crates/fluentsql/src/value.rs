//! Bind values, the [`Literal`] marker, and argument shapes accepted by predicates.
//!
//! Every predicate-accepting method takes `impl IntoArgs`. The shape of the
//! argument decides how the fragment is bound:
//!
//! - `()` binds nothing
//! - a scalar (`i64`, `&str`, `Option<T>`, [`Value`], ...) binds one value
//! - a tuple binds one value per element, in order
//! - a `Vec`/array/slice is a list: it fills consecutive `?` placeholders, or
//!   expands to `IN (...)` when the condition is a bare column
//! - [`named`] / [`NamedArgs`] bind `:name` placeholders
//! - a [`Literal`] is emitted verbatim and never bound

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A value that can be bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view of the value (text that parses as an integer is accepted).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float view of the value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String view of the value, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as a SQL literal for debugging output.
    ///
    /// Strings are single-quoted with `'` doubled, numerics are bare.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) if v.is_finite() => v.to_string(),
            Value::Float(_) => "NULL".to_string(),
            Value::Text(s) => quote_str(s),
            Value::Blob(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2 + 3);
                out.push_str("X'");
                for b in bytes {
                    use std::fmt::Write;
                    let _ = write!(&mut out, "{b:02X}");
                }
                out.push('\'');
                out
            }
            Value::DateTime(dt) => quote_str(&dt.format(DATETIME_FORMAT).to_string()),
        }
    }

    /// Convert to a `serde_json::Value` (used for typed row mapping).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Blob(bytes) => {
                serde_json::Value::Array(bytes.iter().map(|b| (*b).into()).collect())
            }
            Value::DateTime(dt) => serde_json::Value::String(dt.format(DATETIME_FORMAT).to_string()),
        }
    }
}

fn quote_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            other => f.write_str(&other.to_sql_literal()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(<$cast>::from(v))
                }
            }
        )*
    };
}

value_from! {
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => Int as i64,
    u16 => Int as i64,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float as f64,
    String => Text as String,
    Vec<u8> => Blob as Vec<u8>,
    NaiveDateTime => DateTime as NaiveDateTime,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Text(v.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// SQL text emitted verbatim in place of a placeholder.
///
/// ```ignore
/// fluent.update("article").set("published_at", Literal::new("NOW()"));
/// // UPDATE article SET published_at = NOW()
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal(String);

impl Literal {
    pub fn new(sql: impl Into<String>) -> Self {
        Literal(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single predicate/assignment argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Bound as a parameter
    Value(Value),
    /// Emitted verbatim
    Literal(Literal),
    /// A sequence of values
    List(Vec<Value>),
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<Literal> for Arg {
    fn from(v: Literal) -> Self {
        Arg::Literal(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Arg::Value(Value::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Arg {
    fn from(v: Vec<T>) -> Self {
        Arg::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Arg {
    fn from(v: [T; N]) -> Self {
        Arg::List(v.into_iter().map(Into::into).collect())
    }
}

/// Argument list handed to a predicate call.
#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    Positional(Vec<Arg>),
    Named(Vec<(String, Value)>),
}

impl Args {
    /// No arguments.
    pub fn none() -> Self {
        Args::Positional(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Args::Positional(args) => args.is_empty(),
            Args::Named(pairs) => pairs.is_empty(),
        }
    }
}

/// Conversion into predicate arguments.
pub trait IntoArgs {
    fn into_args(self) -> Args;
}

impl IntoArgs for Args {
    fn into_args(self) -> Args {
        self
    }
}

impl IntoArgs for () {
    fn into_args(self) -> Args {
        Args::none()
    }
}

impl IntoArgs for Arg {
    fn into_args(self) -> Args {
        Args::Positional(vec![self])
    }
}

macro_rules! scalar_args {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Arg::Value(Value::from(v))
                }
            }

            impl IntoArgs for $ty {
                fn into_args(self) -> Args {
                    Args::Positional(vec![Arg::from(self)])
                }
            }
        )*
    };
}

scalar_args!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    String,
    &String,
    &str,
    NaiveDate,
    NaiveDateTime,
);

impl IntoArgs for Value {
    fn into_args(self) -> Args {
        Args::Positional(vec![Arg::Value(self)])
    }
}

impl IntoArgs for Literal {
    fn into_args(self) -> Args {
        Args::Positional(vec![Arg::Literal(self)])
    }
}

impl<T: Into<Value>> IntoArgs for Option<T> {
    fn into_args(self) -> Args {
        Args::Positional(vec![Arg::from(self)])
    }
}

impl<T: Into<Value>> IntoArgs for Vec<T> {
    fn into_args(self) -> Args {
        Args::Positional(vec![Arg::from(self)])
    }
}

impl<T: Into<Value>, const N: usize> IntoArgs for [T; N] {
    fn into_args(self) -> Args {
        Args::Positional(vec![Arg::from(self)])
    }
}

impl<T: Into<Value> + Clone> IntoArgs for &[T] {
    fn into_args(self) -> Args {
        Args::Positional(vec![Arg::List(
            self.iter().cloned().map(Into::into).collect(),
        )])
    }
}

macro_rules! tuple_args {
    ($($name:ident),+) => {
        impl<$($name: Into<Arg>),+> IntoArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> Args {
                let ($($name,)+) = self;
                Args::Positional(vec![$($name.into()),+])
            }
        }
    };
}

tuple_args!(A, B);
tuple_args!(A, B, C);
tuple_args!(A, B, C, D);
tuple_args!(A, B, C, D, E);

/// Named (`:name`) arguments, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedArgs(Vec<(String, Value)>);

impl NamedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` (with or without the leading `:`).
    pub fn bind(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }
}

impl IntoArgs for NamedArgs {
    fn into_args(self) -> Args {
        Args::Named(self.0)
    }
}

/// Build [`NamedArgs`] from homogeneous pairs.
///
/// For mixed value types chain [`NamedArgs::bind`] instead.
pub fn named<I, K, V>(pairs: I) -> NamedArgs
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    NamedArgs(
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    )
}

/// Ordered `column -> argument` pairs used by `where_all`, `set_all`,
/// `values` and `on_duplicate_key_update`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pairs(Vec<(String, Arg)>);

impl Pairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.0.push((column.into(), value.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_vec(self) -> Vec<(String, Arg)> {
        self.0
    }
}

/// Conversion into [`Pairs`].
pub trait IntoPairs {
    fn into_pairs(self) -> Pairs;
}

impl IntoPairs for Pairs {
    fn into_pairs(self) -> Pairs {
        self
    }
}

impl<K: Into<String>, V: Into<Arg>> IntoPairs for Vec<(K, V)> {
    fn into_pairs(self) -> Pairs {
        Pairs(self.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Arg>, const N: usize> IntoPairs for [(K, V); N] {
    fn into_pairs(self) -> Pairs {
        Pairs(self.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_rendering_quotes_strings_only() {
        assert_eq!(Value::from(42).to_sql_literal(), "42");
        assert_eq!(Value::from(1.5).to_sql_literal(), "1.5");
        assert_eq!(Value::from("O'Brien").to_sql_literal(), "'O''Brien'");
        assert_eq!(Value::Null.to_sql_literal(), "NULL");
        assert_eq!(Value::from(true).to_sql_literal(), "TRUE");
        assert_eq!(Value::Blob(vec![0xde, 0xad]).to_sql_literal(), "X'DEAD'");
    }

    #[test]
    fn option_none_becomes_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn argument_shapes() {
        assert_eq!(
            5i64.into_args(),
            Args::Positional(vec![Arg::Value(Value::Int(5))])
        );
        assert_eq!(
            vec![1, 2].into_args(),
            Args::Positional(vec![Arg::List(vec![Value::Int(1), Value::Int(2)])])
        );
        assert_eq!(
            (1, "a", Literal::new("NOW()")).into_args(),
            Args::Positional(vec![
                Arg::Value(Value::Int(1)),
                Arg::Value(Value::Text("a".into())),
                Arg::Literal(Literal::new("NOW()")),
            ])
        );
        assert!(().into_args().is_empty());
    }

    #[test]
    fn named_builders_keep_order() {
        let args = NamedArgs::new().bind(":id", 1).bind("name", "Marek").into_args();
        assert_eq!(
            args,
            Args::Named(vec![
                (":id".to_string(), Value::Int(1)),
                ("name".to_string(), Value::Text("Marek".into())),
            ])
        );
        let args = named([(":a", 1), (":b", 2)]).into_args();
        assert!(matches!(args, Args::Named(ref v) if v.len() == 2));
    }

    #[test]
    fn pairs_accept_mixed_arguments() {
        let pairs = Pairs::new()
            .with("user_id", 1)
            .with("published_at", Literal::new("NOW()"))
            .with("title", "new title");
        let columns: Vec<&str> = pairs.iter().map(|(k, _)| k).collect();
        assert_eq!(columns, vec!["user_id", "published_at", "title"]);
        assert_eq!([("id", 2), ("type", 3)].into_pairs().len(), 2);
    }
}
