//! Turning predicate/assignment calls into clause fragments.

use crate::clause::Fragment;
use crate::error::{FluentError, FluentResult};
use crate::lexer::{Placeholders, Token, placeholders, tokenize};
use crate::params::{ParamTracker, normalize_key};
use crate::value::{Arg, Args, Literal, Value};

/// Build a WHERE/HAVING/JOIN fragment.
///
/// Text without placeholders plus a single argument is column shorthand:
/// `col = ?`, `col IS NULL`, `col IN (1, 2)`, `FALSE` for an empty list,
/// `col = <literal>`.
pub(crate) fn condition(text: &str, args: Args) -> FluentResult<Fragment> {
    let text = text.trim();
    let found = placeholders(text);
    if found.positional > 0 && !found.named.is_empty() {
        return Err(FluentError::AmbiguousParameterStyle(format!(
            "'{text}' mixes ? and :name placeholders"
        )));
    }
    match args {
        Args::Named(pairs) => named(text, &found, pairs),
        Args::Positional(args) if found.is_empty() => shorthand(text, args),
        Args::Positional(args) => template(text, &found, args),
    }
}

fn named(text: &str, found: &Placeholders, pairs: Vec<(String, Value)>) -> FluentResult<Fragment> {
    if found.positional > 0 {
        return Err(FluentError::AmbiguousParameterStyle(format!(
            "'{text}' uses ? placeholders but named arguments were given"
        )));
    }
    let keys: Vec<String> = pairs.iter().map(|(key, _)| normalize_key(key)).collect();
    if let Some(missing) = found.named.iter().find(|name| !keys.contains(name)) {
        return Err(FluentError::configuration(format!(
            "'{text}' has no value bound for {missing}"
        )));
    }
    if let Some(extra) = keys.iter().find(|key| !found.named.contains(key)) {
        return Err(FluentError::configuration(format!(
            "'{text}' has no {extra} placeholder for the bound value"
        )));
    }
    let mut tracker = ParamTracker::new();
    for (key, value) in pairs {
        tracker.add_named(&key, value)?;
    }
    Ok(Fragment::new(text, tracker))
}

fn shorthand(column: &str, mut args: Vec<Arg>) -> FluentResult<Fragment> {
    if args.len() > 1 {
        return Err(FluentError::configuration(format!(
            "'{column}' has no placeholder but {} arguments were given",
            args.len()
        )));
    }
    let Some(arg) = args.pop() else {
        return Ok(Fragment::raw(column));
    };
    let fragment = match arg {
        Arg::Value(Value::Null) => Fragment::raw(format!("{column} IS NULL")),
        Arg::Value(value) => {
            let mut tracker = ParamTracker::new();
            tracker.add(value)?;
            Fragment::new(format!("{column} = ?"), tracker)
        }
        Arg::Literal(literal) => Fragment::raw(format!("{column} = {literal}")),
        Arg::List(values) if values.is_empty() => Fragment::raw("FALSE"),
        Arg::List(values) => Fragment::raw(format!("{column} IN ({})", inline_list(&values))),
    };
    Ok(fragment)
}

enum Slot {
    Bound(Value),
    Inline(Literal),
}

fn template(text: &str, found: &Placeholders, args: Vec<Arg>) -> FluentResult<Fragment> {
    if !found.named.is_empty() {
        if args.is_empty() {
            return Err(FluentError::configuration(format!(
                "'{text}' has :name placeholders but no arguments were given"
            )));
        }
        return Err(FluentError::AmbiguousParameterStyle(format!(
            "'{text}' uses :name placeholders but positional arguments were given"
        )));
    }

    let mut slots = Vec::with_capacity(found.positional);
    for arg in args {
        match arg {
            Arg::Value(value) => slots.push(Slot::Bound(value)),
            Arg::Literal(literal) => slots.push(Slot::Inline(literal)),
            Arg::List(values) => slots.extend(values.into_iter().map(Slot::Bound)),
        }
    }
    if slots.len() != found.positional {
        return Err(FluentError::configuration(format!(
            "'{text}' has {} placeholders but {} arguments were given",
            found.positional,
            slots.len()
        )));
    }

    let mut tracker = ParamTracker::new();
    let mut slots = slots.into_iter();
    let mut out = String::with_capacity(text.len());
    for token in tokenize(text) {
        match token {
            Token::Positional => match slots.next() {
                Some(Slot::Bound(value)) => {
                    tracker.add(value)?;
                    out.push('?');
                }
                Some(Slot::Inline(literal)) => out.push_str(literal.as_str()),
                None => out.push('?'),
            },
            Token::Text(t) | Token::Named(t) => out.push_str(t),
            Token::Relation(r) => out.push_str(&r.raw),
        }
    }
    Ok(Fragment::new(out, tracker))
}

/// Text that binds only through its own placeholders (SELECT expressions,
/// explicit JOIN conditions). No column shorthand.
pub(crate) fn bound_text(text: &str, args: Args) -> FluentResult<Fragment> {
    if placeholders(text).is_empty() {
        if !args.is_empty() {
            return Err(FluentError::configuration(format!(
                "'{}' has no placeholder for the given arguments",
                text.trim()
            )));
        }
        return Ok(Fragment::raw(text.trim()));
    }
    condition(text, args)
}

/// `col = ?` / `col = <literal>` for SET-like clauses.
pub(crate) fn assignment(column: &str, arg: Arg) -> FluentResult<Fragment> {
    let column = column.trim();
    match arg {
        Arg::Value(value) => {
            let mut tracker = ParamTracker::new();
            tracker.add(value)?;
            Ok(Fragment::new(format!("{column} = ?"), tracker))
        }
        Arg::Literal(literal) => Ok(Fragment::raw(format!("{column} = {literal}"))),
        Arg::List(_) => Err(FluentError::configuration(format!(
            "cannot assign a list to '{column}'"
        ))),
    }
}

fn inline_list(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_sql_literal)
        .collect::<Vec<_>>()
        .join(", ")
}
