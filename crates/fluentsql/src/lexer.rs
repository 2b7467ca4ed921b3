//! Clause text lexer.
//!
//! Splits raw clause text into plain text, placeholders and relation tokens
//! (`user.name`, `article:title`, `comment:user.country.name`, `` `t`.`c` ``).
//! String literals and numbers are passed through as text so that a dotted
//! value like `'a.b'` or `1.5` is never taken for a table path.

/// Separator following a table segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `.`: the previous table holds the foreign key
    Forward,
    /// `:`: the named table holds the foreign key referencing the previous one
    Backward,
}

/// One table segment of a relation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Unquoted name
    pub name: String,
    /// Source spelling, quotes included
    pub raw: String,
    /// Separator that followed the segment
    pub sep: Separator,
}

/// A table path found in clause text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationToken {
    pub raw: String,
    /// Never empty.
    pub segments: Vec<Segment>,
    /// Trailing column as written, `None` for a bare path like `article:`.
    pub column: Option<String>,
}

/// Lexed piece of clause text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Relation(RelationToken),
    /// `?`
    Positional,
    /// `:name`, colon included
    Named(&'a str),
}

/// Placeholders found in a piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    pub positional: usize,
    pub named: Vec<String>,
}

impl Placeholders {
    pub fn is_empty(&self) -> bool {
        self.positional == 0 && self.named.is_empty()
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Part of a word when preceding another byte: blocks token starts mid-word.
fn is_word_byte(b: u8) -> bool {
    is_ident_continue(b) || b >= 0x80
}

/// Parse one chain element at `pos`; returns its end and unquoted name range.
fn element(bytes: &[u8], pos: usize, after_sep: bool) -> Option<(usize, usize, usize)> {
    let b = *bytes.get(pos)?;
    match b {
        b'`' | b'[' => {
            let close = if b == b'`' { b'`' } else { b']' };
            let end = bytes[pos + 1..].iter().position(|&c| c == close)? + pos + 1;
            if end == pos + 1 {
                return None;
            }
            Some((end + 1, pos + 1, end))
        }
        b'*' => Some((pos + 1, pos, pos + 1)),
        _ if is_ident_start(b) || (after_sep && b.is_ascii_digit()) => {
            let end = bytes[pos..]
                .iter()
                .position(|&c| !is_ident_continue(c))
                .map_or(bytes.len(), |n| pos + n);
            Some((end, pos, end))
        }
        _ => None,
    }
}

fn separator_at(bytes: &[u8], pos: usize) -> Option<Separator> {
    match bytes.get(pos) {
        Some(b'.') => Some(Separator::Forward),
        // `::` is a cast, not a path
        Some(b':') if bytes.get(pos + 1) != Some(&b':') => Some(Separator::Backward),
        _ => None,
    }
}

/// Lex an identifier chain starting at `start`. Returns the end offset and a
/// relation token when the chain has at least one separator.
fn chain(input: &str, start: usize) -> Option<(usize, Option<RelationToken>)> {
    let bytes = input.as_bytes();
    let (mut pos, name_start, name_end) = element(bytes, start, false)?;
    let mut elements: Vec<(String, String)> = vec![(
        input[name_start..name_end].to_string(),
        input[start..pos].to_string(),
    )];
    let mut seps: Vec<Separator> = Vec::new();

    while let Some(sep) = separator_at(bytes, pos) {
        let after = pos + 1;
        seps.push(sep);
        match element(bytes, after, true) {
            Some((end, ns, ne)) => {
                elements.push((input[ns..ne].to_string(), input[after..end].to_string()));
                pos = end;
            }
            None if separator_at(bytes, after).is_some() => {
                // empty segment such as `user..name`; rejected by the resolver
                elements.push((String::new(), String::new()));
                pos = after;
            }
            None => {
                pos = after;
                break;
            }
        }
    }

    if seps.is_empty() {
        return Some((pos, None));
    }

    let column = if elements.len() > seps.len() {
        elements.pop().map(|(_, raw)| raw)
    } else {
        None
    };
    let segments = elements
        .into_iter()
        .zip(seps)
        .map(|((name, raw), sep)| Segment { name, raw, sep })
        .collect();

    Some((
        pos,
        Some(RelationToken {
            raw: input[start..pos].to_string(),
            segments,
            column,
        }),
    ))
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            c if c == quote => {
                if bytes.get(j + 1) == Some(&quote) {
                    j += 2;
                } else {
                    return j + 1;
                }
            }
            _ => j += 1,
        }
    }
    bytes.len()
}

/// Lex clause text into a typed token stream.
pub fn tokenize<'a>(input: &'a str) -> Vec<Token<'a>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    let flush = |tokens: &mut Vec<Token<'a>>, from: usize, to: usize| {
        if to > from {
            tokens.push(Token::Text(&input[from..to]));
        }
    };

    while i < bytes.len() {
        let b = bytes[i];
        let prev_is_word = i > 0 && is_word_byte(bytes[i - 1]);
        match b {
            b'\'' | b'"' => i = skip_string(bytes, i),
            b'?' => {
                flush(&mut tokens, text_start, i);
                tokens.push(Token::Positional);
                i += 1;
                text_start = i;
            }
            b':' if !prev_is_word
                && (i == 0 || bytes[i - 1] != b':')
                && bytes.get(i + 1).is_some_and(|&c| is_ident_start(c)) =>
            {
                let end = bytes[i + 1..]
                    .iter()
                    .position(|&c| !is_ident_continue(c))
                    .map_or(bytes.len(), |n| i + 1 + n);
                flush(&mut tokens, text_start, i);
                tokens.push(Token::Named(&input[i..end]));
                i = end;
                text_start = i;
            }
            b'0'..=b'9' if !prev_is_word => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
            }
            _ if !prev_is_word && (is_ident_start(b) || b == b'`' || b == b'[') => {
                match chain(input, i) {
                    Some((end, Some(token))) => {
                        flush(&mut tokens, text_start, i);
                        tokens.push(Token::Relation(token));
                        i = end;
                        text_start = i;
                    }
                    Some((end, None)) => i = end,
                    None => i += 1,
                }
            }
            _ => i += 1,
        }
    }
    flush(&mut tokens, text_start, bytes.len());
    tokens
}

/// Relation tokens of `input`, in order of appearance.
pub fn relation_tokens(input: &str) -> Vec<RelationToken> {
    tokenize(input)
        .into_iter()
        .filter_map(|t| match t {
            Token::Relation(r) => Some(r),
            _ => None,
        })
        .collect()
}

/// Count `?` and collect `:name` placeholders.
pub fn placeholders(input: &str) -> Placeholders {
    let mut found = Placeholders::default();
    for token in tokenize(input) {
        match token {
            Token::Positional => found.positional += 1,
            Token::Named(name) => found.named.push(name.to_string()),
            _ => {}
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(token: &RelationToken) -> Vec<(&str, char)> {
        token
            .segments
            .iter()
            .map(|s| {
                let sep = match s.sep {
                    Separator::Forward => '.',
                    Separator::Backward => ':',
                };
                (s.name.as_str(), sep)
            })
            .collect()
    }

    #[test]
    fn finds_relation_chains() {
        let tokens = relation_tokens("comment:content <> \"\" AND user.country.id = ?");
        assert_eq!(tokens.len(), 2);
        assert_eq!(names(&tokens[0]), vec![("comment", ':')]);
        assert_eq!(tokens[0].column.as_deref(), Some("content"));
        assert_eq!(names(&tokens[1]), vec![("user", '.'), ("country", '.')]);
        assert_eq!(tokens[1].column.as_deref(), Some("id"));
    }

    #[test]
    fn bare_path_has_no_column() {
        let tokens = relation_tokens("article:");
        assert_eq!(names(&tokens[0]), vec![("article", ':')]);
        assert_eq!(tokens[0].column, None);

        let tokens = relation_tokens("comment:user AS comment_user");
        assert_eq!(names(&tokens[0]), vec![("comment", ':')]);
        assert_eq!(tokens[0].column.as_deref(), Some("user"));
    }

    #[test]
    fn strings_numbers_and_casts_are_text() {
        assert!(relation_tokens("name = 'a.b' OR price > 1.5 OR x::int = 1").is_empty());
        assert!(relation_tokens("title = \"x.y\"").is_empty());
    }

    #[test]
    fn quoted_identifiers_keep_their_spelling() {
        let tokens = relation_tokens("`users`.`active` = ? AND [country].[name] = ?");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].segments[0].name, "users");
        assert_eq!(tokens[0].segments[0].raw, "`users`");
        assert_eq!(tokens[0].column.as_deref(), Some("`active`"));
        assert_eq!(tokens[1].raw, "[country].[name]");
    }

    #[test]
    fn placeholders_are_counted() {
        let found = placeholders("a = ? AND b IN (?, ?) AND c = '?'");
        assert_eq!(found.positional, 3);
        let found = placeholders("type = :type AND id > :id AND x::text = y");
        assert_eq!(found.named, vec![":type", ":id"]);
        assert_eq!(found.positional, 0);
    }

    #[test]
    fn quotes_are_doubled_not_backslash_escaped() {
        let found = placeholders(r"path = 'C:\' AND id = ?");
        assert_eq!(found.positional, 1);
        let found = placeholders("name = 'O''Brien ?' AND id = ?");
        assert_eq!(found.positional, 1);
    }

    #[test]
    fn empty_segment_is_kept_for_the_resolver() {
        let tokens = relation_tokens("user..name");
        assert_eq!(tokens[0].segments.len(), 2);
        assert_eq!(tokens[0].segments[1].name, "");
    }
}
