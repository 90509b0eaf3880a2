//! Bracketed predicates: `[child]`, `[@attr]`, `[@attr='value']`, joined by `|`.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::axis::{NameTest, element_children};
use crate::compare::RELATIONAL;
use crate::error::{Error, Result, SyntaxErrorKind};
use crate::model::TreeNode;
use crate::nodeset::NodeSet;
use crate::tokenizer::{Cursor, Name, unquote};

/// One `|`-separated condition of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The node has an element child with this name.
    Child(NameTest),
    /// The node has this attribute, with exactly `value` when one is given.
    Attribute { name: NameTest, value: Option<CompactString> },
}

pub type Conditions = SmallVec<[Condition; 4]>;

impl Condition {
    pub fn holds<N: TreeNode>(&self, node: &N) -> bool {
        match self {
            Condition::Child(test) => element_children(node).any(|c| test.matches(c.name())),
            Condition::Attribute { name, value } => node.attributes().any(|a| {
                name.matches(a.name()) && value.as_deref().is_none_or(|v| a.value() == Some(v))
            }),
        }
    }
}

/// Keeps the nodes satisfying at least one condition, in their original order.
pub fn filter<N: TreeNode>(set: &NodeSet<N>, conditions: &[Condition]) -> NodeSet<N> {
    let mut out: NodeSet<N> = set
        .iter()
        .filter(|n| conditions.iter().any(|c| c.holds(*n)))
        .cloned()
        .collect();
    out.dedup();
    out
}

/// Parses a predicate body. The cursor must sit just after the opening `[`; on
/// success it is left just after the closing `]`.
pub fn parse(cursor: &mut Cursor<'_>) -> Result<Conditions> {
    let open_at = cursor.offset().saturating_sub(1);
    let body_start = cursor.offset();
    let mut quote: Option<(char, usize)> = None;
    let body_end = loop {
        let at = cursor.offset();
        let Some(c) = cursor.bump() else {
            return Err(match quote {
                Some((_, quote_at)) => Error::syntax(SyntaxErrorKind::UnterminatedQuote, quote_at),
                None => Error::syntax(SyntaxErrorKind::UnclosedBracket, open_at),
            });
        };
        match quote {
            Some((q, _)) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some((c, at)),
                ']' => break at,
                '[' => return Err(Error::syntax(SyntaxErrorKind::NestedBracket, at)),
                '(' | ')' => return Err(Error::syntax(SyntaxErrorKind::FunctionCall, at)),
                _ => {}
            },
        }
    };

    let body = &cursor.query()[body_start..body_end];
    let mut conditions = Conditions::new();
    for (offset, part) in split_unquoted(body, '|') {
        conditions.push(parse_condition(part, body_start + offset)?);
    }
    Ok(conditions)
}

fn parse_condition(text: &str, offset: usize) -> Result<Condition> {
    let leading = text.len() - text.trim_start().len();
    let text = text.trim();
    let offset = offset + leading;
    if text.is_empty() {
        return Err(Error::syntax(SyntaxErrorKind::EmptyPredicate, offset));
    }
    if let Some(at) = find_unsupported_operator(text) {
        return Err(Error::syntax(SyntaxErrorKind::UnsupportedOperator, offset + at));
    }

    let Some(attr) = text.strip_prefix('@') else {
        if let Some(eq) = find_unquoted(text, '=') {
            return Err(Error::syntax(SyntaxErrorKind::UnexpectedChar('='), offset + eq));
        }
        return Ok(Condition::Child(NameTest::from_token(&single_token(text, offset)?)));
    };

    let (name, value) = match find_unquoted(attr, '=') {
        Some(eq) => {
            let value = &attr[eq + 1..];
            if value.trim().is_empty() {
                return Err(Error::syntax(SyntaxErrorKind::MissingOperand, offset + 1 + eq));
            }
            let token = single_token(value, offset + 2 + eq)?;
            (&attr[..eq], Some(CompactString::from(unquote(&token))))
        }
        None => (attr, None),
    };
    if name.trim().is_empty() {
        return Err(Error::syntax(SyntaxErrorKind::MissingAttributeName, offset));
    }
    Ok(Condition::Attribute { name: NameTest::from_token(&single_token(name, offset + 1)?), value })
}

/// Reads `text` as exactly one name token. `offset` is where `text` starts in the
/// query, so errors point into the query.
fn single_token(text: &str, offset: usize) -> Result<Name> {
    let mut cursor = Cursor::new(text);
    let token = cursor
        .next_name()
        .map_err(|e| Error::syntax(e.kind(), offset + e.offset()))?;
    cursor.skip_whitespace();
    match (token, cursor.peek()) {
        (Some(token), None) => Ok(token),
        (_, Some(c)) => Err(Error::syntax(SyntaxErrorKind::UnexpectedChar(c), offset + cursor.offset())),
        (None, None) => Err(Error::syntax(SyntaxErrorKind::EmptyPredicate, offset)),
    }
}

/// Offset of the first unquoted `!=` or relational operator; only `=` is allowed
/// inside a predicate.
fn find_unsupported_operator(text: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None => {
                let rest = &text[i..];
                if rest.starts_with("!=") || RELATIONAL.iter().any(|op| rest.starts_with(op)) {
                    return Some(i);
                }
            }
        }
    }
    None
}

/// Splits on `sep` outside quotes, yielding each part with its byte offset.
fn split_unquoted(text: &str, sep: char) -> SmallVec<[(usize, &str); 4]> {
    let mut parts = SmallVec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == sep => {
                parts.push((start, &text[start..i]));
                start = i + c.len_utf8();
            }
            None => {}
        }
    }
    parts.push((start, &text[start..]));
    parts
}

fn find_unquoted(text: &str, target: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == target => return Some(i),
            None => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(body: &str) -> Result<Conditions> {
        let query = format!("[{body}");
        let mut cursor = Cursor::new(&query);
        cursor.bump();
        parse(&mut cursor)
    }

    #[test]
    fn parses_mixed_alternatives() {
        let conditions = parse_str("titi | @a = \"x|y\" | @*]").unwrap();
        assert_eq!(
            conditions.as_slice(),
            &[
                Condition::Child(NameTest::Name("titi".into())),
                Condition::Attribute { name: NameTest::Name("a".into()), value: Some("x|y".into()) },
                Condition::Attribute { name: NameTest::Any, value: None },
            ]
        );
    }

    #[test]
    fn quote_may_contain_the_other_quote() {
        let conditions = parse_str("@t='say \"hi\"']").unwrap();
        assert_eq!(
            conditions[0],
            Condition::Attribute { name: NameTest::Name("t".into()), value: Some("say \"hi\"".into()) }
        );
        let conditions = parse_str("@t=\"it's\"]").unwrap();
        assert_eq!(
            conditions[0],
            Condition::Attribute { name: NameTest::Name("t".into()), value: Some("it's".into()) }
        );
    }

    #[test]
    fn cursor_ends_after_closing_bracket() {
        let mut cursor = Cursor::new("[b]/c");
        cursor.bump();
        parse(&mut cursor).unwrap();
        assert_eq!(cursor.rest(), "/c");
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        let kind = |body: &str| parse_str(body).unwrap_err().kind();
        assert_eq!(kind("b"), SyntaxErrorKind::UnclosedBracket);
        assert_eq!(kind("]"), SyntaxErrorKind::EmptyPredicate);
        assert_eq!(kind("a||b]"), SyntaxErrorKind::EmptyPredicate);
        assert_eq!(kind("a[b]]"), SyntaxErrorKind::NestedBracket);
        assert_eq!(kind("@a='x]"), SyntaxErrorKind::UnterminatedQuote);
        assert_eq!(kind("last()]"), SyntaxErrorKind::FunctionCall);
        assert_eq!(kind("@=x]"), SyntaxErrorKind::MissingAttributeName);
        assert_eq!(kind("@a=]"), SyntaxErrorKind::MissingOperand);
        assert_eq!(kind("a='x']"), SyntaxErrorKind::UnexpectedChar('='));
    }

    #[test]
    fn error_offsets_point_into_the_query() {
        // "[a | ]": the empty alternative is reported where its text would start,
        // after the blank, at the closing bracket
        let err = parse_str("a | ]").unwrap_err();
        assert_eq!(err.offset(), 5);

        // "[a | x/y]": the stray '/' sits at byte 6
        let err = parse_str("a | x/y]").unwrap_err();
        assert_eq!(err.kind(), SyntaxErrorKind::UnexpectedChar('/'));
        assert_eq!(err.offset(), 6);
    }

    #[test]
    fn conditions_are_single_tokens() {
        let kind = |body: &str| parse_str(body).unwrap_err().kind();
        assert_eq!(kind("x y]"), SyntaxErrorKind::UnexpectedChar('y'));
        assert_eq!(kind("@k!='1']"), SyntaxErrorKind::UnsupportedOperator);
        assert_eq!(kind("@k<2]"), SyntaxErrorKind::UnsupportedOperator);
        assert_eq!(kind("@k &gt; 2]"), SyntaxErrorKind::UnsupportedOperator);
        assert_eq!(kind("@k='1'x]"), SyntaxErrorKind::UnexpectedChar('x'));
        assert_eq!(kind("@k=a b]"), SyntaxErrorKind::UnexpectedChar('b'));

        let conditions = parse_str("@k='a<b' | 'odd name']").unwrap();
        assert_eq!(
            conditions.as_slice(),
            &[
                Condition::Attribute { name: NameTest::Name("k".into()), value: Some("a<b".into()) },
                Condition::Child(NameTest::Name("odd name".into())),
            ]
        );
    }
}
