//! Step tokenizer: a read-only cursor over the query text.

use compact_str::CompactString;

use crate::error::{Error, Result, SyntaxErrorKind};

/// A name token copied out of the query. Quoted spans keep their quotes.
pub type Name = CompactString;

/// Characters that end a name token (outside quotes).
pub fn is_delimiter(c: char) -> bool {
    matches!(c, '<' | '>' | '/' | '?' | '!' | '[' | ']' | '|' | '=') || c.is_whitespace()
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

#[derive(Debug, Clone)]
pub struct Cursor<'q> {
    query: &'q str,
    pos: usize,
}

impl<'q> Cursor<'q> {
    pub fn new(query: &'q str) -> Self {
        Self { query, pos: 0 }
    }

    /// Byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn query(&self) -> &'q str {
        self.query
    }

    pub fn rest(&self) -> &'q str {
        &self.query[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.query.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes `prefix` if the remaining text starts with it.
    pub fn eat(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Extracts the next name token.
    ///
    /// Leading whitespace is skipped, then characters are copied up to the next
    /// delimiter. A quote opens a span copied verbatim (delimiters included) up to and
    /// including the matching closing quote. On success the cursor moves past the
    /// token and any trailing whitespace.
    ///
    /// Returns `Ok(None)` with the cursor unmoved when nothing can be extracted: the
    /// text starts with a delimiter or ends, or the token contains an unquoted
    /// parenthesis (function-call syntax is not supported). An unterminated quote is
    /// a syntax error, and so is text directly after a closing quote (`'a'b`).
    pub fn next_name(&mut self) -> Result<Option<Name>> {
        let start = self.pos;
        self.skip_whitespace();
        let mut name = Name::default();
        while let Some(c) = self.peek() {
            if is_delimiter(c) {
                break;
            }
            if c == '(' || c == ')' {
                self.pos = start;
                return Ok(None);
            }
            let opened_at = self.pos;
            self.bump();
            name.push(c);
            if is_quote(c) {
                loop {
                    match self.bump() {
                        Some(q) if q == c => {
                            name.push(q);
                            // a closed quote must end the token; parentheses are left
                            // to the function-call check
                            if let Some(next) = self.peek().filter(|&n| !is_delimiter(n) && n != '(' && n != ')') {
                                return Err(Error::syntax(SyntaxErrorKind::UnexpectedChar(next), self.pos));
                            }
                            break;
                        }
                        Some(other) => name.push(other),
                        None => {
                            return Err(Error::syntax(SyntaxErrorKind::UnterminatedQuote, opened_at));
                        }
                    }
                }
            }
        }
        if name.is_empty() {
            self.pos = start;
            return Ok(None);
        }
        self.skip_whitespace();
        Ok(Some(name))
    }

    /// Whether the next token (after whitespace) contains an unquoted parenthesis.
    pub fn faces_function_call(&self) -> bool {
        let mut quote: Option<char> = None;
        for c in self.rest().trim_start().chars() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '(' || c == ')' => return true,
                None if is_quote(c) => quote = Some(c),
                None if is_delimiter(c) => return false,
                None => {}
            }
        }
        false
    }
}

/// Strips one pair of matching surrounding quotes, if present.
pub fn unquote(literal: &str) -> &str {
    let mut chars = literal.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if is_quote(open) && open == close => &literal[1..literal.len() - 1],
        _ => literal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_delimiters_and_skips_trailing_space() {
        let mut c = Cursor::new("  foo  /bar");
        assert_eq!(c.next_name().unwrap().as_deref(), Some("foo"));
        assert_eq!(c.rest(), "/bar");
    }

    #[test]
    fn quoted_span_keeps_delimiters_verbatim() {
        let mut c = Cursor::new("'a/b[c]|d' rest");
        assert_eq!(c.next_name().unwrap().as_deref(), Some("'a/b[c]|d'"));
        assert_eq!(c.rest(), "rest");

        let mut c = Cursor::new("\"it's\"]");
        assert_eq!(c.next_name().unwrap().as_deref(), Some("\"it's\""));
        assert_eq!(c.rest(), "]");
    }

    #[test]
    fn parenthesis_fails_closed_without_moving() {
        let mut c = Cursor::new("  text()");
        assert_eq!(c.next_name().unwrap(), None);
        assert_eq!(c.offset(), 0);
        assert!(c.faces_function_call());

        let mut c = Cursor::new("(x)");
        assert_eq!(c.next_name().unwrap(), None);
        assert_eq!(c.offset(), 0);
    }

    #[test]
    fn quoted_parenthesis_is_not_a_function_call() {
        let mut c = Cursor::new("'f(x)'");
        assert!(!c.faces_function_call());
        assert_eq!(c.next_name().unwrap().as_deref(), Some("'f(x)'"));
    }

    #[test]
    fn empty_token_returns_none() {
        let mut c = Cursor::new("   ");
        assert_eq!(c.next_name().unwrap(), None);
        let mut c = Cursor::new("=x");
        assert_eq!(c.next_name().unwrap(), None);
        assert!(!c.faces_function_call());
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let mut c = Cursor::new("ab'cd");
        let err = c.next_name().unwrap_err();
        assert_eq!(err.kind(), SyntaxErrorKind::UnterminatedQuote);
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn closing_quote_must_end_the_token() {
        let mut c = Cursor::new("  '1'y");
        let err = c.next_name().unwrap_err();
        assert_eq!(err.kind(), SyntaxErrorKind::UnexpectedChar('y'));
        assert_eq!(err.offset(), 5);

        let mut c = Cursor::new("'1'/y");
        assert_eq!(c.next_name().unwrap().as_deref(), Some("'1'"));
        assert_eq!(c.rest(), "/y");
    }

    #[test]
    fn unquote_strips_matching_pair_only() {
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("\"x\""), "x");
        assert_eq!(unquote("''"), "");
        assert_eq!(unquote("'x\""), "'x\"");
        assert_eq!(unquote("'"), "'");
        assert_eq!(unquote("x"), "x");
    }
}
