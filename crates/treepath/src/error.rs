use core::fmt;

/// What made a query malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// `[` without a matching `]`.
    UnclosedBracket,
    /// `]` outside of a predicate.
    UnbalancedBracket,
    /// `[` inside a predicate body.
    NestedBracket,
    /// `[]` or an empty `|` alternative inside brackets.
    EmptyPredicate,
    UnterminatedQuote,
    /// Parenthesized function syntax such as `text()` or `position()`.
    FunctionCall,
    /// `@` not followed by a name.
    MissingAttributeName,
    /// `=` / `!=` not followed by an operand.
    MissingOperand,
    /// `|` not followed by a name.
    MissingName,
    /// Relational comparison (`<`, `>`, `<=`, `>=`, `&lt;`, `&gt;`).
    UnsupportedOperator,
    UnexpectedChar(char),
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::UnclosedBracket => f.write_str("unclosed '['"),
            SyntaxErrorKind::UnbalancedBracket => f.write_str("']' without matching '['"),
            SyntaxErrorKind::NestedBracket => f.write_str("nested '[' inside predicate"),
            SyntaxErrorKind::EmptyPredicate => f.write_str("empty predicate condition"),
            SyntaxErrorKind::UnterminatedQuote => f.write_str("unterminated quoted literal"),
            SyntaxErrorKind::FunctionCall => f.write_str("function calls are not supported"),
            SyntaxErrorKind::MissingAttributeName => f.write_str("expected attribute name after '@'"),
            SyntaxErrorKind::MissingOperand => f.write_str("comparison operator without operand"),
            SyntaxErrorKind::MissingName => f.write_str("expected name after '|'"),
            SyntaxErrorKind::UnsupportedOperator => f.write_str("relational comparisons are not supported"),
            SyntaxErrorKind::UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed query. `offset` is the byte offset into the query where the
    /// problem was detected.
    #[error("syntax error at offset {offset}: {kind}")]
    Syntax { kind: SyntaxErrorKind, offset: usize },
}

impl Error {
    pub fn syntax(kind: SyntaxErrorKind, offset: usize) -> Self {
        Error::Syntax { kind, offset }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }

    pub fn kind(&self) -> SyntaxErrorKind {
        match self {
            Error::Syntax { kind, .. } => *kind,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            Error::Syntax { offset, .. } => *offset,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
