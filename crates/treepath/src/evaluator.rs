//! Step dispatcher and public entry points.
//!
//! A query is scanned left to right. Each recognized construct consumes some text
//! and turns the current node set into the next one:
//!
//! | text            | step                                          |
//! |-----------------|-----------------------------------------------|
//! | `/` (leading)   | root of every node                            |
//! | `//`            | descendant-or-self (`//a`: descendants named a) |
//! | `/`             | step separator                                |
//! | `..`            | element parent                                |
//! | `.`             | self                                          |
//! | `@a`, `@*`      | attributes                                    |
//! | `a`, `*`, `a\|b` | element children                             |
//! | `[...]`         | predicate filter                              |
//! | `=x`, `!=x`     | comparison (ends evaluation by default)       |
//!
//! ```
//! use treepath::tree::{doc, elem};
//! use treepath::{NodeSet, TreeNode, evaluate};
//!
//! let tree = doc().child(elem("r").child(elem("a")).child(elem("a").attr("k", "v"))).build();
//! let found = evaluate(NodeSet::singleton(tree.document()), "/r/a[@k='v']").unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found.first().unwrap().name(), "a");
//!
//! assert!(evaluate(NodeSet::singleton(tree.document()), "r[a").is_none());
//! ```

use core::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::axis::{self, NameTest, NameTests};
use crate::compare::{self, Comparison};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Step};
use crate::error::{Error, Result, SyntaxErrorKind};
use crate::model::TreeNode;
use crate::nodeset::NodeSet;
use crate::predicate;
use crate::tokenizer::{Cursor, is_delimiter};

/// How a trailing `=` / `!=` comparison treats the current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComparisonMode {
    /// Return the first satisfying node as a singleton and stop; the rest of the
    /// query is not read.
    #[default]
    FirstMatch,
    /// Keep every satisfying node and continue with the rest of the query.
    Filter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalOptions {
    pub comparison: ComparisonMode,
}

/// Reusable query evaluator. Holds configuration only; it is `Send + Sync` and can
/// be shared between threads querying read-only trees.
#[derive(Clone, Default)]
pub struct Evaluator {
    options: EvalOptions,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("options", &self.options)
            .field("diagnostics", &self.sink.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct EvaluatorBuilder {
    evaluator: Evaluator,
}

impl EvaluatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.evaluator.options = options;
        self
    }

    pub fn with_comparison_mode(mut self, mode: ComparisonMode) -> Self {
        self.evaluator.options.comparison = mode;
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.evaluator.sink = Some(sink);
        self
    }

    pub fn build(self) -> Evaluator {
        self.evaluator
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::new()
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// Evaluates `query` starting from `initial`.
    ///
    /// The returned set holds each node at most once. Steps that match nothing
    /// produce an empty set and evaluation carries on with it; only malformed
    /// queries fail, and they fail as a whole.
    pub fn evaluate<N: TreeNode>(&self, initial: NodeSet<N>, query: &str) -> Result<NodeSet<N>> {
        debug!(query, nodes = initial.len(), "evaluating path query");
        let result = self.run(initial, query);
        match &result {
            Ok(set) => debug!(query, matched = set.len(), "path query evaluated"),
            Err(error) => {
                debug!(query, %error, "path query rejected");
                self.report(&Diagnostic::Rejected { error: error.clone() });
            }
        }
        result
    }

    /// Evaluates `query` with `node` as the only starting node.
    pub fn select<N: TreeNode>(&self, node: N, query: &str) -> Result<NodeSet<N>> {
        self.evaluate(NodeSet::singleton(node), query)
    }

    fn report(&self, diagnostic: &Diagnostic) {
        if let Some(sink) = &self.sink {
            sink.report(diagnostic);
        }
    }

    fn run<N: TreeNode>(&self, mut current: NodeSet<N>, query: &str) -> Result<NodeSet<N>> {
        current.dedup();
        let mut cursor = Cursor::new(query);
        let mut at_start = true;
        loop {
            cursor.skip_whitespace();
            if cursor.is_at_end() {
                return Ok(current);
            }
            let offset = cursor.offset();
            let before = current.len();
            let step = match cursor.peek() {
                Some('/') if cursor.starts_with("//") => {
                    cursor.eat("//");
                    cursor.skip_whitespace();
                    if starts_name_step(&cursor) {
                        let tests = name_alternatives(&mut cursor, false)?;
                        current = axis::descendants(&current, &tests);
                        Step::Descendant
                    } else {
                        current = axis::descendant_or_self(&current);
                        Step::DescendantOrSelf
                    }
                }
                Some('/') => {
                    cursor.bump();
                    if !at_start {
                        continue;
                    }
                    current = axis::root(&current);
                    Step::Root
                }
                Some('.') if cursor.starts_with("..") => {
                    cursor.eat("..");
                    current = axis::parent(&current);
                    Step::Parent
                }
                Some('.') if cursor.peek_nth(1).is_none_or(is_delimiter) => {
                    cursor.bump();
                    Step::SelfNode
                }
                Some('@') => {
                    cursor.bump();
                    let tests = name_alternatives(&mut cursor, true)?;
                    current = axis::attributes(&current, &tests);
                    Step::Attribute
                }
                Some('[') => {
                    cursor.bump();
                    let conditions = predicate::parse(&mut cursor)?;
                    current = predicate::filter(&current, &conditions);
                    Step::Predicate
                }
                Some(']') => return Err(Error::syntax(SyntaxErrorKind::UnbalancedBracket, offset)),
                Some('|') => return Err(Error::syntax(SyntaxErrorKind::MissingName, offset)),
                _ if compare::starts_comparison(&cursor) => {
                    let comparison = Comparison::parse(&mut cursor)?;
                    match self.options.comparison {
                        ComparisonMode::FirstMatch => {
                            let found = comparison.first_match(&current);
                            debug!(offset, op = comparison.op.symbol(), matched = !found.is_empty(), "comparison ends evaluation");
                            self.report(&Diagnostic::ShortCircuit { offset, matched: !found.is_empty() });
                            return Ok(found);
                        }
                        ComparisonMode::Filter => {
                            current = comparison.filter(&current);
                            Step::Comparison
                        }
                    }
                }
                _ => {
                    let tests = name_alternatives(&mut cursor, false)?;
                    current = axis::children(&current, &tests);
                    Step::Child
                }
            };
            at_start = false;
            trace!(%step, offset, before, after = current.len(), "step");
            self.report(&Diagnostic::Step { step, offset, before, after: current.len() });
        }
    }
}

/// Whether the text at the cursor is a child name step rather than another construct.
fn starts_name_step(cursor: &Cursor<'_>) -> bool {
    match cursor.peek() {
        None | Some('/' | '.' | '@' | '[' | ']' | '|') => false,
        Some(c) => !is_delimiter(c) && !compare::starts_comparison(cursor),
    }
}

/// Reads `name ('|' name)*`. For attribute steps a later alternative may repeat
/// the leading `@`; child steps reject it.
fn name_alternatives(cursor: &mut Cursor<'_>, attribute: bool) -> Result<NameTests> {
    let mut tests = NameTests::new();
    loop {
        if attribute && !tests.is_empty() {
            cursor.skip_whitespace();
            cursor.eat("@");
        }
        cursor.skip_whitespace();
        let at = cursor.offset();
        let Some(token) = cursor.next_name()? else {
            return Err(missing_name(cursor, attribute, tests.is_empty()));
        };
        // attribute alternatives cannot be mixed into a child step (`a|@b`)
        if !attribute && token.starts_with('@') {
            return Err(Error::syntax(SyntaxErrorKind::UnexpectedChar('@'), at));
        }
        tests.push(NameTest::from_token(&token));
        cursor.skip_whitespace();
        if !cursor.eat("|") {
            return Ok(tests);
        }
    }
}

fn missing_name(cursor: &Cursor<'_>, attribute: bool, first: bool) -> Error {
    let mut probe = cursor.clone();
    probe.skip_whitespace();
    let offset = probe.offset();
    let kind = if cursor.faces_function_call() {
        SyntaxErrorKind::FunctionCall
    } else if !first {
        SyntaxErrorKind::MissingName
    } else if attribute {
        SyntaxErrorKind::MissingAttributeName
    } else {
        match probe.peek() {
            Some(c) => SyntaxErrorKind::UnexpectedChar(c),
            None => SyntaxErrorKind::MissingName,
        }
    };
    Error::syntax(kind, offset)
}

/// Evaluates `query` from `initial` with default options. `None` means the query
/// is malformed.
pub fn evaluate<N: TreeNode>(initial: NodeSet<N>, query: &str) -> Option<NodeSet<N>> {
    try_evaluate(initial, query).ok()
}

/// Like [`evaluate`], keeping the syntax error.
pub fn try_evaluate<N: TreeNode>(initial: NodeSet<N>, query: &str) -> Result<NodeSet<N>> {
    Evaluator::default().evaluate(initial, query)
}
