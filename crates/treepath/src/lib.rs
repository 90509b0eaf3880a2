//! Restricted XPath-style node selection over in-memory trees.
//!
//! The query language covers child and attribute steps with wildcards and `|`
//! alternatives, `/`, `//`, `.` and `..`, bracketed predicates testing child or
//! attribute presence and attribute values, and a trailing `=` / `!=` comparison.
//! Function calls (`text()`, `position()`, ...) are rejected.
//!
//! Trees are accessed through the [`TreeNode`] trait; [`tree::Tree`] is an
//! arena-backed implementation.
pub mod axis;
pub mod compare;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod nodeset;
pub mod predicate;
pub mod tokenizer;
pub mod tree;

pub use compare::{Comparison, ComparisonOp};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, Step};
pub use error::{Error, Result, SyntaxErrorKind};
pub use evaluator::{ComparisonMode, EvalOptions, Evaluator, EvaluatorBuilder, evaluate, try_evaluate};
pub use model::{NodeKind, TreeNode};
pub use nodeset::NodeSet;
pub use tree::{Node, NodeId, Tree, TreeError};
