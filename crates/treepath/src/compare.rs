//! Trailing comparisons: `='literal'` and `!='literal'`.

use compact_str::CompactString;

use crate::error::{Error, Result, SyntaxErrorKind};
use crate::model::TreeNode;
use crate::nodeset::NodeSet;
use crate::tokenizer::{Cursor, unquote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "!=",
        }
    }

    /// `(subject, operand) -> satisfied`
    pub fn comparator(self) -> impl Fn(&str, &str) -> bool {
        move |subject: &str, operand: &str| match self {
            ComparisonOp::Equal => subject == operand,
            ComparisonOp::NotEqual => subject != operand,
        }
    }
}

pub(crate) const RELATIONAL: [&str; 8] = ["&lt;=", "&gt;=", "&lt;", "&gt;", "<=", ">=", "<", ">"];

/// Whether the remaining text opens a comparison, supported or not.
pub fn starts_comparison(cursor: &Cursor<'_>) -> bool {
    cursor.starts_with("=") || cursor.starts_with("!=") || RELATIONAL.iter().any(|op| cursor.starts_with(op))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub op: ComparisonOp,
    /// Operand with its surrounding quotes removed.
    pub operand: CompactString,
}

impl Comparison {
    /// Parses operator and operand at the cursor.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let at = cursor.offset();
        let op = if cursor.eat("!=") {
            ComparisonOp::NotEqual
        } else if cursor.eat("=") {
            ComparisonOp::Equal
        } else {
            return Err(Error::syntax(SyntaxErrorKind::UnsupportedOperator, at));
        };
        cursor.skip_whitespace();
        let operand = match cursor.next_name()? {
            Some(token) => CompactString::from(unquote(&token)),
            None if cursor.faces_function_call() => {
                return Err(Error::syntax(SyntaxErrorKind::FunctionCall, cursor.offset()));
            }
            None => return Err(Error::syntax(SyntaxErrorKind::MissingOperand, cursor.offset())),
        };
        Ok(Self { op, operand })
    }

    /// Attributes compare by value, everything else by name.
    pub fn holds<N: TreeNode>(&self, node: &N) -> bool {
        let subject = if node.is_attribute() { node.value().unwrap_or_default() } else { node.name() };
        (self.op.comparator())(subject, self.operand.as_str())
    }

    /// The first node, in set order, that satisfies the comparison, as a singleton.
    pub fn first_match<N: TreeNode>(&self, set: &NodeSet<N>) -> NodeSet<N> {
        set.iter().find(|n| self.holds(*n)).cloned().map_or_else(NodeSet::new, NodeSet::singleton)
    }

    /// Every node that satisfies the comparison, in set order.
    pub fn filter<N: TreeNode>(&self, set: &NodeSet<N>) -> NodeSet<N> {
        set.iter().filter(|n| self.holds(*n)).cloned().collect()
    }
}
