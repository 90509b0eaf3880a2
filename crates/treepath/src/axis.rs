//! Axis transitions. Each maps a node set to the next node set and returns it
//! deduplicated.

use smallvec::SmallVec;

use crate::model::{NodeKind, TreeNode};
use crate::nodeset::NodeSet;
use crate::tokenizer::{Name, unquote};

/// Name test of a child or attribute step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    /// `*`
    Any,
    Name(Name),
}

/// Pipe-separated alternatives of one step (`a|b|c`).
pub type NameTests = SmallVec<[NameTest; 4]>;

impl NameTest {
    /// Builds a test from a token; surrounding quotes are stripped.
    pub fn from_token(token: &str) -> Self {
        match unquote(token) {
            "*" if !token.starts_with(['\'', '"']) => NameTest::Any,
            name => NameTest::Name(Name::from(name)),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Name(n) => n.as_str() == name,
        }
    }
}

/// `/` at query start: every node is replaced by its topmost ancestor.
pub fn root<N: TreeNode>(set: &NodeSet<N>) -> NodeSet<N> {
    let mut out: NodeSet<N> = set.iter().map(TreeNode::root).collect();
    out.dedup();
    out
}

/// `//`: every node followed by its element descendants in pre-order.
pub fn descendant_or_self<N: TreeNode>(set: &NodeSet<N>) -> NodeSet<N> {
    let mut out = NodeSet::with_capacity(set.len());
    for node in set {
        out.push(node.clone());
        push_element_descendants(node, &mut out);
    }
    out.dedup();
    out
}

/// `//name`: matching element descendants of every node, in pre-order. Yields the
/// same nodes as a child step over the descendant-or-self set, but in document
/// order even when matches nest inside each other.
pub fn descendants<N: TreeNode>(set: &NodeSet<N>, tests: &[NameTest]) -> NodeSet<N> {
    let mut all = NodeSet::new();
    for node in set {
        push_element_descendants(node, &mut all);
    }
    all.dedup();
    let mut out = NodeSet::with_capacity(all.len());
    for test in tests {
        out.extend(all.iter().filter(|n| test.matches(n.name())).cloned());
    }
    out.dedup();
    out
}

/// Pre-order walk through element children only. Iterative so deep trees cannot
/// exhaust the call stack.
fn push_element_descendants<N: TreeNode>(node: &N, out: &mut NodeSet<N>) {
    let mut stack: Vec<N> = element_children(node).collect();
    stack.reverse();
    while let Some(next) = stack.pop() {
        let start = stack.len();
        stack.extend(element_children(&next));
        stack[start..].reverse();
        out.push(next);
    }
}

/// `..`: every node's element parent; nodes whose parent is missing or not an
/// element are dropped.
pub fn parent<N: TreeNode>(set: &NodeSet<N>) -> NodeSet<N> {
    let mut out: NodeSet<N> = set
        .iter()
        .filter_map(TreeNode::parent)
        .filter(TreeNode::is_element)
        .collect();
    out.dedup();
    out
}

/// `@name`, `@*`, `@a|@b`: matching attributes of every node. Alternatives are
/// applied one after another over the whole set.
pub fn attributes<N: TreeNode>(set: &NodeSet<N>, tests: &[NameTest]) -> NodeSet<N> {
    let mut out = NodeSet::new();
    for test in tests {
        for node in set {
            out.extend(node.attributes().filter(|a| test.matches(a.name())));
        }
    }
    out.dedup();
    out
}

/// `name`, `*`, `a|b`: matching element children of every node, source-major and in
/// document order within each source. Alternatives are applied one after another over
/// the whole set, so `a|b` is the union of the `a` result and the `b` result.
pub fn children<N: TreeNode>(set: &NodeSet<N>, tests: &[NameTest]) -> NodeSet<N> {
    let mut out = NodeSet::new();
    for test in tests {
        for node in set {
            out.extend(element_children(node).filter(|c| test.matches(c.name())));
        }
    }
    out.dedup();
    out
}

pub(crate) fn element_children<N: TreeNode>(node: &N) -> impl Iterator<Item = N> {
    node.children().filter(|c| c.kind() == NodeKind::Element)
}
