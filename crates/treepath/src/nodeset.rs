//! Insertion-ordered node sets.

use core::hash::Hash;
use std::collections::HashSet;

/// An ordered sequence of node handles.
///
/// Order is the order in which traversal produced the nodes. Every set the
/// evaluator hands back has been passed through [`NodeSet::dedup`], so it holds each
/// node at most once; intermediate sets built with [`NodeSet::push`] or
/// [`NodeSet::append`] may temporarily contain repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSet<N> {
    nodes: Vec<N>,
}

impl<N> Default for NodeSet<N> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<N> NodeSet<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { nodes: Vec::with_capacity(capacity) }
    }

    pub fn singleton(node: N) -> Self {
        Self { nodes: vec![node] }
    }

    pub fn push(&mut self, node: N) {
        self.nodes.push(node);
    }

    /// Union-append: moves every entry of `other` to the end of `self`.
    /// Does not deduplicate.
    pub fn append(&mut self, other: &mut NodeSet<N>) {
        self.nodes.append(&mut other.nodes);
    }

    pub fn retain(&mut self, keep: impl FnMut(&N) -> bool) {
        self.nodes.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<&N> {
        self.nodes.first()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, N> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[N] {
        &self.nodes
    }

    pub fn into_vec(self) -> Vec<N> {
        self.nodes
    }
}

impl<N: Clone + Eq + Hash> NodeSet<N> {
    /// Removes later occurrences of nodes already seen, comparing by identity.
    /// The first occurrence of each node keeps its position.
    pub fn dedup(&mut self) {
        if self.nodes.len() < 2 {
            return;
        }
        let mut seen: HashSet<N> = HashSet::with_capacity(self.nodes.len());
        self.nodes.retain(|n| seen.insert(n.clone()));
    }

    /// Order-preserving union: `self` followed by the nodes of `other` not already
    /// present.
    #[must_use]
    pub fn union(mut self, mut other: NodeSet<N>) -> NodeSet<N> {
        self.append(&mut other);
        self.dedup();
        self
    }

    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }
}

impl<N> Extend<N> for NodeSet<N> {
    fn extend<I: IntoIterator<Item = N>>(&mut self, iter: I) {
        self.nodes.extend(iter);
    }
}

impl<N> FromIterator<N> for NodeSet<N> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self { nodes: iter.into_iter().collect() }
    }
}

impl<N> From<Vec<N>> for NodeSet<N> {
    fn from(nodes: Vec<N>) -> Self {
        Self { nodes }
    }
}

impl<N> IntoIterator for NodeSet<N> {
    type Item = N;
    type IntoIter = std::vec::IntoIter<N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a, N> IntoIterator for &'a NodeSet<N> {
    type Item = &'a N;
    type IntoIter = core::slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
