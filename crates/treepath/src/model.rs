use core::fmt::Debug;
use core::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
}

/// Read-only view of a tree node as seen by the path evaluator.
///
/// Implementations are cheap handles: cloning must not copy the subtree, and
/// equality/hashing must be by node identity (two handles are equal only if they
/// refer to the same node of the same tree), never by content.
///
/// Contract:
/// - `children` yields every child node in document order. The evaluator filters
///   element children itself, so text or other node kinds may be included.
/// - `attributes` yields attribute nodes in declaration order and is empty for
///   anything that is not an element.
/// - `value` is defined for attributes (and text); elements and documents return `None`.
/// - `parent` of an attribute is its owning element.
pub trait TreeNode: Clone + Eq + Hash + Debug {
    fn kind(&self) -> NodeKind;
    fn name(&self) -> &str;
    fn value(&self) -> Option<&str>;

    fn parent(&self) -> Option<Self>;
    fn children(&self) -> impl Iterator<Item = Self>;
    fn attributes(&self) -> impl Iterator<Item = Self>;

    /// Topmost ancestor (the node itself if it has no parent).
    fn root(&self) -> Self {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    fn is_attribute(&self) -> bool {
        self.kind() == NodeKind::Attribute
    }
}
