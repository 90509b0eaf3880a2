//! Arena-backed reference tree implementing [`TreeNode`].
//!
//! Every node of a [`Tree`] lives in a single `Vec`; parent, child, sibling and
//! attribute links are [`NodeId`] indices into it. Links are lookup-only, so there
//! are no reference cycles and a whole tree is dropped at once.
//!
//! Example:
//! ```
//! use treepath::tree::{doc, elem};
//! use treepath::TreeNode;
//!
//! // <root id="r"><child>Hello</child><child world="yes"/></root>
//! let tree = doc()
//!     .child(
//!         elem("root")
//!             .attr("id", "r")
//!             .child(elem("child").text("Hello"))
//!             .child(elem("child").attr("world", "yes")),
//!     )
//!     .build();
//!
//! let root = tree.document().children().next().unwrap();
//! assert_eq!(root.name(), "root");
//! assert_eq!(root.children().count(), 2);
//! assert_eq!(root.attributes().next().unwrap().value(), Some("r"));
//! ```
use core::fmt;
use core::hash::{Hash, Hasher};

use compact_str::CompactString;

use crate::model::{NodeKind, TreeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("node {0:?} does not belong to this tree")]
    UnknownNode(NodeId),
    #[error("node {id:?} is a {kind:?} node and cannot own {what}")]
    NotAContainer { id: NodeId, kind: NodeKind, what: &'static str },
}

#[derive(Debug, Clone)]
struct Record {
    kind: NodeKind,
    name: CompactString,
    value: Option<CompactString>,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    first_attribute: Option<NodeId>,
    last_attribute: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Record {
    fn new(kind: NodeKind, name: &str, value: Option<&str>, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            name: CompactString::from(name),
            value: value.map(CompactString::from),
            parent,
            first_child: None,
            last_child: None,
            first_attribute: None,
            last_attribute: None,
            next_sibling: None,
        }
    }
}

/// An immutable-once-built document: a document node plus its element, attribute
/// and text descendants.
#[derive(Debug, Clone)]
pub struct Tree {
    records: Vec<Record>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding only its document node.
    pub fn new() -> Self {
        Self { records: vec![Record::new(NodeKind::Document, "", None, None)] }
    }

    pub fn document(&self) -> Node<'_> {
        Node { tree: self, id: NodeId(0) }
    }

    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.records.len()).then_some(Node { tree: self, id })
    }

    /// Number of nodes, the document node included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the tree holds nothing but its document node.
    pub fn is_empty(&self) -> bool {
        self.records.len() == 1
    }

    /// Every element node in document order.
    pub fn elements(&self) -> impl Iterator<Item = Node<'_>> {
        let mut stack = vec![NodeId(0)];
        core::iter::from_fn(move || {
            while let Some(id) = stack.pop() {
                let mut kids: Vec<NodeId> = Siblings { tree: self, next: self.records[id.0].first_child }
                    .map(|n| n.id)
                    .collect();
                kids.reverse();
                stack.extend(kids);
                if self.records[id.0].kind == NodeKind::Element {
                    return Some(Node { tree: self, id });
                }
            }
            None
        })
    }

    pub fn append_element(&mut self, parent: NodeId, name: &str) -> Result<NodeId, TreeError> {
        self.check_container(parent, "children")?;
        Ok(self.attach_child(parent, Record::new(NodeKind::Element, name, None, Some(parent))))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.check_container(parent, "children")?;
        Ok(self.attach_child(parent, Record::new(NodeKind::Text, "", Some(text), Some(parent))))
    }

    /// Sets an attribute on an element, replacing the value of an existing
    /// attribute with the same name.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<NodeId, TreeError> {
        let kind = self.records.get(element.0).ok_or(TreeError::UnknownNode(element))?.kind;
        if kind != NodeKind::Element {
            return Err(TreeError::NotAContainer { id: element, kind, what: "attributes" });
        }
        let existing = Siblings { tree: &*self, next: self.records[element.0].first_attribute }
            .find(|a| a.name() == name)
            .map(|a| a.id);
        if let Some(id) = existing {
            self.records[id.0].value = Some(CompactString::from(value));
            return Ok(id);
        }
        Ok(self.attach_attribute(element, Record::new(NodeKind::Attribute, name, Some(value), Some(element))))
    }

    fn check_container(&self, id: NodeId, what: &'static str) -> Result<(), TreeError> {
        let record = self.records.get(id.0).ok_or(TreeError::UnknownNode(id))?;
        match record.kind {
            NodeKind::Document | NodeKind::Element => Ok(()),
            kind => Err(TreeError::NotAContainer { id, kind, what }),
        }
    }

    fn alloc(&mut self, record: Record) -> NodeId {
        let id = NodeId(self.records.len());
        self.records.push(record);
        id
    }

    fn attach_child(&mut self, parent: NodeId, record: Record) -> NodeId {
        let id = self.alloc(record);
        match self.records[parent.0].last_child {
            Some(last) => self.records[last.0].next_sibling = Some(id),
            None => self.records[parent.0].first_child = Some(id),
        }
        self.records[parent.0].last_child = Some(id);
        id
    }

    fn attach_attribute(&mut self, element: NodeId, record: Record) -> NodeId {
        let id = self.alloc(record);
        match self.records[element.0].last_attribute {
            Some(last) => self.records[last.0].next_sibling = Some(id),
            None => self.records[element.0].first_attribute = Some(id),
        }
        self.records[element.0].last_attribute = Some(id);
        id
    }
}

/// Copyable handle to one node of a [`Tree`]. Identity is (tree, id).
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> Node<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    pub fn next_sibling(&self) -> Option<Node<'t>> {
        self.record().next_sibling.map(|id| Node { tree: self.tree, id })
    }

    fn record(&self) -> &'t Record {
        &self.tree.records[self.id.0]
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}
impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::ptr::from_ref(self.tree).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        f.debug_struct("Node")
            .field("id", &self.id.0)
            .field("kind", &record.kind)
            .field("name", &record.name)
            .field("value", &record.value)
            .finish()
    }
}

/// Walks a `next_sibling` chain (children or attributes).
struct Siblings<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
}

impl<'t> Iterator for Siblings<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.records[id.0].next_sibling;
        Some(Node { tree: self.tree, id })
    }
}

impl<'t> TreeNode for Node<'t> {
    fn kind(&self) -> NodeKind {
        self.record().kind
    }

    fn name(&self) -> &str {
        self.record().name.as_str()
    }

    fn value(&self) -> Option<&str> {
        self.record().value.as_deref()
    }

    fn parent(&self) -> Option<Self> {
        self.record().parent.map(|id| Node { tree: self.tree, id })
    }

    fn children(&self) -> impl Iterator<Item = Self> {
        Siblings { tree: self.tree, next: self.record().first_child }
    }

    fn attributes(&self) -> impl Iterator<Item = Self> {
        Siblings { tree: self.tree, next: self.record().first_attribute }
    }

    fn root(&self) -> Self {
        let mut id = self.id;
        while let Some(parent) = self.tree.records[id.0].parent {
            id = parent;
        }
        Node { tree: self.tree, id }
    }
}

// ---- Builder ----

pub enum Content {
    Element(ElementBuilder),
    Text(CompactString),
}

impl From<ElementBuilder> for Content {
    fn from(b: ElementBuilder) -> Self {
        Content::Element(b)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(CompactString::from(s))
    }
}

pub struct ElementBuilder {
    name: CompactString,
    attrs: Vec<(CompactString, CompactString)>,
    content: Vec<Content>,
}

impl ElementBuilder {
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: impl Into<Content>) -> Self {
        self.content.push(child.into());
        self
    }

    pub fn children<I: IntoIterator<Item = ElementBuilder>>(mut self, it: I) -> Self {
        self.content.extend(it.into_iter().map(Content::Element));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.content.push(Content::Text(text.into()));
        self
    }

    /// Wrap this element in a fresh document.
    pub fn build(self) -> Tree {
        doc().child(self).build()
    }

    fn attach(self, tree: &mut Tree, parent: NodeId) {
        let id = tree.attach_child(parent, Record::new(NodeKind::Element, self.name.as_str(), None, Some(parent)));
        for (name, value) in self.attrs {
            // duplicate names keep the last value, like set_attribute
            let existing = Siblings { tree: &*tree, next: tree.records[id.0].first_attribute }
                .find(|a| a.name() == name.as_str())
                .map(|a| a.id);
            match existing {
                Some(attr) => tree.records[attr.0].value = Some(value),
                None => {
                    tree.attach_attribute(id, Record::new(NodeKind::Attribute, &name, Some(value.as_str()), Some(id)));
                }
            }
        }
        for content in self.content {
            match content {
                Content::Element(b) => b.attach(tree, id),
                Content::Text(t) => {
                    tree.attach_child(id, Record::new(NodeKind::Text, "", Some(t.as_str()), Some(id)));
                }
            }
        }
    }
}

#[derive(Default)]
pub struct DocumentBuilder {
    content: Vec<Content>,
}

impl DocumentBuilder {
    pub fn child(mut self, child: impl Into<Content>) -> Self {
        self.content.push(child.into());
        self
    }

    /// Allocates nodes in document pre-order, so `NodeId` order matches document order
    /// for built trees.
    pub fn build(self) -> Tree {
        let mut tree = Tree::new();
        let document = NodeId(0);
        for content in self.content {
            match content {
                Content::Element(b) => b.attach(&mut tree, document),
                Content::Text(t) => {
                    tree.attach_child(document, Record::new(NodeKind::Text, "", Some(t.as_str()), Some(document)));
                }
            }
        }
        tree
    }
}

pub fn doc() -> DocumentBuilder {
    DocumentBuilder::default()
}

pub fn elem(name: &str) -> ElementBuilder {
    ElementBuilder { name: name.into(), attrs: Vec::new(), content: Vec::new() }
}
