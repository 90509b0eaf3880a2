//! The evaluator only needs `TreeNode`; this adapter keeps its own flat node table.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rstest::{fixture, rstest};
use treepath::{NodeKind, NodeSet, TreeNode, evaluate};

#[derive(Debug)]
struct Dom {
    nodes: Vec<NodeRecord>,
}

#[derive(Debug)]
struct NodeRecord {
    kind: NodeKind,
    name: String,
    value: Option<String>,
    parent: Option<usize>,
    children: Vec<usize>,
    attributes: Vec<usize>,
}

#[derive(Debug, Clone)]
struct DomNode {
    dom: Arc<Dom>,
    idx: usize,
}

impl PartialEq for DomNode {
    fn eq(&self, o: &Self) -> bool {
        Arc::ptr_eq(&self.dom, &o.dom) && self.idx == o.idx
    }
}
impl Eq for DomNode {}

impl Hash for DomNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.dom).hash(state);
        self.idx.hash(state);
    }
}

impl DomNode {
    fn at(&self, idx: usize) -> Self {
        DomNode { dom: self.dom.clone(), idx }
    }
}

impl TreeNode for DomNode {
    fn kind(&self) -> NodeKind {
        self.dom.nodes[self.idx].kind
    }
    fn name(&self) -> &str {
        &self.dom.nodes[self.idx].name
    }
    fn value(&self) -> Option<&str> {
        self.dom.nodes[self.idx].value.as_deref()
    }
    fn parent(&self) -> Option<Self> {
        self.dom.nodes[self.idx].parent.map(|i| self.at(i))
    }
    fn children(&self) -> impl Iterator<Item = Self> {
        self.dom.nodes[self.idx].children.iter().map(|&i| self.at(i))
    }
    fn attributes(&self) -> impl Iterator<Item = Self> {
        self.dom.nodes[self.idx].attributes.iter().map(|&i| self.at(i))
    }
}

fn push(dom: &mut Dom, parent: Option<usize>, kind: NodeKind, name: &str, value: Option<&str>) -> usize {
    let idx = dom.nodes.len();
    dom.nodes.push(NodeRecord {
        kind,
        name: name.to_string(),
        value: value.map(str::to_string),
        parent,
        children: vec![],
        attributes: vec![],
    });
    if let Some(p) = parent {
        match kind {
            NodeKind::Attribute => dom.nodes[p].attributes.push(idx),
            _ => dom.nodes[p].children.push(idx),
        }
    }
    idx
}

/// <root><item kind="x">one</item><item kind="y"/><other/></root>, with no
/// document node: the root element is the topmost node.
#[fixture]
fn root() -> DomNode {
    let mut dom = Dom { nodes: vec![] };
    let root = push(&mut dom, None, NodeKind::Element, "root", None);
    let first = push(&mut dom, Some(root), NodeKind::Element, "item", None);
    push(&mut dom, Some(first), NodeKind::Attribute, "kind", Some("x"));
    push(&mut dom, Some(first), NodeKind::Text, "", Some("one"));
    let second = push(&mut dom, Some(root), NodeKind::Element, "item", None);
    push(&mut dom, Some(second), NodeKind::Attribute, "kind", Some("y"));
    push(&mut dom, Some(root), NodeKind::Element, "other", None);
    DomNode { dom: Arc::new(dom), idx: root }
}

#[rstest]
fn child_steps_on_adapter(root: DomNode) {
    let items = evaluate(NodeSet::singleton(root.clone()), "item").unwrap();
    assert_eq!(items.iter().map(|n| n.idx).collect::<Vec<_>>(), [1, 4]);

    let kinds = evaluate(items, "@kind").unwrap();
    assert_eq!(kinds.iter().map(|n| n.value().unwrap()).collect::<Vec<_>>(), ["x", "y"]);
}

#[rstest]
fn root_step_without_document_node(root: DomNode) {
    let other = evaluate(NodeSet::singleton(root.clone()), "other").unwrap();
    let back = evaluate(other, "/").unwrap();
    assert_eq!(back.into_vec(), vec![root.clone()]);

    // the root element has no parent, so `..` drops it
    assert!(evaluate(NodeSet::singleton(root), "..").unwrap().is_empty());
}

#[rstest]
fn text_children_are_not_elements(root: DomNode) {
    let under_first = evaluate(NodeSet::singleton(root.clone()), "item[@kind='x']/*").unwrap();
    assert!(under_first.is_empty());
    let all = evaluate(NodeSet::singleton(root), "//*").unwrap();
    assert_eq!(all.iter().map(|n| n.name()).collect::<Vec<_>>(), ["item", "item", "other"]);
}
