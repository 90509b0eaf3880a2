#![allow(dead_code)]

use treepath::tree::{doc, elem};
use treepath::{Node, NodeKind, NodeSet, Tree, TreeNode, evaluate};

/// ```text
/// <library name="city">
///   <book id="b1" lang="en"><title>Rust</title><author>Ann</author></book>
///   <book id="b2" lang="fr" path="a/b[1]|c"><title>Le Petit</title></book>
///   <magazine id="m1" note='say "hi"'><title>Monthly</title><issue n="1"/></magazine>
///   <section><book id="b3"><title>Deep</title></book></section>
/// </library>
/// ```
pub fn library_tree() -> Tree {
    doc()
        .child(
            elem("library")
                .attr("name", "city")
                .child(
                    elem("book")
                        .attr("id", "b1")
                        .attr("lang", "en")
                        .child(elem("title").text("Rust"))
                        .child(elem("author").text("Ann")),
                )
                .child(
                    elem("book")
                        .attr("id", "b2")
                        .attr("lang", "fr")
                        .attr("path", "a/b[1]|c")
                        .child(elem("title").text("Le Petit")),
                )
                .child(
                    elem("magazine")
                        .attr("id", "m1")
                        .attr("note", "say \"hi\"")
                        .child(elem("title").text("Monthly"))
                        .child(elem("issue").attr("n", "1")),
                )
                .child(elem("section").child(elem("book").attr("id", "b3").child(elem("title").text("Deep")))),
        )
        .build()
}

/// Elements print as their `id` attribute (or name), attributes as `@name=value`.
pub fn label(node: &Node<'_>) -> String {
    match node.kind() {
        NodeKind::Document => "#document".to_owned(),
        NodeKind::Text => format!("#text:{}", node.value().unwrap_or_default()),
        NodeKind::Attribute => format!("@{}={}", node.name(), node.value().unwrap_or_default()),
        NodeKind::Element => node
            .attributes()
            .find(|a| a.name() == "id")
            .and_then(|a| a.value().map(str::to_owned))
            .unwrap_or_else(|| node.name().to_owned()),
    }
}

pub fn labels(set: &NodeSet<Node<'_>>) -> Vec<String> {
    set.iter().map(label).collect()
}

/// Evaluates from the document node and labels the result; panics on syntax errors.
pub fn select(tree: &Tree, query: &str) -> Vec<String> {
    let set = evaluate(NodeSet::singleton(tree.document()), query)
        .unwrap_or_else(|| panic!("query {query:?} should be valid"));
    labels(&set)
}
