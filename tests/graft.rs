//! Integration tests for grafting: cross-document copies, same-document
//! duplication and relocation, and clone isolation.

#![allow(clippy::unwrap_used)]

use xmlgrove::{serial, Document, NodeKind};

fn source_doc() -> Document {
    let mut doc = Document::new();
    let mut tree = doc.tree();
    let mut a = tree.element(None, "A", None);
    a.attribute(None, "k", "av");
    a.element(None, "B", Some("v"));
    doc
}

#[test]
fn test_copy_between_documents() {
    let doc_a = source_doc();
    let src = doc_a.query().child("A").node().unwrap().id();

    let mut doc_b = Document::new();
    let root_b = doc_b.root();
    let grafted = doc_b.copy_into(root_b, &doc_a, src);

    assert_eq!(doc_b.get(grafted).name(), "A");
    assert_eq!(doc_b.get(grafted).attribute("k"), Some("av"));
    let b = doc_b.query().child("A").child("B").node().unwrap();
    assert_eq!(b.value(), "v");
}

#[test]
fn test_copy_isolation_both_directions() {
    let mut doc_a = source_doc();
    let src = doc_a.query().child("A").node().unwrap().id();

    let mut doc_b = Document::new();
    let root_b = doc_b.root();
    let grafted = doc_b.copy_into(root_b, &doc_a, src);

    // Mutating the original leaves the copy unchanged.
    let b_in_a = doc_a.query().child("A").child("B").node().unwrap().id();
    doc_a.set_value(b_in_a, "changed-in-a");
    assert_eq!(doc_b.query().child("A").child("B").node().unwrap().value(), "v");

    // Mutating the copy leaves the original unchanged.
    let b_in_b = doc_b.first_child(grafted).unwrap();
    doc_b.set_value(b_in_b, "changed-in-b");
    assert_eq!(doc_a.value(b_in_a), "changed-in-a");
}

#[test]
fn test_copy_preserves_child_and_attr_order() {
    let mut doc_a = Document::new();
    let mut tree = doc_a.tree();
    let mut e = tree.element(None, "e", None);
    e.attribute(None, "one", "1")
        .attribute(None, "two", "2")
        .attribute(None, "three", "3");
    e.element(None, "x", None);
    e.comment("mid");
    e.element(None, "y", None);
    let src = e.id();

    let mut doc_b = Document::new();
    let root_b = doc_b.root();
    let copy = doc_b.copy_into(root_b, &doc_a, src);

    let attrs: Vec<&str> = doc_b
        .attributes(copy)
        .map(|id| doc_b.get(id).name())
        .collect();
    assert_eq!(attrs, vec!["one", "two", "three"]);
    let kinds: Vec<NodeKind> = doc_b.children(copy).map(|id| doc_b.kind(id)).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Element, NodeKind::Comment, NodeKind::Element]
    );
}

#[test]
fn test_copy_attribute_root_lands_on_attr_list() {
    let doc_a = source_doc();
    let attr = doc_a
        .query()
        .child("A")
        .attribute("k")
        .node()
        .unwrap()
        .id();

    let mut doc_b = Document::new();
    let target = doc_b.tree().element(None, "t", None).id();
    doc_b.copy_into(target, &doc_a, attr);

    assert_eq!(doc_b.get(target).attribute("k"), Some("av"));
    assert!(doc_b.first_child(target).is_none());
}

#[test]
fn test_duplicate_within_document() {
    let mut doc = source_doc();
    let a = doc.query().child("A").node().unwrap().id();
    let root = doc.root();
    let copy = doc.duplicate(root, a);

    assert_ne!(copy, a);
    assert_eq!(doc.query().child("A").count(), 2);
    // Deep: the copied subtree has its own B with its own buffer.
    let b_copy = doc.first_child(copy).unwrap();
    doc.set_value(b_copy, "w");
    assert_eq!(doc.value(doc.first_child(a).unwrap()), "v");
}

#[test]
fn test_relocate_moves_subtree() {
    let mut doc = Document::new();
    doc.parse("<r><from><leaf>x</leaf></from><to/></r>").unwrap();
    let leaf = doc.query().descendant("leaf").node().unwrap().id();
    let to = doc.query().descendant("to").node().unwrap().id();
    let from = doc.query().descendant("from").node().unwrap().id();

    doc.relocate(to, leaf);

    assert_eq!(doc.parent(leaf), Some(to));
    assert!(doc.first_child(from).is_none());
    assert_eq!(doc.query().descendant("leaf").count(), 1);
    assert_eq!(
        serial::serialize_node(&doc, to),
        "<to>\n  <leaf>x</leaf>\n</to>"
    );
}

#[test]
fn test_graft_via_node_mut() {
    let doc_a = source_doc();
    let src = doc_a.query().child("A").node().unwrap().id();

    let mut doc_b = Document::new();
    let mut tree = doc_b.tree();
    let mut wrapper = tree.element(None, "wrapper", None);
    wrapper.copy_from(&doc_a, src);

    assert_eq!(
        doc_b.query().child("wrapper").child("A").child("B").count(),
        1
    );
}

#[test]
fn test_copy_into_same_shape_twice() {
    let doc_a = source_doc();
    let src = doc_a.query().child("A").node().unwrap().id();

    let mut doc_b = Document::new();
    let root_b = doc_b.root();
    doc_b.copy_into(root_b, &doc_a, src);
    doc_b.copy_into(root_b, &doc_a, src);
    assert_eq!(doc_b.query().child("A").count(), 2);
    assert_eq!(doc_b.query().child("A").child("B").count(), 2);
}
