//! Integration tests for the fluent builder surface and tree invariants.

#![allow(clippy::unwrap_used)]

use xmlgrove::{serial, Document, NodeId, NodeKind};

/// Checks sibling-link symmetry and single-parent membership for every
/// node reachable from the root.
fn assert_well_linked(doc: &Document) {
    let mut stack = vec![doc.root()];
    while let Some(id) = stack.pop() {
        for list in [
            doc.children(id).collect::<Vec<_>>(),
            doc.attributes(id).collect::<Vec<_>>(),
        ] {
            for &child in &list {
                assert_eq!(doc.parent(child), Some(id));
                if let Some(next) = doc.next_sibling(child) {
                    assert_eq!(doc.prev_sibling(next), Some(child));
                }
                if let Some(prev) = doc.prev_sibling(child) {
                    assert_eq!(doc.next_sibling(prev), Some(child));
                }
            }
            if let (Some(&first), Some(&last)) = (list.first(), list.last()) {
                assert!(doc.prev_sibling(first).is_none());
                assert!(doc.next_sibling(last).is_none());
            }
            stack.extend(list);
        }
    }
}

fn build_small(doc: &mut Document, values: [&str; 5]) {
    doc.header(None);
    let mut tree = doc.tree();
    let mut root = tree.element(None, "root", Some(values[0]));
    root.element(None, values[1], Some(values[2]));
    root.element(None, values[3], Some(values[4]));
}

// --- Build & print ---

#[test]
fn test_build_and_print() {
    let mut doc = Document::new();
    build_small(&mut doc, ["123456789", "second", "second", "third", "third"]);

    assert_eq!(
        serial::serialize(&doc),
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<root>123456789\n",
            "  <second>second</second>\n",
            "  <third>third</third>\n",
            "</root>\n"
        )
    );
    assert_well_linked(&doc);
}

#[test]
fn test_reset_and_rebuild_reuses_arena() {
    let mut doc = Document::new();
    build_small(&mut doc, ["123456789", "second", "second", "third", "third"]);
    let before = doc.stats();

    doc.reset();
    build_small(&mut doc, ["12345", "one", "one", "two", "two"]);
    let after = doc.stats();

    assert_eq!(
        serial::serialize(&doc),
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<root>12345\n",
            "  <one>one</one>\n",
            "  <two>two</two>\n",
            "</root>\n"
        )
    );
    // Same shape, shorter values: no new chunk and no new node slots.
    assert_eq!(after.chunk_count, before.chunk_count);
    assert_eq!(after.nodes_allocated, before.nodes_allocated);
    assert_eq!(after.nodes_in_use, before.nodes_in_use);
}

#[test]
fn test_attributes_and_nesting() {
    let mut doc = Document::new();
    let mut tree = doc.tree();
    let mut vast = tree.element(None, "VAST", None);
    vast.attribute(None, "version", "3.0");
    let mut inline = vast.element(None, "InLine", None);
    inline.element(None, "AdTitle", Some("VAST 3.0 Instream Test"));
    let mut creatives = inline.element(None, "Creatives", None);
    let mut creative = creatives.element(None, "Creative", None);
    creative.attribute(None, "id", "123456");
    creative.attribute(None, "adId", "654321");

    let printed = serial::serialize(&doc);
    assert!(printed.contains("<VAST version=\"3.0\">"));
    assert!(printed.contains("<Creative id=\"123456\" adId=\"654321\"/>"));
    assert_well_linked(&doc);
}

// --- Mutation sequences keep the tree well-linked ---

#[test]
fn test_links_hold_through_detach_and_reattach() {
    let mut doc = Document::new();
    let mut tree = doc.tree();
    let mut root = tree.element(None, "r", None);
    let mut ids: Vec<NodeId> = Vec::new();
    for name in ["a", "b", "c", "d", "e"] {
        ids.push(root.element(None, name, Some(name)).id());
    }
    let root = root.id();

    // Detach from the middle, the head, and the tail.
    doc.detach(ids[2]);
    doc.detach(ids[0]);
    doc.remove(ids[4]);
    assert_well_linked(&doc);
    assert_eq!(doc.children(root).count(), 2);

    // Re-attach two of them elsewhere.
    doc.append_child(ids[1], ids[0]);
    doc.prepend_child(ids[3], ids[4]);
    assert_well_linked(&doc);
    assert_eq!(doc.parent(ids[0]), Some(ids[1]));
    assert_eq!(doc.first_child(ids[3]), Some(ids[4]));
}

#[test]
fn test_detached_subtree_stays_intact() {
    let mut doc = Document::new();
    let mut tree = doc.tree();
    let mut root = tree.element(None, "r", None);
    let mut branch = root.element(None, "branch", None);
    branch.element(None, "leaf", Some("x"));
    let branch = branch.id();

    doc.detach(branch);
    assert!(doc.parent(branch).is_none());
    let leaf = doc.first_child(branch).unwrap();
    assert_eq!(doc.get(leaf).name(), "leaf");
    assert_eq!(doc.value(leaf), "x");
}

#[test]
fn test_builder_value_and_position() {
    let mut doc = Document::new();
    let mut tree = doc.tree();
    let mut root = tree.element(None, "r", None);
    root.element(None, "a", None);
    let b = root.element(None, "b", Some("vb")).id();

    assert_eq!(doc.position(b), 1);
    assert_eq!(doc.value(b), "vb");
    doc.set_value(b, "nb");
    assert_eq!(doc.value(b), "nb");
    assert_eq!(doc.kind(b), NodeKind::Element);
}

#[test]
fn test_mixed_children_via_builder() {
    let mut doc = Document::new();
    let mut tree = doc.tree();
    let mut e = tree.element(None, "e", None);
    e.data("text")
        .comment("note")
        .cdata("raw")
        .pi("target body")
        .doctype("e");
    let e = e.id();

    let kinds: Vec<NodeKind> = doc.children(e).map(|id| doc.kind(id)).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Data,
            NodeKind::Comment,
            NodeKind::CData,
            NodeKind::Pi,
            NodeKind::Doctype
        ]
    );
    assert_well_linked(&doc);
}

#[test]
fn test_header_after_content_is_first_child() {
    let mut doc = Document::new();
    doc.tree().element(None, "r", None);
    doc.header(Some("ISO-8859-1"));
    let first = doc.first_child(doc.root()).unwrap();
    assert_eq!(doc.kind(first), NodeKind::Pi);
    assert!(doc.raw_value(first).contains("ISO-8859-1"));
}

#[test]
fn test_top_element_tracks_latest() {
    let mut doc = Document::new();
    let mut tree = doc.tree();
    let a = tree.element(None, "a", None).id();
    assert_eq!(doc.top_element(), Some(a));

    let mut tree = doc.tree();
    let b = tree.element(None, "b", None).id();
    tree.comment("trailing");
    assert_eq!(doc.top_element(), Some(b));
}
