//! Tree serializer.
//!
//! Prints a document as indented XML. Node values are emitted verbatim —
//! the tree stores raw bytes and entity handling is the caller's policy —
//! so a parse/print round trip preserves references like `&amp;` as
//! written.
//!
//! A [`Printer`] constructed with [`Printer::with_source`] may emit the
//! original input text of any element or processing instruction whose
//! source span survived unmutated (see [`Document::source_span`]),
//! skipping re-serialization of untouched subtrees.

use crate::tree::{Document, NodeId, NodeKind};

/// Serializes a whole document with default settings.
///
/// Every child of the document root is printed followed by a newline.
///
/// # Examples
///
/// ```
/// use xmlgrove::{serial, Document};
///
/// let mut doc = Document::new();
/// doc.tree().element(None, "greeting", Some("hello"));
/// assert_eq!(serial::serialize(&doc), "<greeting>hello</greeting>\n");
/// ```
#[must_use]
pub fn serialize(doc: &Document) -> String {
    Printer::new().print(doc)
}

/// Serializes a single node (with its subtree) with default settings.
#[must_use]
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    Printer::new().print_node(doc, id)
}

/// Configurable tree printer.
#[derive(Default)]
pub struct Printer<'s> {
    source: Option<&'s str>,
}

impl<'s> Printer<'s> {
    /// A printer that always re-serializes from node fields.
    #[must_use]
    pub fn new() -> Self {
        Self { source: None }
    }

    /// A printer that may copy `source` text verbatim for nodes whose
    /// recorded span is still valid. `source` must be the exact input the
    /// document was parsed from.
    #[must_use]
    pub fn with_source(source: &'s str) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// Prints the document: each child of the root on its own line(s).
    #[must_use]
    pub fn print(&self, doc: &Document) -> String {
        let mut out = String::new();
        for child in doc.children(doc.root()) {
            self.write_node(doc, child, 0, &mut out);
            out.push('\n');
        }
        out
    }

    /// Prints a single node and its subtree, without a trailing newline.
    #[must_use]
    pub fn print_node(&self, doc: &Document, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(doc, id, 0, &mut out);
        out
    }

    fn write_node(&self, doc: &Document, id: NodeId, depth: usize, out: &mut String) {
        if let Some(src) = self.source {
            if let Some((start, end)) = doc.source_span(id) {
                out.push_str(&src[start..end]);
                return;
            }
        }

        match doc.kind(id) {
            NodeKind::Element => self.write_element(doc, id, depth, out),
            NodeKind::Document => {
                for child in doc.children(id) {
                    self.write_node(doc, child, depth, out);
                    out.push('\n');
                }
            }
            NodeKind::Attribute => {
                write_qname(doc, id, out);
                out.push_str("=\"");
                out.push_str(doc.raw_value(id));
                out.push('"');
            }
            NodeKind::Data => out.push_str(doc.raw_value(id)),
            NodeKind::CData => {
                out.push_str("<![CDATA[");
                out.push_str(doc.raw_value(id));
                out.push_str("]]>");
            }
            NodeKind::Comment => {
                out.push_str("<!--");
                out.push_str(doc.raw_value(id));
                out.push_str("-->");
            }
            NodeKind::Pi => {
                out.push_str("<?");
                write_qname(doc, id, out);
                if !doc.raw_value(id).is_empty() {
                    out.push(' ');
                    out.push_str(doc.raw_value(id));
                }
                out.push_str("?>");
            }
            NodeKind::Doctype => {
                out.push_str("<!DOCTYPE ");
                out.push_str(doc.raw_value(id));
                out.push('>');
            }
        }
    }

    fn write_element(&self, doc: &Document, id: NodeId, depth: usize, out: &mut String) {
        out.push('<');
        write_qname(doc, id, out);
        for attr in doc.attributes(id) {
            out.push(' ');
            self.write_node(doc, attr, depth, out);
        }

        if doc.first_child(id).is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        let flat = doc
            .children(id)
            .all(|c| matches!(doc.kind(c), NodeKind::Data | NodeKind::CData));
        if flat {
            for child in doc.children(id) {
                self.write_node(doc, child, depth, out);
            }
        } else {
            // Leading character data stays on the open-tag line; every
            // structured child gets its own indented line.
            let mut cur = doc.first_child(id);
            while let Some(c) = cur {
                if !matches!(doc.kind(c), NodeKind::Data | NodeKind::CData) {
                    break;
                }
                self.write_node(doc, c, depth, out);
                cur = doc.next_sibling(c);
            }
            out.push('\n');
            while let Some(c) = cur {
                indent(depth + 1, out);
                self.write_node(doc, c, depth + 1, out);
                out.push('\n');
                cur = doc.next_sibling(c);
            }
            indent(depth, out);
        }

        out.push_str("</");
        write_qname(doc, id, out);
        out.push('>');
    }
}

fn write_qname(doc: &Document, id: NodeId, out: &mut String) {
    let node = doc.get(id);
    if !node.prefix().is_empty() {
        out.push_str(node.prefix());
        out.push(':');
    }
    out.push_str(node.name());
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
