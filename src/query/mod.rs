//! Chainable path queries over a document tree.
//!
//! A query starts at [`Document::query`] (rooted at the document node) or
//! [`Node::query`] (rooted at any node) and proceeds by chaining axis
//! operations, each producing a new [`NodeSet`]:
//!
//! ```
//! use xmlgrove::Document;
//!
//! let mut doc = Document::new();
//! doc.parse("<lib><book id='1'/><book id='2'/><cd/></lib>").unwrap();
//! assert_eq!(doc.query().child("lib").child("book").count(), 2);
//! assert_eq!(doc.query().descendant("").count(), 4);
//! ```
//!
//! # Result lifetime
//!
//! All node sets on one document share a single scratch buffer. A
//! [`NodeSet`] is a view of a run of that buffer and stays valid only
//! until the next top-level `query()` on the same document, which rewinds
//! the buffer. Use [`NodeSet::dup`] to keep results across that boundary.
//! (Queries started *inside* a [`NodeSet::filter`] callback are nested,
//! not top-level: they allocate past the outer results and are unwound
//! when the callback returns, so filters may recurse into the engine
//! freely.)

use std::cell::{Cell, RefCell};

use crate::tree::{Document, Node, NodeId, NodeKind};

/// Scratch state shared by every query on one document: the node buffer,
/// its bump cursor, and the filter-callback nesting depth.
pub(crate) struct QueryScratch {
    buf: RefCell<Vec<NodeId>>,
    cursor: Cell<usize>,
    depth: Cell<usize>,
}

impl QueryScratch {
    pub(crate) fn new() -> Self {
        Self {
            buf: RefCell::new(Vec::new()),
            cursor: Cell::new(0),
            depth: Cell::new(0),
        }
    }

    fn push(&self, id: NodeId) {
        let i = self.cursor.get();
        let mut buf = self.buf.borrow_mut();
        if i < buf.len() {
            buf[i] = id;
        } else {
            buf.push(id);
        }
        self.cursor.set(i + 1);
    }

    fn get(&self, i: usize) -> NodeId {
        self.buf.borrow()[i]
    }

    /// Whether `id` already occurs in the run `[mark, cursor)`.
    fn contains_since(&self, mark: usize, id: NodeId) -> bool {
        self.buf.borrow()[mark..self.cursor.get()].contains(&id)
    }
}

impl Document {
    /// Starts a query rooted at the document node.
    ///
    /// At the top level this rewinds the shared scratch buffer, which
    /// invalidates every `NodeSet` previously obtained from this document
    /// (see the module docs); inside a filter callback it nests instead.
    pub fn query(&self) -> NodeSet<'_> {
        start(self, self.root())
    }
}

impl<'d> Node<'d> {
    /// Starts a query rooted at this node. Same buffer rules as
    /// [`Document::query`].
    pub fn query(&self) -> NodeSet<'d> {
        start(self.doc, self.id)
    }
}

fn start(doc: &Document, id: NodeId) -> NodeSet<'_> {
    let scratch = &doc.scratch;
    if scratch.depth.get() == 0 {
        scratch.cursor.set(0);
    }
    let mark = scratch.cursor.get();
    scratch.push(id);
    NodeSet {
        doc,
        start: mark,
        len: 1,
    }
}

/// A transient, non-owning set of nodes: a view of a contiguous run of
/// the document's query scratch buffer.
///
/// Axis operations never modify the set they are called on; each returns
/// a freshly-allocated run. An empty name or value argument matches
/// everything on that axis.
#[derive(Clone, Copy)]
pub struct NodeSet<'d> {
    doc: &'d Document,
    start: usize,
    len: usize,
}

impl<'d> NodeSet<'d> {
    fn scratch(&self) -> &'d QueryScratch {
        &self.doc.scratch
    }

    fn item(&self, i: usize) -> NodeId {
        self.scratch().get(self.start + i)
    }

    /// Runs `pred` under the save/restore protocol and pushes `id` into
    /// the current run when it holds.
    ///
    /// The cursor is saved before the predicate runs and restored after,
    /// so a predicate is free to run nested queries: whatever it allocates
    /// is unwound, and the tested node lands at the restored cursor. The
    /// depth counter keeps those nested queries from rewinding the buffer.
    fn test_push(&self, id: NodeId, pred: &mut dyn FnMut(Node<'d>) -> bool) {
        let scratch = self.scratch();
        let saved = scratch.cursor.get();
        scratch.depth.set(scratch.depth.get() + 1);
        let keep = pred(self.doc.get(id));
        scratch.depth.set(scratch.depth.get() - 1);
        scratch.cursor.set(saved);
        if keep {
            scratch.push(id);
        }
    }

    /// [`Self::test_push`] with an identity de-dup against `[mark, cursor)`.
    fn test_push_unique(&self, mark: usize, id: NodeId, pred: &mut dyn FnMut(Node<'d>) -> bool) {
        if !self.scratch().contains_since(mark, id) {
            self.test_push(id, pred);
        }
    }

    fn run_since(&self, mark: usize) -> NodeSet<'d> {
        NodeSet {
            doc: self.doc,
            start: mark,
            len: self.scratch().cursor.get() - mark,
        }
    }

    // --- Axes ---

    /// Element children of each node, optionally filtered by local name.
    pub fn child(&self, name: &str) -> NodeSet<'d> {
        let mark = self.scratch().cursor.get();
        for i in 0..self.len {
            let mut cur = self.doc.first_child(self.item(i));
            while let Some(c) = cur {
                cur = self.doc.next_sibling(c);
                if self.doc.kind(c) == NodeKind::Element {
                    self.test_push(c, &mut |n| name.is_empty() || n.name() == name);
                }
            }
        }
        self.run_since(mark)
    }

    /// Attributes of each node, optionally filtered by local name.
    pub fn attribute(&self, name: &str) -> NodeSet<'d> {
        let mark = self.scratch().cursor.get();
        for i in 0..self.len {
            let mut cur = self.doc.first_attribute(self.item(i));
            while let Some(a) = cur {
                cur = self.doc.next_sibling(a);
                self.test_push(a, &mut |n| name.is_empty() || n.name() == name);
            }
        }
        self.run_since(mark)
    }

    /// Data children of each node, optionally filtered by raw value.
    pub fn data(&self, value: &str) -> NodeSet<'d> {
        self.value_children(NodeKind::Data, value)
    }

    /// CDATA children of each node, optionally filtered by raw value.
    pub fn cdata(&self, value: &str) -> NodeSet<'d> {
        self.value_children(NodeKind::CData, value)
    }

    fn value_children(&self, kind: NodeKind, value: &str) -> NodeSet<'d> {
        let mark = self.scratch().cursor.get();
        for i in 0..self.len {
            let mut cur = self.doc.first_child(self.item(i));
            while let Some(c) = cur {
                cur = self.doc.next_sibling(c);
                if self.doc.kind(c) == kind {
                    self.test_push(c, &mut |n| value.is_empty() || n.value() == value);
                }
            }
        }
        self.run_since(mark)
    }

    /// Parent of each node, optionally filtered by local name. Document
    /// nodes are skipped and shared parents appear once.
    pub fn parent(&self, name: &str) -> NodeSet<'d> {
        let mark = self.scratch().cursor.get();
        for i in 0..self.len {
            if let Some(p) = self.doc.parent(self.item(i)) {
                if self.doc.kind(p) != NodeKind::Document {
                    self.test_push_unique(mark, p, &mut |n| name.is_empty() || n.name() == name);
                }
            }
        }
        self.run_since(mark)
    }

    /// Every ancestor of each node, walking towards the root, optionally
    /// filtered by local name. Document nodes are skipped and shared
    /// ancestors appear once.
    pub fn ancestor(&self, name: &str) -> NodeSet<'d> {
        let mark = self.scratch().cursor.get();
        for i in 0..self.len {
            let mut cur = self.doc.parent(self.item(i));
            while let Some(a) = cur {
                cur = self.doc.parent(a);
                if self.doc.kind(a) != NodeKind::Document {
                    self.test_push_unique(mark, a, &mut |n| name.is_empty() || n.name() == name);
                }
            }
        }
        self.run_since(mark)
    }

    /// Element descendants of each node in depth-first (document) order,
    /// optionally filtered by local name.
    pub fn descendant(&self, name: &str) -> NodeSet<'d> {
        let mark = self.scratch().cursor.get();
        for i in 0..self.len {
            for d in self.doc.descendants(self.item(i)) {
                if self.doc.kind(d) == NodeKind::Element {
                    self.test_push(d, &mut |n| name.is_empty() || n.name() == name);
                }
            }
        }
        self.run_since(mark)
    }

    /// Preceding element siblings of each node, nearest first, optionally
    /// filtered by local name.
    pub fn prev(&self, name: &str) -> NodeSet<'d> {
        let mark = self.scratch().cursor.get();
        for i in 0..self.len {
            let mut cur = self.doc.prev_sibling(self.item(i));
            while let Some(s) = cur {
                cur = self.doc.prev_sibling(s);
                if self.doc.kind(s) == NodeKind::Element {
                    self.test_push(s, &mut |n| name.is_empty() || n.name() == name);
                }
            }
        }
        self.run_since(mark)
    }

    /// Following element siblings of each node, nearest first, optionally
    /// filtered by local name.
    pub fn next(&self, name: &str) -> NodeSet<'d> {
        let mark = self.scratch().cursor.get();
        for i in 0..self.len {
            let mut cur = self.doc.next_sibling(self.item(i));
            while let Some(s) = cur {
                cur = self.doc.next_sibling(s);
                if self.doc.kind(s) == NodeKind::Element {
                    self.test_push(s, &mut |n| name.is_empty() || n.name() == name);
                }
            }
        }
        self.run_since(mark)
    }

    /// The members for which `pred` holds. The predicate may itself run
    /// queries on the document (see the module docs).
    pub fn filter<F>(&self, mut pred: F) -> NodeSet<'d>
    where
        F: FnMut(Node<'d>) -> bool,
    {
        let mark = self.scratch().cursor.get();
        for i in 0..self.len {
            self.test_push(self.item(i), &mut pred);
        }
        self.run_since(mark)
    }

    // --- Selection ---

    /// A set holding only the `i`-th member (empty when out of range).
    pub fn nth(&self, i: usize) -> NodeSet<'d> {
        let mark = self.scratch().cursor.get();
        if i < self.len {
            self.scratch().push(self.item(i));
        }
        self.run_since(mark)
    }

    /// A set holding only the first member.
    pub fn first(&self) -> NodeSet<'d> {
        self.nth(0)
    }

    /// A set holding only the last member.
    pub fn last(&self) -> NodeSet<'d> {
        if self.len == 0 {
            self.nth(0)
        } else {
            self.nth(self.len - 1)
        }
    }

    // --- Accessors ---

    /// Number of nodes in the set.
    #[must_use]
    pub fn count(&self) -> usize {
        self.len
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `i`-th member as a node handle.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<Node<'d>> {
        (i < self.len).then(|| self.doc.get(self.item(i)))
    }

    /// The first member as a node handle.
    #[must_use]
    pub fn node(&self) -> Option<Node<'d>> {
        self.get(0)
    }

    /// Copies the member ids into an owned vector, escaping the scratch
    /// buffer's lifetime window.
    #[must_use]
    pub fn dup(&self) -> Vec<NodeId> {
        (0..self.len).map(|i| self.item(i)).collect()
    }

    /// Iterates over the members as node handles.
    pub fn iter(&self) -> Iter<'d> {
        Iter { set: *self, pos: 0 }
    }
}

impl<'d> IntoIterator for NodeSet<'d> {
    type Item = Node<'d>;
    type IntoIter = Iter<'d>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the members of a [`NodeSet`].
pub struct Iter<'d> {
    set: NodeSet<'d>,
    pos: usize,
}

impl<'d> Iterator for Iter<'d> {
    type Item = Node<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.set.get(self.pos)?;
        self.pos += 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.set.len - self.pos.min(self.set.len);
        (rest, Some(rest))
    }
}
