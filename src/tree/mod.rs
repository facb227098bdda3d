//! Arena-based XML document tree.
//!
//! All nodes live in chunked slab storage owned by the [`Document`] and are
//! referenced by [`NodeId`] — a newtype over `NonZeroU32`. Chunks never
//! move, so ids stay valid for the life of the document and across
//! [`Document::reset`], which rewinds the allocator while keeping storage
//! (and per-node buffer capacity) for reuse.
//!
//! Navigation links — parent, first/last child, prev/next sibling, and a
//! separate first/last attribute pair — are arena indices. Attributes are
//! ordinary nodes on their element's attribute list; they never appear on a
//! child list and never have children of their own.
//!
//! # Reset contract
//!
//! `reset` recycles every node except the root. Ids handed out before a
//! reset must not be used afterwards: they may now address recycled slots.
//!
//! # Examples
//!
//! ```
//! use xmlgrove::Document;
//!
//! let mut doc = Document::new();
//! let mut tree = doc.tree();
//! let mut item = tree.element(None, "item", Some("text"));
//! item.attribute(None, "id", "1");
//! let item = item.id();
//! assert_eq!(doc.value(item), "text");
//! assert_eq!(doc.get(item).attribute("id"), Some("1"));
//! ```

mod arena;
mod build;
mod node;

pub use node::NodeKind;

use std::num::NonZeroU32;

use crate::error::Error;
use crate::query::QueryScratch;

use arena::{Arena, DEFAULT_CHUNK_SIZE};
use node::NodeData;

/// A typed index into a document's node arena.
///
/// `NodeId` is a newtype over `NonZeroU32`, so `Option<NodeId>` costs no
/// extra space (niche optimization). Ids are only meaningful together with
/// the `Document` whose arena allocated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// The document root, arena slot 0.
    pub(crate) const ROOT: NodeId = NodeId(NonZeroU32::MIN);

    /// Creates a `NodeId` from a raw arena slot.
    #[allow(clippy::expect_used, clippy::cast_possible_truncation)]
    pub(crate) fn from_slot(slot: usize) -> Self {
        Self(NonZeroU32::new(slot as u32 + 1).expect("arena slot out of range"))
    }

    /// Returns the raw arena slot.
    pub(crate) fn slot(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// Arena occupancy counters, for observing reuse across reset/reparse
/// cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Number of storage chunks allocated.
    pub chunk_count: usize,
    /// Node slots currently in use (including the root).
    pub nodes_in_use: usize,
    /// Node slots ever materialized, in use or awaiting recycling.
    pub nodes_allocated: usize,
}

/// An XML document.
///
/// The `Document` owns every node in its arena plus the scratch state of
/// the query engine. Navigation goes through `&Document`, mutation through
/// `&mut Document` (directly or via the fluent [`NodeMut`] builder).
pub struct Document {
    arena: Arena,
    pub(crate) scratch: QueryScratch,
}

impl Document {
    /// Creates an empty document holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Creates an empty document with a custom arena chunk size (clamped
    /// to a minimum of 50 nodes per chunk).
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            arena: Arena::with_chunk_size(chunk_size),
            scratch: QueryScratch::new(),
        }
    }

    /// Parses `input`, replacing this document's contents.
    ///
    /// The document is reset first, so a parse into a previously-used
    /// document recycles its storage. Input text is copied into node-owned
    /// buffers; `input` need not outlive the document.
    ///
    /// # Errors
    ///
    /// Returns the tokenizer's error on malformed input, or
    /// [`Error::UnexpectedClose`] for an end tag with no open element. A
    /// partial (but structurally valid) tree remains in the document.
    pub fn parse(&mut self, input: &str) -> Result<(), Error> {
        build::build(self, input)
    }

    /// Empties the document: the root's child and attribute lists are
    /// cleared and the arena rewinds, keeping its storage for reuse.
    ///
    /// Ids handed out before the reset become invalid.
    pub fn reset(&mut self) -> &mut Self {
        self.arena.reset();
        let root = self.arena.get_mut(NodeId::ROOT);
        root.first_child = None;
        root.last_child = None;
        root.first_attr = None;
        root.last_attr = None;
        root.src_end = None;
        self
    }

    /// Prepends an `<?xml version="1.0" encoding="..."?>` processing
    /// instruction as the root's first child. The encoding defaults to
    /// UTF-8.
    pub fn header(&mut self, encoding: Option<&str>) {
        let id = self.arena.alloc(NodeKind::Pi);
        let data = self.arena.get_mut(id);
        data.local.push_str("xml");
        data.value.push_str("version=\"1.0\" encoding=\"");
        data.value.push_str(encoding.unwrap_or("UTF-8"));
        data.value.push('"');
        self.prepend_child(NodeId::ROOT, id);
    }

    /// The root node (kind [`NodeKind::Document`]).
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// A fluent builder positioned at the root.
    pub fn tree(&mut self) -> NodeMut<'_> {
        NodeMut {
            doc: self,
            id: NodeId::ROOT,
        }
    }

    /// The most recently appended top-level element: the root's child list
    /// is walked in reverse and the first element found is returned.
    #[must_use]
    pub fn top_element(&self) -> Option<NodeId> {
        let mut cur = self.arena.get(NodeId::ROOT).last_child;
        while let Some(id) = cur {
            let data = self.arena.get(id);
            if data.kind == NodeKind::Element {
                return Some(id);
            }
            cur = data.prev_sibling;
        }
        None
    }

    /// A read-only handle for `id`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Node<'_> {
        Node { doc: self, id }
    }

    /// A mutable handle for `id`.
    pub fn get_mut(&mut self, id: NodeId) -> NodeMut<'_> {
        NodeMut { doc: self, id }
    }

    /// Live node count, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Arena occupancy counters.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            chunk_count: self.arena.chunk_count(),
            nodes_in_use: self.arena.len(),
            nodes_allocated: self.arena.allocated(),
        }
    }

    // --- Field access ---

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        self.arena.get(id)
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        self.arena.get_mut(id)
    }

    /// The original-input byte span of a node, if still valid (neither the
    /// node nor anything below it mutated since parse).
    #[must_use]
    pub fn source_span(&self, id: NodeId) -> Option<(usize, usize)> {
        let data = self.arena.get(id);
        data.src_end.map(|end| (data.src_start, end))
    }

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.arena.get(id).kind
    }

    /// Returns a node's raw value. For elements this is the element's own
    /// (normally empty) value field; see [`Document::value`] for the
    /// data-child lookup.
    #[must_use]
    pub fn raw_value(&self, id: NodeId) -> &str {
        &self.arena.get(id).value
    }

    /// Returns a node's value. For an element this is the raw value of its
    /// first data or CDATA child (empty if it has none); for every other
    /// kind, the node's own raw value.
    #[must_use]
    pub fn value(&self, id: NodeId) -> &str {
        let data = self.arena.get(id);
        if data.kind != NodeKind::Element {
            return &data.value;
        }
        let mut cur = data.first_child;
        while let Some(c) = cur {
            let child = self.arena.get(c);
            if matches!(child.kind, NodeKind::Data | NodeKind::CData) {
                return &child.value;
            }
            cur = child.next_sibling;
        }
        ""
    }

    /// Sets a node's value. For an element with a data child, the first
    /// data child's value is replaced; otherwise the node's own value is
    /// set. Invalidates cached source spans up to the root.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        let target = if self.arena.get(id).kind == NodeKind::Element {
            let mut found = None;
            let mut cur = self.arena.get(id).first_child;
            while let Some(c) = cur {
                let child = self.arena.get(c);
                if child.kind == NodeKind::Data {
                    found = Some(c);
                    break;
                }
                cur = child.next_sibling;
            }
            found.unwrap_or(id)
        } else {
            id
        };
        let data = self.arena.get_mut(target);
        data.value.clear();
        data.value.push_str(value);
        self.touch(id);
    }

    // --- Navigation ---

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).parent
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).first_child
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).last_child
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).next_sibling
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).prev_sibling
    }

    /// Returns the first attribute of a node.
    #[must_use]
    pub fn first_attribute(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).first_attr
    }

    /// Returns the last attribute of a node.
    #[must_use]
    pub fn last_attribute(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).last_attr
    }

    /// Returns an iterator over the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.arena.get(id).first_child,
        }
    }

    /// Returns an iterator over the attributes of a node.
    pub fn attributes(&self, id: NodeId) -> Attributes<'_> {
        Attributes {
            doc: self,
            next: self.arena.get(id).first_attr,
        }
    }

    /// Returns an iterator over a node's ancestors, starting at its parent.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.arena.get(id).parent,
        }
    }

    /// Returns a depth-first iterator over the descendants of a node (the
    /// node itself excluded).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.arena.get(id).first_child,
        }
    }

    /// Counts the siblings preceding `id` in its list. O(n).
    #[must_use]
    pub fn position(&self, id: NodeId) -> usize {
        let mut n = 0;
        let mut cur = self.arena.get(id).prev_sibling;
        while let Some(p) = cur {
            n += 1;
            cur = self.arena.get(p).prev_sibling;
        }
        n
    }

    // --- Allocation ---

    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.arena.alloc(kind)
    }

    fn alloc_named(&mut self, kind: NodeKind, prefix: Option<&str>, local: &str) -> NodeId {
        let id = self.arena.alloc(kind);
        let data = self.arena.get_mut(id);
        if let Some(p) = prefix {
            data.prefix.push_str(p);
        }
        data.local.push_str(local);
        id
    }

    fn alloc_value(&mut self, kind: NodeKind, value: &str) -> NodeId {
        let id = self.arena.alloc(kind);
        self.arena.get_mut(id).value.push_str(value);
        id
    }

    // --- Link surgery (no span invalidation; used by the parse driver) ---

    pub(crate) fn link_child_tail(&mut self, parent: NodeId, child: NodeId) {
        self.arena.get_mut(child).parent = Some(parent);
        if let Some(last) = self.arena.get(parent).last_child {
            self.arena.get_mut(last).next_sibling = Some(child);
            self.arena.get_mut(child).prev_sibling = Some(last);
        } else {
            self.arena.get_mut(parent).first_child = Some(child);
        }
        self.arena.get_mut(parent).last_child = Some(child);
    }

    fn link_child_head(&mut self, parent: NodeId, child: NodeId) {
        self.arena.get_mut(child).parent = Some(parent);
        if let Some(first) = self.arena.get(parent).first_child {
            self.arena.get_mut(first).prev_sibling = Some(child);
            self.arena.get_mut(child).next_sibling = Some(first);
        } else {
            self.arena.get_mut(parent).last_child = Some(child);
        }
        self.arena.get_mut(parent).first_child = Some(child);
    }

    pub(crate) fn link_attr_tail(&mut self, parent: NodeId, attr: NodeId) {
        self.arena.get_mut(attr).parent = Some(parent);
        if let Some(last) = self.arena.get(parent).last_attr {
            self.arena.get_mut(last).next_sibling = Some(attr);
            self.arena.get_mut(attr).prev_sibling = Some(last);
        } else {
            self.arena.get_mut(parent).first_attr = Some(attr);
        }
        self.arena.get_mut(parent).last_attr = Some(attr);
    }

    // --- Insertion primitives ---

    fn assert_can_hold_children(&self, parent: NodeId) {
        assert!(
            self.arena.get(parent).kind != NodeKind::Attribute,
            "attribute nodes cannot have children"
        );
    }

    /// Appends `child` at the tail of `parent`'s child list.
    ///
    /// # Panics
    ///
    /// Panics if `child` already has a parent (detach it first), if `child`
    /// is an attribute node (attributes belong on the attribute list), or
    /// if `parent` is an attribute node.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.assert_can_hold_children(parent);
        let data = self.arena.get(child);
        assert!(data.parent.is_none(), "node already has a parent; detach it first");
        assert!(
            data.kind != NodeKind::Attribute,
            "attribute nodes belong on the attribute list"
        );
        self.link_child_tail(parent, child);
        self.touch(child);
    }

    /// Prepends `child` at the head of `parent`'s child list.
    ///
    /// # Panics
    ///
    /// Same preconditions as [`Document::append_child`].
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.assert_can_hold_children(parent);
        let data = self.arena.get(child);
        assert!(data.parent.is_none(), "node already has a parent; detach it first");
        assert!(
            data.kind != NodeKind::Attribute,
            "attribute nodes belong on the attribute list"
        );
        self.link_child_head(parent, child);
        self.touch(child);
    }

    /// Appends `attr` at the tail of `parent`'s attribute list.
    ///
    /// # Panics
    ///
    /// Panics if `attr` already has a parent, is not an attribute node, or
    /// if `parent` is itself an attribute node.
    pub fn append_attr(&mut self, parent: NodeId, attr: NodeId) {
        self.assert_can_hold_children(parent);
        let data = self.arena.get(attr);
        assert!(data.parent.is_none(), "node already has a parent; detach it first");
        assert!(
            data.kind == NodeKind::Attribute,
            "only attribute nodes go on the attribute list"
        );
        self.link_attr_tail(parent, attr);
        self.touch(attr);
    }

    /// Attaches a parentless node under `parent`, routing attributes to the
    /// attribute list and everything else to the child list.
    fn attach(&mut self, parent: NodeId, id: NodeId) {
        if self.arena.get(id).kind == NodeKind::Attribute {
            self.append_attr(parent, id);
        } else {
            self.append_child(parent, id);
        }
    }

    /// Detaches a node from its parent's child or attribute list. A node
    /// with no parent is left untouched. The detached subtree stays alive
    /// in the arena and can be re-attached.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.arena.get(id).parent else {
            return;
        };
        // Invalidate spans while the parent chain is still reachable.
        self.touch(id);

        let is_attr = self.arena.get(id).kind == NodeKind::Attribute;
        let prev = self.arena.get(id).prev_sibling;
        let next = self.arena.get(id).next_sibling;

        match prev {
            Some(p) => self.arena.get_mut(p).next_sibling = next,
            None if is_attr => self.arena.get_mut(parent).first_attr = next,
            None => self.arena.get_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.arena.get_mut(n).prev_sibling = prev,
            None if is_attr => self.arena.get_mut(parent).last_attr = prev,
            None => self.arena.get_mut(parent).last_child = prev,
        }

        let data = self.arena.get_mut(id);
        data.parent = None;
        data.prev_sibling = None;
        data.next_sibling = None;
    }

    /// Alias for [`Document::detach`].
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    // --- Grafting ---

    /// Deep-clones the subtree rooted at `src` in `src_doc` into this
    /// document and attaches it under `parent` (on the attribute list if
    /// the subtree root is an attribute). Returns the new subtree root.
    ///
    /// The clone owns its own buffers: later mutation of either document
    /// leaves the other unchanged.
    pub fn copy_into(&mut self, parent: NodeId, src_doc: &Document, src: NodeId) -> NodeId {
        let id = self.clone_foreign(src_doc, src);
        self.attach(parent, id);
        id
    }

    /// Deep-clones the subtree rooted at `src` within this document and
    /// attaches the clone under `parent`. Returns the new subtree root.
    pub fn duplicate(&mut self, parent: NodeId, src: NodeId) -> NodeId {
        let id = self.clone_local(src);
        self.attach(parent, id);
        id
    }

    /// Moves `id` (with its subtree) under `new_parent` within this
    /// document: detach, then re-attach.
    ///
    /// # Panics
    ///
    /// Panics if `new_parent` is `id` itself or one of its descendants.
    pub fn relocate(&mut self, new_parent: NodeId, id: NodeId) {
        assert!(
            new_parent != id && self.ancestors(new_parent).all(|a| a != id),
            "cannot relocate a node under its own subtree"
        );
        self.detach(id);
        self.attach(new_parent, id);
    }

    fn clone_shallow(&mut self, src: &NodeData) -> NodeId {
        let id = self.arena.alloc(src.kind);
        let data = self.arena.get_mut(id);
        data.prefix.push_str(&src.prefix);
        data.local.push_str(&src.local);
        data.value.push_str(&src.value);
        id
    }

    fn clone_local(&mut self, src: NodeId) -> NodeId {
        let (kind, prefix, local, value) = {
            let d = self.arena.get(src);
            (d.kind, d.prefix.clone(), d.local.clone(), d.value.clone())
        };
        let id = self.arena.alloc(kind);
        let data = self.arena.get_mut(id);
        data.prefix = prefix;
        data.local = local;
        data.value = value;

        let mut attr = self.arena.get(src).first_attr;
        while let Some(a) = attr {
            attr = self.arena.get(a).next_sibling;
            let clone = self.clone_local(a);
            self.link_attr_tail(id, clone);
        }
        let mut child = self.arena.get(src).first_child;
        while let Some(c) = child {
            child = self.arena.get(c).next_sibling;
            let clone = self.clone_local(c);
            self.link_child_tail(id, clone);
        }
        id
    }

    fn clone_foreign(&mut self, src_doc: &Document, src: NodeId) -> NodeId {
        let src_data = src_doc.arena.get(src);
        let id = self.clone_shallow(src_data);

        let mut attr = src_data.first_attr;
        while let Some(a) = attr {
            attr = src_doc.arena.get(a).next_sibling;
            let clone = self.clone_foreign(src_doc, a);
            self.link_attr_tail(id, clone);
        }
        let mut child = src_data.first_child;
        while let Some(c) = child {
            child = src_doc.arena.get(c).next_sibling;
            let clone = self.clone_foreign(src_doc, c);
            self.link_child_tail(id, clone);
        }
        id
    }

    // --- Serialization cache ---

    /// Invalidates cached source spans on `id` and every ancestor up to
    /// and including the root. The serializer may emit original input text
    /// verbatim only for nodes whose span survived unmutated.
    pub(crate) fn touch(&mut self, id: NodeId) {
        let mut cur = Some(id);
        while let Some(c) = cur {
            let data = self.arena.get_mut(c);
            data.src_end = None;
            cur = data.parent;
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// --- Read-only handle ---

/// A read-only handle to a node: a `Copy` pair of document reference and
/// id, in the style of read-only DOM crates.
#[derive(Clone, Copy)]
pub struct Node<'d> {
    pub(crate) doc: &'d Document,
    pub(crate) id: NodeId,
}

impl<'d> Node<'d> {
    /// The node's id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The owning document.
    #[must_use]
    pub fn document(&self) -> &'d Document {
        self.doc
    }

    /// The node's kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.doc.data(self.id).kind
    }

    /// The namespace prefix, empty if the name has none.
    #[must_use]
    pub fn prefix(&self) -> &'d str {
        &self.doc.data(self.id).prefix
    }

    /// The local name (element/attribute name, PI target).
    #[must_use]
    pub fn name(&self) -> &'d str {
        &self.doc.data(self.id).local
    }

    /// The qualified name, composed as `prefix:local` when a prefix is
    /// present.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        let data = self.doc.data(self.id);
        if data.prefix.is_empty() {
            data.local.clone()
        } else {
            format!("{}:{}", data.prefix, data.local)
        }
    }

    /// The node's value; see [`Document::value`] for element semantics.
    #[must_use]
    pub fn value(&self) -> &'d str {
        self.doc.value(self.id)
    }

    /// The value of the attribute with the given local name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'d str> {
        self.attributes()
            .find(|a| a.name() == name)
            .map(|a| &a.doc.data(a.id).value[..])
    }

    /// Whether an attribute with the given prefix and local name exists.
    /// An empty `prefix` matches attributes without one.
    #[must_use]
    pub fn has_attribute(&self, prefix: &str, name: &str) -> bool {
        self.attributes()
            .any(|a| a.name() == name && a.prefix() == prefix)
    }

    /// The parent node.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'d>> {
        self.doc.parent(self.id).map(|id| self.doc.get(id))
    }

    /// The first child.
    #[must_use]
    pub fn first_child(&self) -> Option<Node<'d>> {
        self.doc.first_child(self.id).map(|id| self.doc.get(id))
    }

    /// The last child.
    #[must_use]
    pub fn last_child(&self) -> Option<Node<'d>> {
        self.doc.last_child(self.id).map(|id| self.doc.get(id))
    }

    /// The previous sibling.
    #[must_use]
    pub fn prev_sibling(&self) -> Option<Node<'d>> {
        self.doc.prev_sibling(self.id).map(|id| self.doc.get(id))
    }

    /// The next sibling.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Node<'d>> {
        self.doc.next_sibling(self.id).map(|id| self.doc.get(id))
    }

    /// Iterates over child nodes.
    pub fn children(&self) -> impl Iterator<Item = Node<'d>> {
        let doc = self.doc;
        doc.children(self.id).map(move |id| doc.get(id))
    }

    /// Iterates over attribute nodes.
    pub fn attributes(&self) -> impl Iterator<Item = Node<'d>> {
        let doc = self.doc;
        doc.attributes(self.id).map(move |id| doc.get(id))
    }

    /// Iterates over ancestors, starting at the parent.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'d>> {
        let doc = self.doc;
        doc.ancestors(self.id).map(move |id| doc.get(id))
    }

    /// Iterates over descendants, depth-first, the node itself excluded.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'d>> {
        let doc = self.doc;
        doc.descendants(self.id).map(move |id| doc.get(id))
    }

    /// Counts the siblings preceding this node.
    #[must_use]
    pub fn position(&self) -> usize {
        self.doc.position(self.id)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

// --- Fluent builder handle ---

/// A mutable handle to a node, carrying the fluent builder surface.
///
/// Child-creating methods return a handle to the new child (so nesting
/// reads top-down); attribute and leaf-content methods return `&mut Self`
/// for chaining on the same node.
pub struct NodeMut<'d> {
    doc: &'d mut Document,
    id: NodeId,
}

impl NodeMut<'_> {
    /// The node's id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// A read-only view of this node.
    #[must_use]
    pub fn as_node(&self) -> Node<'_> {
        Node {
            doc: self.doc,
            id: self.id,
        }
    }

    /// Appends an element child. When `value` is given, the element gets a
    /// data child holding it. Returns a handle to the new element.
    pub fn element(&mut self, prefix: Option<&str>, local: &str, value: Option<&str>) -> NodeMut<'_> {
        let id = self.doc.alloc_named(NodeKind::Element, prefix, local);
        self.doc.append_child(self.id, id);
        if let Some(v) = value {
            let data = self.doc.alloc_value(NodeKind::Data, v);
            self.doc.append_child(id, data);
        }
        NodeMut { doc: self.doc, id }
    }

    /// Appends an attribute to this node's attribute list.
    pub fn attribute(&mut self, prefix: Option<&str>, local: &str, value: &str) -> &mut Self {
        let id = self.doc.alloc_named(NodeKind::Attribute, prefix, local);
        self.doc.data_mut(id).value.push_str(value);
        self.doc.append_attr(self.id, id);
        self
    }

    /// Appends a data (character content) child.
    pub fn data(&mut self, value: &str) -> &mut Self {
        let id = self.doc.alloc_value(NodeKind::Data, value);
        self.doc.append_child(self.id, id);
        self
    }

    /// Appends a CDATA child.
    pub fn cdata(&mut self, value: &str) -> &mut Self {
        let id = self.doc.alloc_value(NodeKind::CData, value);
        self.doc.append_child(self.id, id);
        self
    }

    /// Appends a comment child.
    pub fn comment(&mut self, value: &str) -> &mut Self {
        let id = self.doc.alloc_value(NodeKind::Comment, value);
        self.doc.append_child(self.id, id);
        self
    }

    /// Appends a processing-instruction child. The first whitespace splits
    /// `value` into target and content.
    pub fn pi(&mut self, value: &str) -> &mut Self {
        let (target, content) = match value.split_once(char::is_whitespace) {
            Some((t, c)) => (t, c.trim_start()),
            None => (value, ""),
        };
        let id = self.doc.alloc_named(NodeKind::Pi, None, target);
        self.doc.data_mut(id).value.push_str(content);
        self.doc.append_child(self.id, id);
        self
    }

    /// Appends a doctype child.
    pub fn doctype(&mut self, value: &str) -> &mut Self {
        let id = self.doc.alloc_value(NodeKind::Doctype, value);
        self.doc.append_child(self.id, id);
        self
    }

    /// Sets this node's value; see [`Document::set_value`].
    pub fn set_value(&mut self, value: &str) -> &mut Self {
        self.doc.set_value(self.id, value);
        self
    }

    /// Detaches this node from its parent. The handle stays usable; the
    /// subtree can be re-attached elsewhere.
    pub fn detach(&mut self) -> &mut Self {
        self.doc.detach(self.id);
        self
    }

    /// Deep-clones a subtree from another document under this node; see
    /// [`Document::copy_into`].
    pub fn copy_from(&mut self, src_doc: &Document, src: NodeId) -> NodeId {
        self.doc.copy_into(self.id, src_doc, src)
    }

    /// Deep-clones a subtree of this document under this node; see
    /// [`Document::duplicate`].
    pub fn duplicate(&mut self, src: NodeId) -> NodeId {
        self.doc.duplicate(self.id, src)
    }

    /// Moves a node of this document under this node; see
    /// [`Document::relocate`].
    pub fn relocate(&mut self, child: NodeId) -> &mut Self {
        self.doc.relocate(self.id, child);
        self
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.data(current).next_sibling;
        Some(current)
    }
}

/// Iterator over the attributes of a node.
pub struct Attributes<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl Iterator for Attributes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.data(current).next_sibling;
        Some(current)
    }
}

/// Iterator over a node's ancestors.
pub struct Ancestors<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.data(current).parent;
        Some(current)
    }
}

/// Depth-first iterator over the descendants of a node.
pub struct Descendants<'d> {
    doc: &'d Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        self.next = if let Some(child) = self.doc.data(current).first_child {
            Some(child)
        } else if let Some(sibling) = self.doc.data(current).next_sibling {
            Some(sibling)
        } else {
            let mut ancestor = self.doc.data(current).parent;
            loop {
                let Some(a) = ancestor else { break None };
                if a == self.root {
                    break None;
                }
                if let Some(sibling) = self.doc.data(a).next_sibling {
                    break Some(sibling);
                }
                ancestor = self.doc.data(a).parent;
            }
        };

        Some(current)
    }
}
