//! Node storage records.
//!
//! [`NodeKind`] tags what a node represents; all payload lives in flat
//! fields on [`NodeData`] so that the per-node string buffers survive slot
//! recycling — an arena reset clears their length but keeps their capacity.

use super::NodeId;

/// The kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document node — exactly one per document, always the tree root.
    Document,
    /// An element, e.g. `<item>`.
    Element,
    /// An attribute on an element, e.g. `id="1"`. Lives on its element's
    /// attribute list, never on a child list, and never has children.
    Attribute,
    /// Character data between tags.
    Data,
    /// A `<![CDATA[...]]>` section.
    CData,
    /// A `<!-- ... -->` comment.
    Comment,
    /// A processing instruction, e.g. `<?target content?>`.
    Pi,
    /// A `<!DOCTYPE ...>` declaration.
    Doctype,
}

/// Storage for a single node in the arena.
///
/// Navigation links are arena indices; names and values are owned buffers
/// holding raw input bytes verbatim (no entity expansion).
#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    /// Namespace prefix, empty if the name has none.
    pub(crate) prefix: String,
    /// Local name (element/attribute name, PI target).
    pub(crate) local: String,
    /// Raw value. For elements this is unused by the serializer — an
    /// element's value is the value of its first data child.
    pub(crate) value: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) first_attr: Option<NodeId>,
    pub(crate) last_attr: Option<NodeId>,
    /// Byte offset of this node's first byte in the original input.
    pub(crate) src_start: usize,
    /// Byte offset just past this node's last byte in the original input.
    /// `None` means the node (or something below it) was mutated since
    /// parse and must be re-serialized from its fields.
    pub(crate) src_end: Option<usize>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            prefix: String::new(),
            local: String::new(),
            value: String::new(),
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
            first_attr: None,
            last_attr: None,
            src_start: 0,
            src_end: None,
        }
    }

    /// Clears a recycled slot for reuse: links and logical string lengths
    /// are reset, string capacity is retained.
    pub(crate) fn recycle(&mut self, kind: NodeKind) {
        self.kind = kind;
        self.prefix.clear();
        self.local.clear();
        self.value.clear();
        self.parent = None;
        self.prev_sibling = None;
        self.next_sibling = None;
        self.first_child = None;
        self.last_child = None;
        self.first_attr = None;
        self.last_attr = None;
        self.src_start = 0;
        self.src_end = None;
    }
}
