//! # xmlgrove
//!
//! An in-memory XML document tree with arena allocation, a fluent builder,
//! and a chainable path-query engine.
//!
//! The tree stores raw input bytes verbatim: entity and character
//! references are neither expanded on parse nor escaped on print, so
//! reference handling stays a caller policy. Namespace prefixes are kept
//! as syntax (`prefix:local` splitting) without resolution.
//!
//! Documents own all of their nodes in chunked slab storage; node ids stay
//! valid for the document's lifetime, and [`Document::reset`] rewinds the
//! allocator while keeping buffer capacity, making repeated parse cycles
//! allocation-free in the steady state.
//!
//! ## Quick Start
//!
//! ```
//! use xmlgrove::Document;
//!
//! let mut doc = Document::new();
//! doc.parse("<root><child>Hello</child></root>").unwrap();
//! let child = doc.query().descendant("child").node().unwrap();
//! assert_eq!(child.value(), "Hello");
//! ```
//!
//! Building programmatically:
//!
//! ```
//! use xmlgrove::{serial, Document};
//!
//! let mut doc = Document::new();
//! let mut tree = doc.tree();
//! let mut item = tree.element(None, "item", Some("tea"));
//! item.attribute(None, "id", "7");
//! assert_eq!(serial::serialize(&doc), "<item id=\"7\">tea</item>\n");
//! ```

pub mod error;
pub mod query;
pub mod serial;
pub mod tokenizer;
pub mod tree;

// Re-export primary types at the crate root for convenience.
pub use error::Error;
pub use query::NodeSet;
pub use tree::{ArenaStats, Document, Node, NodeId, NodeKind, NodeMut};
