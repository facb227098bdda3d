//! Tree construction from the pull tokenizer.
//!
//! The builder keeps a current-parent cursor and mutates the tree
//! top-down, one token at a time. All token text is copied into node-owned
//! buffers, so the input does not have to outlive the document.
//!
//! Whitespace-only text between tags is dropped; CDATA sections are always
//! kept, whatever their content.

use crate::error::{Error, TextPos};
use crate::tokenizer::{ElementEnd, Token, Tokenizer};

use super::node::NodeKind;
use super::{Document, NodeId};

pub(super) fn build(doc: &mut Document, input: &str) -> Result<(), Error> {
    doc.reset();
    let mut tokens = Tokenizer::new(input);
    let mut cursor = doc.root();

    loop {
        match tokens.next()? {
            Token::ElementStart {
                prefix,
                local,
                start,
            } => {
                let id = alloc_named(doc, NodeKind::Element, prefix, local);
                doc.data_mut(id).src_start = start;
                doc.link_child_tail(cursor, id);
                cursor = id;
            }
            Token::ElementEnd { kind, end } => match kind {
                // `>` just terminates the attribute list; content follows.
                ElementEnd::Open => {}
                ElementEnd::Close | ElementEnd::Empty => {
                    if cursor == doc.root() {
                        return Err(Error::UnexpectedClose {
                            pos: TextPos::from_offset(input, end),
                        });
                    }
                    doc.data_mut(cursor).src_end = Some(end);
                    cursor = doc.parent(cursor).unwrap_or_else(|| doc.root());
                }
            },
            Token::Attribute {
                prefix,
                local,
                value,
            } => {
                let id = alloc_named(doc, NodeKind::Attribute, prefix, local);
                doc.data_mut(id).value.push_str(value);
                doc.link_attr_tail(cursor, id);
            }
            Token::Text { text } => {
                if !text.trim().is_empty() {
                    append_value(doc, cursor, NodeKind::Data, text);
                }
            }
            Token::Cdata { text } => {
                append_value(doc, cursor, NodeKind::CData, text);
            }
            Token::Comment { text } => {
                append_value(doc, cursor, NodeKind::Comment, text);
            }
            Token::Pi {
                target,
                content,
                span,
            } => {
                let id = alloc_named(doc, NodeKind::Pi, "", target);
                let data = doc.data_mut(id);
                data.value.push_str(content);
                data.src_start = span.start;
                data.src_end = Some(span.end);
                doc.link_child_tail(cursor, id);
            }
            Token::Doctype { text } => {
                append_value(doc, cursor, NodeKind::Doctype, text);
            }
            Token::Done => return Ok(()),
        }
    }
}

fn alloc_named(doc: &mut Document, kind: NodeKind, prefix: &str, local: &str) -> NodeId {
    let id = doc.alloc(kind);
    let data = doc.data_mut(id);
    data.prefix.push_str(prefix);
    data.local.push_str(local);
    id
}

fn append_value(doc: &mut Document, parent: NodeId, kind: NodeKind, value: &str) {
    let id = doc.alloc(kind);
    doc.data_mut(id).value.push_str(value);
    doc.link_child_tail(parent, id);
}
