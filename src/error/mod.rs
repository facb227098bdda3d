//! Error types for tokenizing and tree construction.
//!
//! The tokenizer reports malformed input with a [`TextPos`] locating the
//! offending byte. Structural preconditions on tree mutation (attaching a
//! node that already has a parent, relocating a node under its own
//! descendant) are programming errors and panic instead — see the
//! `# Panics` sections on the mutation methods.

use std::fmt;

/// Position in the input text, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPos {
    /// 1-based line number.
    pub row: u32,
    /// 1-based column number (in characters, not bytes).
    pub col: u32,
}

impl TextPos {
    /// Creates a new position.
    #[must_use]
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Computes the position of a byte offset within `text`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let head = &text[..offset.min(text.len())];
        let row = head.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
        let col = match head.rfind('\n') {
            Some(nl) => head[nl + 1..].chars().count() as u32 + 1,
            None => head.chars().count() as u32 + 1,
        };
        Self { row, col }
    }
}

impl fmt::Display for TextPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// The error type returned when tokenizing or parsing fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input violates XML token syntax at the given position.
    Syntax {
        /// What the tokenizer expected or rejected.
        message: &'static str,
        /// Where in the input the problem occurred.
        pos: TextPos,
    },

    /// The input ended inside an open construct (tag, comment, CDATA, ...).
    UnexpectedEof,

    /// An end tag appeared with no matching open element.
    UnexpectedClose {
        /// Where the stray end tag occurred.
        pos: TextPos,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { message, pos } => write!(f, "syntax error at {pos}: {message}"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::UnexpectedClose { pos } => {
                write!(f, "end tag at {pos} has no matching start tag")
            }
        }
    }
}

impl std::error::Error for Error {}
