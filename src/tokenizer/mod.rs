//! Pull-based XML tokenizer.
//!
//! The [`Tokenizer`] advances one token per [`Tokenizer::next`] call and
//! exposes raw slices of the input. It performs no entity or character
//! reference expansion — token text is handed out verbatim, byte for byte,
//! and transcoding is the caller's policy.
//!
//! Element and processing-instruction tokens carry byte positions into the
//! input so a consumer can later re-emit the original text of an unmodified
//! region.
//!
//! # Usage Pattern
//!
//! Call [`Tokenizer::next`] repeatedly until it returns [`Token::Done`].
//! After a [`Token::ElementStart`], the tokenizer emits zero or more
//! [`Token::Attribute`] tokens followed by exactly one [`Token::ElementEnd`]
//! with kind [`ElementEnd::Open`] (`>`) or [`ElementEnd::Empty`] (`/>`).
//!
//! ```
//! use xmlgrove::tokenizer::{Token, Tokenizer};
//!
//! let mut tok = Tokenizer::new("<greeting lang='en'>hi</greeting>");
//! let mut names = Vec::new();
//! loop {
//!     match tok.next().unwrap() {
//!         Token::ElementStart { local, .. } => names.push(local),
//!         Token::Done => break,
//!         _ => {}
//!     }
//! }
//! assert_eq!(names, vec!["greeting"]);
//! ```

use std::ops::Range;

use memchr::{memchr, memmem};

use crate::error::{Error, TextPos};

type Result<T> = std::result::Result<T, Error>;

/// How an element tag was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementEnd {
    /// `>` — the element is open and its content follows.
    Open,
    /// `</name>` — a close tag.
    Close,
    /// `/>` — a self-closing element.
    Empty,
}

/// A single token pulled from the input.
///
/// All string slices borrow from the tokenizer's input and are raw: entity
/// references and character references are not expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'input> {
    /// `<prefix:local` — attributes and an [`Token::ElementEnd`] follow.
    ElementStart {
        /// Namespace prefix, empty if the name has none.
        prefix: &'input str,
        /// Local part of the name.
        local: &'input str,
        /// Byte offset of the `<`.
        start: usize,
    },

    /// `>`, `</name>` or `/>`.
    ElementEnd {
        /// Which terminator was seen.
        kind: ElementEnd,
        /// Byte offset just past the `>`.
        end: usize,
    },

    /// `prefix:local="value"` inside an open tag.
    Attribute {
        /// Namespace prefix, empty if the name has none.
        prefix: &'input str,
        /// Local part of the name.
        local: &'input str,
        /// Raw attribute value, without the quotes.
        value: &'input str,
    },

    /// Character data between tags, whitespace included.
    Text {
        /// The raw text.
        text: &'input str,
    },

    /// `<![CDATA[...]]>` content.
    Cdata {
        /// The raw section content.
        text: &'input str,
    },

    /// `<!-- ... -->` content.
    Comment {
        /// The comment text without delimiters.
        text: &'input str,
    },

    /// `<?target content?>`. The XML declaration itself is consumed
    /// silently and never surfaces as a token.
    Pi {
        /// The PI target.
        target: &'input str,
        /// The PI content, empty if none.
        content: &'input str,
        /// Byte range of the whole `<?...?>` construct.
        span: Range<usize>,
    },

    /// `<!DOCTYPE ...>` with the raw declaration body.
    Doctype {
        /// Everything between `<!DOCTYPE ` and the closing `>`.
        text: &'input str,
    },

    /// End of input.
    Done,
}

#[inline]
fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b':') || b >= 0x80
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// A pull-based tokenizer over a UTF-8 input string.
///
/// The tokenizer can be rebound to a new input with [`Tokenizer::reset`],
/// which rewinds all state without allocating.
pub struct Tokenizer<'input> {
    text: &'input str,
    pos: usize,
    /// Inside an open tag: emit attributes until the terminating `>`/`/>`.
    in_tag: bool,
}

impl<'input> Tokenizer<'input> {
    /// Creates a tokenizer over `input`. A leading UTF-8 BOM is skipped.
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        let mut tok = Self {
            text: "",
            pos: 0,
            in_tag: false,
        };
        tok.reset(input);
        tok
    }

    /// Rebinds the tokenizer to a new input and rewinds it.
    pub fn reset(&mut self, input: &'input str) {
        self.text = input;
        self.pos = if input.starts_with('\u{FEFF}') { 3 } else { 0 };
        self.in_tag = false;
    }

    /// Current byte offset into the input.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Advances to the next token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] on malformed input and
    /// [`Error::UnexpectedEof`] when the input ends inside a construct.
    pub fn next(&mut self) -> Result<Token<'input>> {
        if self.in_tag {
            self.next_in_tag()
        } else {
            self.next_content()
        }
    }

    fn bytes(&self) -> &'input [u8] {
        self.text.as_bytes()
    }

    fn at(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.text[self.pos..].starts_with(prefix)
    }

    fn skip_spaces(&mut self) {
        while self.at(0).is_some_and(is_space) {
            self.pos += 1;
        }
    }

    fn err(&self, message: &'static str) -> Error {
        Error::Syntax {
            message,
            pos: TextPos::from_offset(self.text, self.pos),
        }
    }

    /// Scans a qualified name and splits it at the first `:`.
    fn scan_name(&mut self) -> Result<(&'input str, &'input str)> {
        let start = self.pos;
        match self.at(0) {
            Some(b) if is_name_start(b) => {}
            Some(_) => return Err(self.err("expected a name")),
            None => return Err(Error::UnexpectedEof),
        }
        while self.at(0).is_some_and(is_name_byte) {
            self.pos += 1;
        }
        let qname = &self.text[start..self.pos];
        match qname.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
                Ok((prefix, local))
            }
            Some(_) => Err(self.err("malformed qualified name")),
            None => Ok(("", qname)),
        }
    }

    /// Consumes `needle` starting at the cursor, returning the offset just
    /// past it.
    fn scan_until(&mut self, needle: &str) -> Result<&'input str> {
        let rest = &self.bytes()[self.pos..];
        match memmem::find(rest, needle.as_bytes()) {
            Some(i) => {
                let body = &self.text[self.pos..self.pos + i];
                self.pos += i + needle.len();
                Ok(body)
            }
            None => Err(Error::UnexpectedEof),
        }
    }

    fn next_content(&mut self) -> Result<Token<'input>> {
        if self.pos >= self.text.len() {
            return Ok(Token::Done);
        }

        if self.at(0) != Some(b'<') {
            // Raw character data up to the next `<`.
            let rest = &self.bytes()[self.pos..];
            let end = memchr(b'<', rest).unwrap_or(rest.len());
            let text = &self.text[self.pos..self.pos + end];
            self.pos += end;
            return Ok(Token::Text { text });
        }

        if self.starts_with("<?") {
            return self.scan_pi();
        }
        if self.starts_with("<!--") {
            self.pos += 4;
            let text = self.scan_until("-->")?;
            return Ok(Token::Comment { text });
        }
        if self.starts_with("<![CDATA[") {
            self.pos += 9;
            let text = self.scan_until("]]>")?;
            return Ok(Token::Cdata { text });
        }
        if self.starts_with("<!DOCTYPE") {
            return self.scan_doctype();
        }
        if self.starts_with("</") {
            let start = self.pos;
            self.pos += 2;
            self.scan_name()?;
            self.skip_spaces();
            if self.at(0) != Some(b'>') {
                self.pos = start;
                return Err(self.err("expected '>' in end tag"));
            }
            self.pos += 1;
            return Ok(Token::ElementEnd {
                kind: ElementEnd::Close,
                end: self.pos,
            });
        }

        let start = self.pos;
        self.pos += 1;
        let (prefix, local) = self.scan_name()?;
        self.in_tag = true;
        Ok(Token::ElementStart {
            prefix,
            local,
            start,
        })
    }

    fn next_in_tag(&mut self) -> Result<Token<'input>> {
        self.skip_spaces();
        match self.at(0) {
            Some(b'/') => {
                if self.at(1) != Some(b'>') {
                    return Err(self.err("expected '/>'"));
                }
                self.pos += 2;
                self.in_tag = false;
                Ok(Token::ElementEnd {
                    kind: ElementEnd::Empty,
                    end: self.pos,
                })
            }
            Some(b'>') => {
                self.pos += 1;
                self.in_tag = false;
                Ok(Token::ElementEnd {
                    kind: ElementEnd::Open,
                    end: self.pos,
                })
            }
            Some(_) => {
                let (prefix, local) = self.scan_name()?;
                self.skip_spaces();
                if self.at(0) != Some(b'=') {
                    return Err(self.err("expected '=' after attribute name"));
                }
                self.pos += 1;
                self.skip_spaces();
                let quote = match self.at(0) {
                    Some(q @ (b'"' | b'\'')) => q,
                    Some(_) => return Err(self.err("expected a quoted attribute value")),
                    None => return Err(Error::UnexpectedEof),
                };
                self.pos += 1;
                let rest = &self.bytes()[self.pos..];
                let Some(end) = memchr(quote, rest) else {
                    return Err(Error::UnexpectedEof);
                };
                let value = &self.text[self.pos..self.pos + end];
                self.pos += end + 1;
                Ok(Token::Attribute {
                    prefix,
                    local,
                    value,
                })
            }
            None => Err(Error::UnexpectedEof),
        }
    }

    fn scan_pi(&mut self) -> Result<Token<'input>> {
        let start = self.pos;
        self.pos += 2;
        let name_start = self.pos;
        let (prefix, local) = self.scan_name()?;
        // PI targets have no namespace semantics; keep the raw name.
        let target = &self.text[name_start..self.pos];
        self.skip_spaces();
        let content = self.scan_until("?>")?;
        // The XML declaration is consumed but never reported. A PI target
        // of "xml" is reserved by the XML spec, so this cannot shadow a
        // real processing instruction.
        if prefix.is_empty() && local.eq_ignore_ascii_case("xml") {
            return self.next_content();
        }
        Ok(Token::Pi {
            target,
            content: content.trim_end(),
            span: start..self.pos,
        })
    }

    fn scan_doctype(&mut self) -> Result<Token<'input>> {
        self.pos += 9;
        self.skip_spaces();
        let start = self.pos;
        let mut subset_depth = 0usize;
        loop {
            match self.at(0) {
                Some(b'[') => subset_depth += 1,
                Some(b']') => subset_depth = subset_depth.saturating_sub(1),
                Some(b'>') if subset_depth == 0 => break,
                Some(_) => {}
                None => return Err(Error::UnexpectedEof),
            }
            self.pos += 1;
        }
        let text = self.text[start..self.pos].trim_end();
        self.pos += 1;
        Ok(Token::Doctype { text })
    }
}
