//! Low-level input handling for the round-trip parser.
//!
//! [`ParserInput`] wraps the source text with position tracking (line,
//! column, byte offset) and the scanning primitives the parser needs. The
//! parser works on byte offsets so that every construct can be sliced back
//! out of the source verbatim.

use std::borrow::Cow;

use crate::error::{ParseError, SourceLocation};

/// A snapshot of the input position.
///
/// Obtained via [`ParserInput::save_position`]; used to report errors at
/// the start of the construct that failed rather than where scanning gave up.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SavedPosition {
    pos: usize,
    line: u32,
    column: u32,
}

pub(crate) struct ParserInput<'a> {
    /// The complete source text.
    source: &'a str,
    /// `source` as bytes.
    input: &'a [u8],
    /// Current byte offset in `input`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, in characters).
    column: u32,
}

impl<'a> ParserInput<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            input: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
            byte_offset: self.pos,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the source text between two byte offsets.
    ///
    /// Offsets always come from positions the scanner stopped at, which sit
    /// on character boundaries because every delimiter is ASCII.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    pub fn save_position(&self) -> SavedPosition {
        SavedPosition {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    // -- Peek operations --

    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    pub fn looking_at(&self, s: &[u8]) -> bool {
        self.remaining().starts_with(s)
    }

    /// Byte offset, relative to the current position, of the next
    /// occurrence of `needle`.
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }
        self.remaining()
            .windows(needle.len())
            .position(|w| w == needle)
    }

    // -- Advance operations --

    /// Advances the position by `count` bytes, updating line/column.
    pub fn advance(&mut self, count: usize) {
        let end = (self.pos + count).min(self.input.len());
        for &b in &self.input[self.pos..end] {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if b & 0xC0 != 0x80 {
                // continuation bytes do not start a new column
                self.column += 1;
            }
        }
        self.pos = end;
    }

    /// Advances to the end of the input.
    pub fn advance_to_end(&mut self) {
        self.advance(self.input.len() - self.pos);
    }

    /// Consumes whitespace and returns it.
    pub fn skip_whitespace(&mut self) -> &'a str {
        let start = self.pos;
        let n = self
            .remaining()
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        self.advance(n);
        self.slice(start, self.pos)
    }

    /// Consumes bytes while `pred` holds and returns them.
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        let n = self.remaining().iter().take_while(|&&b| pred(b)).count();
        self.advance(n);
        self.slice(start, self.pos)
    }

    // -- Errors --

    /// Creates an error at the current position.
    pub fn fatal(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.save_position(), message)
    }

    /// Creates an error at a saved position.
    pub fn error_at(&self, at: SavedPosition, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: SourceLocation {
                line: at.line,
                column: at.column,
                byte_offset: at.pos,
            },
            source: self.source.to_string(),
        }
    }
}

/// Decodes the five built-in entity references.
///
/// Replacement runs in the order `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&amp;`
/// so that `&amp;lt;` decodes to `&lt;` and not `<`. Other references,
/// numeric ones included, are left as written.
pub(crate) fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(
        raw.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    )
}

/// Reads a `name="value"` pseudo-attribute out of an XML declaration body.
pub(crate) fn pseudo_attribute(decl: &str, name: &str) -> Option<String> {
    let mut search = decl;
    loop {
        let at = search.find(name)?;
        let preceded_by_space = search[..at]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        let after = search[at + name.len()..].trim_start();
        if preceded_by_space {
            if let Some(rest) = after.strip_prefix('=') {
                let rest = rest.trim_start();
                let quote = rest.chars().next().filter(|&c| c == '"' || c == '\'')?;
                let value = &rest[1..];
                let end = value.find(quote)?;
                return Some(value[..end].to_string());
            }
        }
        search = &search[at + name.len()..];
    }
}
