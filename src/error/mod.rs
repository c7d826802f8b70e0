//! Error types for parsing, tree editing, and byte output.
//!
//! Parse errors carry line, column, and byte offset information plus the
//! complete input so callers can render context around the failure. Writing
//! a tree to text never fails; writing to a byte sink can, and reports a
//! separate [`SerializeError`].

use std::fmt;

/// Source location within an XML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The error type returned when XML parsing fails.
///
/// Parsing never yields a partial tree: callers get either a complete
/// document or one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
    /// Where in the source the error occurred.
    pub location: SourceLocation,
    /// The complete input that was being parsed.
    pub source: String,
}

impl ParseError {
    /// Returns the byte offset of the error within [`source`](Self::source).
    #[must_use]
    pub fn position(&self) -> usize {
        self.location.byte_offset
    }

    /// Returns the source line containing the error followed by a caret line
    /// pointing at the offending column.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmltrip::parse_str;
    ///
    /// let err = parse_str("<a>\n<b x=1/>\n</a>").unwrap_err();
    /// assert_eq!(err.snippet(), "<b x=1/>\n     ^");
    /// ```
    #[must_use]
    pub fn snippet(&self) -> String {
        let offset = self.location.byte_offset.min(self.source.len());
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[offset..]
            .find('\n')
            .map_or(self.source.len(), |i| offset + i);
        let line = self.source[line_start..line_end].trim_end_matches('\r');
        let column = self.source[line_start..offset].chars().count();
        format!("{line}\n{}^", " ".repeat(column))
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at {}: {}", self.location, self.message)
    }
}

impl std::error::Error for ParseError {}

/// An error raised while writing a serialized tree to a byte sink.
#[derive(Debug)]
pub enum SerializeError {
    /// The sink rejected the write.
    Io(std::io::Error),
    /// The requested output encoding label is not recognized.
    UnsupportedEncoding(String),
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "write error: {e}"),
            Self::UnsupportedEncoding(label) => write!(f, "unsupported encoding '{label}'"),
        }
    }
}

impl std::error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::UnsupportedEncoding(_) => None,
        }
    }
}

impl From<std::io::Error> for SerializeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Misuse of a tree-editing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// An element was given an empty name.
    EmptyName,
    /// The target node cannot hold children.
    NotAContainer,
    /// The operation needs an element node.
    NotAnElement,
    /// The node is of the wrong kind for the operation.
    WrongKind,
    /// The attachment would make a node its own ancestor.
    Cycle,
    /// The reference node is not a child of the expected container.
    NotAChild,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::EmptyName => "element name cannot be empty",
            Self::NotAContainer => "node cannot contain children",
            Self::NotAnElement => "node is not an element",
            Self::WrongKind => "node kind does not support this operation",
            Self::Cycle => "node cannot be attached beneath itself",
            Self::NotAChild => "reference node is not a child of this container",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for TreeError {}
