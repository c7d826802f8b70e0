//! Lossless XML parser.
//!
//! A hand-rolled single-pass scanner that builds a [`Document`] while
//! recording every formatting artifact it passes over: attribute quotes and
//! spacing, whitespace inside tags, the literal text of tags, character data
//! and processing instructions. The parser is deliberately lenient about
//! structure (mismatched end tags are logged and skipped, unclosed elements
//! are closed at end of input) but strict about lexical errors such as
//! unterminated constructs.
//!
//! The parser is hand-rolled (not combinator-based) because every recognized
//! construct has to be sliced back out of the source verbatim.

pub(crate) mod input;
mod xml;

use tracing::debug;

use crate::encoding::decode_to_utf8;
use crate::error::{ParseError, SourceLocation};
use crate::tree::Document;

/// Parse options.
///
/// ```
/// use xmltrip::parser::ParseOptions;
///
/// assert_eq!(ParseOptions::default().max_depth, None);
/// let opts = ParseOptions::default().max_depth(64);
/// assert_eq!(opts.max_depth, Some(64));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum element nesting depth. Unlimited by default, so any
    /// well-formed document is accepted; set a limit when parsing
    /// untrusted input.
    pub max_depth: Option<u32>,
}

impl ParseOptions {
    /// Rejects input nested deeper than `max` elements.
    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = Some(max);
        self
    }
}

/// Parses an XML string with default options.
///
/// A leading byte order mark is stripped and remembered, so that
/// serialization writes it back.
///
/// # Errors
///
/// Returns `ParseError` if the input is empty or malformed.
///
/// # Examples
///
/// ```
/// let doc = xmltrip::parse_str("<a  x='1'   />").unwrap();
/// assert_eq!(doc.to_xml(), "<a  x='1'   />");
/// ```
pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    parse_str_with_options(input, &ParseOptions::default())
}

/// Parses an XML string with the given options.
///
/// # Errors
///
/// Returns `ParseError` if the input is empty, malformed, or nested deeper
/// than the options allow.
pub fn parse_str_with_options(input: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    let (text, bom) = match input.strip_prefix('\u{FEFF}') {
        Some(rest) => (rest, true),
        None => (input, false),
    };
    let mut doc = xml::XmlParser::new(text, options).parse()?;
    doc.set_parsed_bom(bom);
    Ok(doc)
}

/// Parses raw XML bytes with default options.
///
/// The charset is taken from a byte order mark or the XML declaration, and
/// recorded as the document's encoding when the declaration does not name
/// one, so that [`Document::write_bytes`] writes the bytes back the way they
/// came in.
///
/// # Errors
///
/// Returns `ParseError` if the bytes cannot be decoded or the text is
/// malformed.
///
/// # Examples
///
/// ```
/// let doc = xmltrip::parse_bytes(b"\xFF\xFE<\x00r\x00/\x00>\x00").unwrap();
/// assert_eq!(doc.encoding(), "UTF-16LE");
/// assert!(doc.has_bom());
/// ```
pub fn parse_bytes(input: &[u8]) -> Result<Document, ParseError> {
    parse_bytes_with_options(input, &ParseOptions::default())
}

/// Parses raw XML bytes with the given options.
///
/// # Errors
///
/// See [`parse_bytes`].
pub fn parse_bytes_with_options(
    input: &[u8],
    options: &ParseOptions,
) -> Result<Document, ParseError> {
    let decoded = decode_to_utf8(input).map_err(|e| ParseError {
        message: e.message,
        location: SourceLocation {
            line: 1,
            column: 1,
            byte_offset: 0,
        },
        source: String::from_utf8_lossy(input).into_owned(),
    })?;
    debug!(encoding = decoded.encoding, bom = decoded.had_bom, "decoded input");

    let mut doc = xml::XmlParser::new(&decoded.text, options).parse()?;
    let declared = doc
        .xml_declaration()
        .and_then(|decl| input::pseudo_attribute(decl, "encoding"));
    if declared.is_none() {
        doc.set_detected_encoding(decoded.encoding);
    }
    doc.set_parsed_bom(decoded.had_bom);
    Ok(doc)
}
