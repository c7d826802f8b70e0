//! Node type definitions.
//!
//! `NodeKind` is the closed set of node kinds a round-trip tree can hold.
//! Each variant wraps a payload struct that keeps both the decoded value and,
//! where the parser captured one, the literal source text used for
//! byte-exact replay.

use indexmap::IndexMap;

use super::Attribute;

/// The kind of an XML node and its associated data.
///
/// Navigation links (parent, children, siblings) and the shared formatting
/// state live in [`NodeData`](super::NodeData), not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node. There is exactly one per `Document`.
    Document,
    /// An element, e.g. `<dependency scope="test">`.
    Element(Element),
    /// Character data or a CDATA section.
    Text(Text),
    /// A comment, e.g. `<!-- note -->`.
    Comment(Comment),
    /// A processing instruction, e.g. `<?xml-stylesheet href="a.xsl"?>`.
    ProcessingInstruction(ProcessingInstruction),
}

impl NodeKind {
    /// Returns `true` for kinds that own an ordered child sequence.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Document | Self::Element(_))
    }

    /// Short lowercase name of the kind, used in log output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Element(_) => "element",
            Self::Text(t) if t.cdata => "cdata",
            Self::Text(_) => "text",
            Self::Comment(_) => "comment",
            Self::ProcessingInstruction(_) => "processing-instruction",
        }
    }
}

/// Element payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Qualified name as written (`project`, `xsl:template`).
    pub name: String,
    /// Attributes keyed by name, in source order.
    pub attributes: IndexMap<String, Attribute>,
    /// Written as `<name/>` with no separate close tag.
    pub self_closing: bool,
    /// Whitespace inside the open tag just before `>` or `/>`.
    pub open_tag_whitespace: String,
    /// Whitespace inside the close tag between `</` and the name.
    pub close_tag_whitespace: String,
    /// Whitespace immediately before the close tag of an element that has
    /// no child nodes, as in `<a>  </a>`.
    pub inner_whitespace: String,
    /// The literal open tag, from `<` through `>`.
    pub original_open_tag: Option<String>,
    /// The literal close tag. Empty for an element left open at end of input.
    pub original_close_tag: Option<String>,
    /// While empty, written in the configured
    /// [`EmptyElementStyle`](crate::config::EmptyElementStyle) instead of by
    /// `self_closing`. Set on created elements until their form is chosen
    /// explicitly.
    pub follows_empty_style: bool,
}

impl Element {
    /// Creates an element with no attributes or captured formatting.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the decoded value of an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|a| a.value.as_str())
    }

    /// Drops the fast-path cache so the next serialization renders the tag.
    pub(crate) fn forget_literals(&mut self) {
        self.original_open_tag = None;
        self.original_close_tag = None;
    }
}

/// Text payload. Covers both plain character data and CDATA sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text {
    /// Decoded content. For CDATA this is the verbatim section body.
    pub content: String,
    /// The literal source text with entity references intact.
    pub raw: Option<String>,
    /// Emitted as `<![CDATA[...]]>` and never escaped.
    pub cdata: bool,
    /// Kept in pretty mode even when whitespace-only.
    pub preserve_whitespace: bool,
}

impl Text {
    /// Creates a plain text payload.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Creates a CDATA section payload.
    pub fn cdata(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            cdata: true,
            ..Self::default()
        }
    }

    /// Returns `true` if the content is empty or consists only of whitespace.
    #[must_use]
    pub fn is_whitespace_only(&self) -> bool {
        self.content.chars().all(char::is_whitespace)
    }
}

/// Comment payload, without the `<!--` and `-->` delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comment {
    /// The comment body.
    pub content: String,
}

impl Comment {
    /// Creates a comment payload.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Processing-instruction payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessingInstruction {
    /// The PI target, e.g. `xml-stylesheet`.
    pub target: String,
    /// Everything after the first whitespace run following the target,
    /// with surrounding whitespace trimmed.
    pub data: String,
    /// The full literal, from `<?` through `?>`.
    pub raw: Option<String>,
}

impl ProcessingInstruction {
    /// Creates a processing-instruction payload.
    pub fn new(target: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            data: data.into(),
            raw: None,
        }
    }

    /// Splits a full `<?target data?>` literal into a payload that keeps the
    /// literal for replay.
    pub(crate) fn from_literal(literal: &str) -> Self {
        let body = literal
            .strip_prefix("<?")
            .and_then(|s| s.strip_suffix("?>"))
            .unwrap_or(literal);
        let (target, data) = match body.find(char::is_whitespace) {
            Some(i) => (&body[..i], body[i..].trim()),
            None => (body, ""),
        };
        Self {
            target: target.to_string(),
            data: data.to_string(),
            raw: Some(literal.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pi_from_literal_splits_on_first_whitespace() {
        let pi = ProcessingInstruction::from_literal("<?xml-stylesheet  type=\"text/xsl\" href=\"a.xsl\" ?>");
        assert_eq!(pi.target, "xml-stylesheet");
        assert_eq!(pi.data, "type=\"text/xsl\" href=\"a.xsl\"");
        assert_eq!(
            pi.raw.as_deref(),
            Some("<?xml-stylesheet  type=\"text/xsl\" href=\"a.xsl\" ?>")
        );
    }

    #[test]
    fn test_pi_from_literal_without_data() {
        let pi = ProcessingInstruction::from_literal("<?marker?>");
        assert_eq!(pi.target, "marker");
        assert_eq!(pi.data, "");
    }

    #[test]
    fn test_text_whitespace_only() {
        assert!(Text::new("\n    ").is_whitespace_only());
        assert!(Text::new("").is_whitespace_only());
        assert!(!Text::new(" x ").is_whitespace_only());
        assert!(Text::cdata("  ").cdata);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(NodeKind::Text(Text::cdata("x")).label(), "cdata");
        assert_eq!(NodeKind::Element(Element::new("a")).label(), "element");
        assert!(NodeKind::Document.is_container());
        assert!(!NodeKind::Comment(Comment::new("c")).is_container());
    }

    #[test]
    fn test_element_attribute_lookup() {
        let mut el = Element::new("dep");
        el.attributes
            .insert("scope".to_string(), Attribute::new("scope", "test"));
        assert_eq!(el.attribute("scope"), Some("test"));
        assert_eq!(el.attribute("missing"), None);
    }
}
