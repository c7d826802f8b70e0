//! Formatting inference for inserted content.
//!
//! When new nodes or attributes are added to a parsed document they have no
//! captured formatting. These heuristics look at the surrounding markup and
//! pick indentation, line endings, quote style, and attribute spacing that
//! match it, so edits blend in with the original text.

use crate::config::{Config, EmptyElementStyle};
use crate::tree::{Document, NodeId, QuoteStyle};

/// Formatting chosen for a new attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFormatting {
    /// Quote character to delimit the value with.
    pub quote: QuoteStyle,
    /// Whitespace to emit before the attribute name.
    pub preceding_whitespace: String,
}

/// Returns the text after the last newline in `ws`, if the text contains a
/// newline and something follows it.
fn indent_after_newline(ws: &str) -> Option<&str> {
    let last = ws.rfind('\n')?;
    let tail = &ws[last + 1..];
    (!tail.is_empty()).then_some(tail)
}

/// Finds an indentation string among `nodes`, looking at each node's
/// preceding whitespace and at whitespace-only text nodes.
fn indent_among(doc: &Document, nodes: impl Iterator<Item = NodeId>) -> Option<String> {
    for id in nodes {
        if let Some(indent) = indent_after_newline(doc.preceding_whitespace(id)) {
            return Some(indent.to_string());
        }
        if let Some(text) = doc.text(id) {
            if !text.cdata && text.is_whitespace_only() {
                if let Some(indent) = indent_after_newline(&text.content) {
                    return Some(indent.to_string());
                }
            }
        }
    }
    None
}

/// Chooses the indentation for a node inserted at `context`.
///
/// Looks at the children of `context`, then at its siblings when the
/// children carry no line breaks, and returns whatever follows the last
/// newline in the first newline-bearing whitespace found. Falls back to the
/// configured indent.
///
/// # Examples
///
/// ```
/// use xmltrip::{format::infer_indentation, Config, Document};
///
/// let doc = Document::parse_str("<project>\n\t<a/>\n</project>").unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(infer_indentation(&doc, root, &Config::default()), "\t");
/// ```
#[must_use]
pub fn infer_indentation(doc: &Document, context: NodeId, config: &Config) -> String {
    indent_among(doc, doc.children(context))
        .or_else(|| {
            doc.parent(context)
                .and_then(|parent| indent_among(doc, doc.children(parent)))
        })
        .unwrap_or_else(|| config.get_indent_unit().to_string())
}

/// Returns the indentation in front of `id` itself: the tail of the
/// whitespace-only text just before it, or of its own preceding whitespace.
#[must_use]
pub fn indent_of(doc: &Document, id: NodeId) -> String {
    if let Some(indent) = indent_after_newline(doc.preceding_whitespace(id)) {
        return indent.to_string();
    }
    doc.prev_sibling(id)
        .and_then(|prev| doc.text(prev))
        .filter(|t| !t.cdata && t.is_whitespace_only())
        .and_then(|t| indent_after_newline(&t.content))
        .unwrap_or("")
        .to_string()
}

/// Detects the document's line ending from the first newline found in
/// whitespace-only text or captured preceding whitespace.
#[must_use]
pub fn detect_line_ending(doc: &Document, config: &Config) -> String {
    let root = doc.root();
    for id in std::iter::once(root).chain(doc.descendants(root)) {
        let ws = doc.preceding_whitespace(id);
        let candidate = if ws.contains('\n') {
            Some(ws)
        } else {
            doc.text(id)
                .filter(|t| !t.cdata)
                .map(|t| t.content.as_str())
                .filter(|c| c.contains('\n'))
        };
        if let Some(text) = candidate {
            return if text.contains("\r\n") { "\r\n" } else { "\n" }.to_string();
        }
    }
    config.get_line_ending().to_string()
}

/// Whitespace to put before a new child appended to `parent`: a line
/// ending plus the indentation of existing children, or the parent's own
/// indentation plus one configured indent unit when it has none.
///
/// # Examples
///
/// ```
/// use xmltrip::{format::child_whitespace, Config, Document};
///
/// let doc = Document::parse_str("<a>\n  <b/>\n</a>").unwrap();
/// let a = doc.root_element().unwrap();
/// assert_eq!(child_whitespace(&doc, a, &Config::default()), "\n  ");
/// ```
#[must_use]
pub fn child_whitespace(doc: &Document, parent: NodeId, config: &Config) -> String {
    let line_ending = detect_line_ending(doc, config);
    let indent = indent_among(doc, doc.children(parent))
        .unwrap_or_else(|| format!("{}{}", indent_of(doc, parent), config.get_indent_unit()));
    format!("{line_ending}{indent}")
}

/// Detects how the document writes elements with no content.
///
/// Counts the empty elements by form: `<a></a>`, `<a/>`, and `<a />` with
/// whitespace before the slash. A form wins only with a strict majority over
/// both others; anything else gives [`EmptyElementStyle::SelfClosing`].
/// Created elements whose form is still open are not counted.
///
/// # Examples
///
/// ```
/// use xmltrip::{format::detect_empty_element_style, Document, EmptyElementStyle};
///
/// let doc = Document::parse_str("<r><a /><b /><c/></r>").unwrap();
/// assert_eq!(detect_empty_element_style(&doc), EmptyElementStyle::SelfClosingSpaced);
/// ```
#[must_use]
pub fn detect_empty_element_style(doc: &Document) -> EmptyElementStyle {
    let (mut expanded, mut closed, mut spaced) = (0usize, 0usize, 0usize);
    for id in doc.descendants(doc.root()) {
        let Some(el) = doc.element(id) else { continue };
        if el.follows_empty_style || doc.first_child(id).is_some() {
            continue;
        }
        let spaced_literal = el
            .original_open_tag
            .as_deref()
            .is_some_and(|tag| tag.ends_with(" />"));
        match (el.self_closing, spaced_literal) {
            (false, _) => expanded += 1,
            (true, true) => spaced += 1,
            (true, false) => closed += 1,
        }
    }

    if expanded > closed && expanded > spaced {
        EmptyElementStyle::Expanded
    } else if spaced > closed && spaced > expanded {
        EmptyElementStyle::SelfClosingSpaced
    } else {
        EmptyElementStyle::SelfClosing
    }
}

/// Chooses quote style and spacing for a new attribute on `element`.
///
/// The quote style is the majority among existing attributes, ties going
/// to double quotes, and the configured default when there are none. The
/// whitespace copies the line break and alignment of the first multi-line
/// attribute, else the first unusual spacing, else a single space.
#[must_use]
pub fn infer_attribute_formatting(
    doc: &Document,
    element: NodeId,
    config: &Config,
) -> AttributeFormatting {
    let attrs: Vec<_> = doc.attributes(element).collect();
    if attrs.is_empty() {
        return AttributeFormatting {
            quote: config.get_default_quote_style(),
            preceding_whitespace: " ".to_string(),
        };
    }

    let singles = attrs
        .iter()
        .filter(|a| a.quote == QuoteStyle::Single)
        .count();
    let quote = if singles * 2 > attrs.len() {
        QuoteStyle::Single
    } else {
        QuoteStyle::Double
    };

    let multi_line = attrs.iter().find_map(|a| {
        let ws = a.preceding_whitespace.as_str();
        let last = ws.rfind('\n')?;
        let start = if ws[..last].ends_with('\r') { last - 1 } else { last };
        Some(ws[start..].to_string())
    });
    let preceding_whitespace = multi_line
        .or_else(|| {
            attrs
                .iter()
                .map(|a| a.preceding_whitespace.as_str())
                .find(|ws| !ws.is_empty() && *ws != " ")
                .map(str::to_string)
        })
        .unwrap_or_else(|| " ".to_string());

    AttributeFormatting {
        quote,
        preceding_whitespace,
    }
}
