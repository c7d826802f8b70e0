//! XML serializer.
//!
//! Turns a `Document` back into text. Each node is either replayed from the
//! literal text captured when it was parsed (fast path) or rebuilt from its
//! decoded state (render path). Pretty mode ignores captured layout and
//! re-indents from nesting depth.

use std::io::Write;

use tracing::{trace, warn};

use crate::config::Config;
use crate::encoding::{encode_from_utf8, is_known_label, supports_bom};
use crate::error::SerializeError;
use crate::tree::{
    Attribute, Comment, Document, Element, NodeId, NodeKind, ProcessingInstruction, QuoteStyle,
    Text,
};

const BOM: char = '\u{FEFF}';

/// Serializes a document with the default configuration.
///
/// # Examples
///
/// ```
/// use xmltrip::serial::serialize;
/// use xmltrip::Document;
///
/// let input = "<?xml version='1.0'?>\n<root a = \"1\">\n  <child/>\n</root>\n";
/// let doc = Document::parse_str(input).unwrap();
/// assert_eq!(serialize(&doc), input);
/// ```
#[must_use]
pub fn serialize(doc: &Document) -> String {
    serialize_with_config(doc, &Config::default())
}

/// Serializes a document with the given configuration.
///
/// # Examples
///
/// ```
/// use xmltrip::serial::serialize_with_config;
/// use xmltrip::{Config, Document};
///
/// let doc = Document::parse_str("<root><child>Hello</child></root>").unwrap();
/// let xml = serialize_with_config(&doc, &Config::pretty().indent_unit("  "));
/// assert_eq!(xml, "<root>\n  <child>Hello</child>\n</root>");
/// ```
#[must_use]
pub fn serialize_with_config(doc: &Document, config: &Config) -> String {
    let mut writer = Writer::new(doc, config);
    writer.document();
    writer.out
}

/// Serializes a single node and its subtree. The document node produces the
/// whole document.
#[must_use]
pub fn serialize_node(doc: &Document, id: NodeId, config: &Config) -> String {
    let mut writer = Writer::new(doc, config);
    if matches!(doc.kind(id), NodeKind::Document) {
        writer.document();
    } else if config.is_pretty_print() {
        if writer.pretty_visible(id) {
            writer.pretty_node(id, 0);
        }
    } else {
        writer.node(id);
    }
    writer.out
}

/// Serializes a document and writes it to `sink` in the named charset.
///
/// `None` selects the document's own encoding, falling back to UTF-8 with a
/// warning when that label is unknown. An explicit unknown label is an
/// error. A byte order mark is only written for Unicode charsets.
///
/// # Errors
///
/// Returns [`SerializeError::UnsupportedEncoding`] for an unknown explicit
/// label and [`SerializeError::Io`] if the sink fails.
pub fn write_bytes<W: Write>(
    doc: &Document,
    sink: &mut W,
    encoding: Option<&str>,
    config: &Config,
) -> Result<(), SerializeError> {
    let label = match encoding {
        Some(label) if is_known_label(label) => label,
        Some(label) => return Err(SerializeError::UnsupportedEncoding(label.to_string())),
        None if is_known_label(doc.encoding()) => doc.encoding(),
        None => {
            warn!(
                encoding = doc.encoding(),
                "unknown document encoding, writing UTF-8"
            );
            "UTF-8"
        }
    };

    let text = serialize_with_config(doc, config);
    let text = if supports_bom(label) {
        text.as_str()
    } else {
        text.strip_prefix(BOM).unwrap_or(&text)
    };
    let bytes = encode_from_utf8(text, label)
        .map_err(|_| SerializeError::UnsupportedEncoding(label.to_string()))?;
    trace!(encoding = label, bytes = bytes.len(), "writing document");
    sink.write_all(&bytes)?;
    Ok(())
}

/// Escapes character data: `&`, `<` and `>`.
pub(crate) fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Escapes an attribute value: `&`, `<`, `>`, and only the quote character
/// that delimits it.
pub(crate) fn escape_attribute(out: &mut String, value: &str, quote: QuoteStyle) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote == QuoteStyle::Double => out.push_str("&quot;"),
            '\'' if quote == QuoteStyle::Single => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

struct Writer<'a> {
    doc: &'a Document,
    config: &'a Config,
    out: String,
}

impl<'a> Writer<'a> {
    fn new(doc: &'a Document, config: &'a Config) -> Self {
        Self {
            doc,
            config,
            out: String::with_capacity(4096),
        }
    }

    fn is_suppressed(&self, id: NodeId) -> bool {
        match self.doc.kind(id) {
            NodeKind::Comment(_) => !self.config.is_preserve_comments(),
            NodeKind::ProcessingInstruction(_) => {
                !self.config.is_preserve_processing_instructions()
            }
            _ => false,
        }
    }

    /// Whether the node may be replayed from its captured literal.
    fn is_fast(&self, id: NodeId) -> bool {
        self.config.is_preserve_whitespace() && !self.doc.is_modified(id)
    }

    /// A designated root element that is not attached anywhere.
    fn detached_root(&self) -> Option<NodeId> {
        self.doc
            .root_element()
            .filter(|&r| self.doc.parent(r).is_none())
    }

    // --- Document assembly ---

    fn document(&mut self) {
        if self.doc.has_bom() {
            self.out.push(BOM);
        }
        if self.config.is_pretty_print() {
            self.pretty_document();
            return;
        }

        let doc = self.doc;
        if !self.config.is_omit_xml_declaration() {
            if let Some(decl) = doc.xml_declaration() {
                self.out.push_str(decl);
            }
        }

        let root = doc.root();
        let doctype_at = doc.doctype_index();
        let mut doctype_pending = true;
        for (i, child) in doc.children(root).enumerate() {
            if i == doctype_at {
                self.doctype();
                doctype_pending = false;
            }
            self.node(child);
        }
        if doctype_pending {
            self.doctype();
        }

        if let Some(r) = self.detached_root() {
            self.node(r);
        }
    }

    /// The DOCTYPE with its whitespace, then the document's own preceding
    /// whitespace.
    fn doctype(&mut self) {
        let doc = self.doc;
        if let Some(doctype) = doc.doctype() {
            self.out.push_str(doc.doctype_preceding_whitespace());
            self.out.push_str(doctype);
        }
        self.out.push_str(doc.preceding_whitespace(doc.root()));
    }

    // --- Preserve mode ---

    fn node(&mut self, id: NodeId) {
        if self.is_suppressed(id) {
            return;
        }
        let doc = self.doc;
        let data = doc.node(id);
        self.out.push_str(&data.preceding_whitespace);
        let fast = self.is_fast(id);

        match &data.kind {
            NodeKind::Document => {
                for child in doc.children(id) {
                    self.node(child);
                }
            }
            NodeKind::Element(el) => self.element(id, el, fast),
            NodeKind::Text(text) => self.text(text, fast),
            NodeKind::Comment(comment) => self.comment(comment),
            NodeKind::ProcessingInstruction(pi) => self.processing_instruction(pi, fast),
        }
    }

    fn element(&mut self, id: NodeId, el: &Element, fast: bool) {
        let doc = self.doc;
        let end = self.open_tag_end(id, el);
        let self_closing = end.ends_with("/>");

        match el.original_open_tag.as_deref() {
            Some(literal) if fast => self.out.push_str(literal),
            _ => self.start_tag(el, end, false),
        }
        if self_closing {
            return;
        }

        for child in doc.children(id) {
            self.node(child);
        }
        self.out.push_str(&el.inner_whitespace);

        match el.original_close_tag.as_deref() {
            Some(literal) if fast => self.out.push_str(literal),
            _ => {
                self.out.push_str("</");
                self.out.push_str(&el.close_tag_whitespace);
                self.out.push_str(&el.name);
                self.out.push('>');
            }
        }
    }

    /// How the open tag ends: `>` when content and a close tag follow,
    /// otherwise one of the self-closing forms.
    fn open_tag_end(&self, id: NodeId, el: &Element) -> &'static str {
        let empty = self.doc.first_child(id).is_none();
        if el.follows_empty_style && empty && el.inner_whitespace.is_empty() {
            return self.config.get_empty_element_style().tag_end();
        }
        if el.self_closing && empty {
            "/>"
        } else {
            ">"
        }
    }

    fn start_tag(&mut self, el: &Element, end: &str, pretty: bool) {
        self.out.push('<');
        self.out.push_str(&el.name);
        for attr in el.attributes.values() {
            self.attribute(attr, pretty);
        }
        if !pretty {
            self.out.push_str(&el.open_tag_whitespace);
        }
        self.out.push_str(end);
    }

    fn attribute(&mut self, attr: &Attribute, pretty: bool) {
        if pretty {
            self.out.push(' ');
        } else {
            self.out.push_str(&attr.preceding_whitespace);
        }
        self.out.push_str(&attr.name);
        self.out.push('=');
        let quote = attr.quote.as_char();
        self.out.push(quote);
        match attr.raw_value.as_deref() {
            Some(raw) if self.config.is_preserve_whitespace() && !raw.contains(quote) => {
                self.out.push_str(raw);
            }
            _ => escape_attribute(&mut self.out, &attr.value, attr.quote),
        }
        self.out.push(quote);
    }

    fn text(&mut self, text: &Text, fast: bool) {
        if text.cdata {
            self.out.push_str("<![CDATA[");
            // a literal "]]>" has to be split across two sections
            self.out.push_str(&text.content.replace("]]>", "]]]]><![CDATA[>"));
            self.out.push_str("]]>");
            return;
        }
        match text.raw.as_deref() {
            Some(raw) if fast => self.out.push_str(raw),
            _ => escape_text(&mut self.out, &text.content),
        }
    }

    fn comment(&mut self, comment: &Comment) {
        self.out.push_str("<!--");
        self.out.push_str(&comment.content);
        self.out.push_str("-->");
    }

    fn processing_instruction(&mut self, pi: &ProcessingInstruction, fast: bool) {
        match pi.raw.as_deref() {
            Some(raw) if fast => self.out.push_str(raw),
            _ => {
                self.out.push_str("<?");
                self.out.push_str(&pi.target);
                if !pi.data.is_empty() {
                    self.out.push(' ');
                    self.out.push_str(&pi.data);
                }
                self.out.push_str("?>");
            }
        }
    }

    // --- Pretty mode ---

    /// Whether a node produces output in pretty mode. Whitespace-only text
    /// is dropped unless it is CDATA or under `xml:space="preserve"`.
    fn pretty_visible(&self, id: NodeId) -> bool {
        if self.is_suppressed(id) {
            return false;
        }
        match self.doc.kind(id) {
            NodeKind::Text(t) => t.cdata || t.preserve_whitespace || !t.is_whitespace_only(),
            _ => true,
        }
    }

    fn newline(&mut self, depth: usize) {
        self.out.push_str(self.config.get_line_ending());
        for _ in 0..depth {
            self.out.push_str(self.config.get_indent_unit());
        }
    }

    fn pretty_document(&mut self) {
        let doc = self.doc;
        let mut first = true;
        let mut separate = |w: &mut Self| {
            if !first {
                w.out.push_str(w.config.get_line_ending());
            }
            first = false;
        };

        if !self.config.is_omit_xml_declaration() {
            if let Some(decl) = doc.xml_declaration() {
                separate(self);
                self.out.push_str(decl);
            }
        }

        let visible: Vec<NodeId> = doc
            .children(doc.root())
            .filter(|&c| self.pretty_visible(c))
            .collect();
        let doctype_at = doc.doctype_index().min(visible.len());
        for (i, &child) in visible.iter().enumerate() {
            if i == doctype_at {
                if let Some(doctype) = doc.doctype() {
                    separate(self);
                    self.out.push_str(doctype);
                }
            }
            separate(self);
            self.pretty_node(child, 0);
        }
        if doctype_at == visible.len() {
            if let Some(doctype) = doc.doctype() {
                separate(self);
                self.out.push_str(doctype);
            }
        }

        if let Some(r) = self.detached_root() {
            separate(self);
            self.pretty_node(r, 0);
        }
    }

    fn pretty_node(&mut self, id: NodeId, depth: usize) {
        let doc = self.doc;
        match doc.kind(id) {
            NodeKind::Element(el) => self.pretty_element(id, el, depth),
            NodeKind::Text(text) => self.text(text, false),
            NodeKind::Comment(comment) => self.comment(comment),
            NodeKind::ProcessingInstruction(pi) => self.processing_instruction(pi, false),
            NodeKind::Document => {
                let visible: Vec<NodeId> = doc
                    .children(id)
                    .filter(|&c| self.pretty_visible(c))
                    .collect();
                for child in visible {
                    self.pretty_node(child, depth);
                }
            }
        }
    }

    fn pretty_element(&mut self, id: NodeId, el: &Element, depth: usize) {
        let doc = self.doc;
        let visible: Vec<NodeId> = doc
            .children(id)
            .filter(|&c| self.pretty_visible(c))
            .collect();

        if visible.is_empty() {
            let end = self.open_tag_end(id, el);
            self.start_tag(el, end, true);
            if !end.ends_with("/>") {
                self.end_tag(el);
            }
            return;
        }

        self.start_tag(el, ">", true);
        let has_element = visible
            .iter()
            .any(|&c| matches!(doc.kind(c), NodeKind::Element(_)));
        let has_text = visible
            .iter()
            .any(|&c| matches!(doc.kind(c), NodeKind::Text(_)));
        let block = has_element && !has_text;

        for &child in &visible {
            if block {
                self.newline(depth + 1);
            }
            self.pretty_node(child, depth + 1);
        }
        if block {
            self.newline(depth);
        }
        self.end_tag(el);
    }

    fn end_tag(&mut self, el: &Element) {
        self.out.push_str("</");
        self.out.push_str(&el.name);
        self.out.push('>');
    }
}
