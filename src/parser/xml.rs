//! Round-trip XML scanner.
//!
//! A single forward pass over the input with an explicit stack of open
//! containers. Every construct is sliced out of the source as it is
//! recognized, so each node keeps both its decoded value and the literal
//! text it came from.

use tracing::{debug, trace, warn};

use crate::error::ParseError;
use crate::tree::{
    Attribute, Comment, Document, Element, NodeId, NodeKind, ProcessingInstruction, QuoteStyle,
    Text,
};

use super::input::{decode_entities, pseudo_attribute, ParserInput, SavedPosition};
use super::ParseOptions;

pub(crate) struct XmlParser<'a> {
    /// Shared low-level input state.
    input: ParserInput<'a>,
    /// The document being built.
    doc: Document,
    /// Open containers. The document node sits at the bottom and is never
    /// popped.
    stack: Vec<NodeId>,
    /// Byte offset where the pending run of character data began.
    text_start: Option<usize>,
    max_depth: Option<usize>,
}

impl<'a> XmlParser<'a> {
    pub fn new(source: &'a str, options: &ParseOptions) -> Self {
        let doc = Document::empty();
        let stack = vec![doc.root()];
        Self {
            input: ParserInput::new(source),
            doc,
            stack,
            text_start: None,
            max_depth: options.max_depth.map(|d| d as usize),
        }
    }

    /// Main parse entry point. Consumes the parser and returns the finished
    /// document.
    pub fn parse(mut self) -> Result<Document, ParseError> {
        if self.input.source().trim().is_empty() {
            return Err(self.input.fatal("empty input"));
        }

        while !self.input.at_end() {
            if self.input.peek() == Some(b'<') {
                self.parse_markup()?;
            } else {
                if self.text_start.is_none() {
                    self.text_start = Some(self.input.pos());
                }
                match self.input.find(b"<") {
                    Some(n) => self.input.advance(n),
                    None => self.input.advance_to_end(),
                }
            }
        }

        self.finish()
    }

    fn finish(mut self) -> Result<Document, ParseError> {
        if let Some(raw) = self.take_pending(self.input.pos()) {
            self.flush_text(raw);
        }

        while self.stack.len() > 1 {
            let Some(open) = self.stack.pop() else { break };
            if let NodeKind::Element(el) = &mut self.doc.node_mut(open).kind {
                warn!(element = %el.name, "element not closed before end of input");
                el.original_close_tag = Some(String::new());
            }
        }

        let root = self.doc.root();
        let root_element = self
            .doc
            .children(root)
            .find(|&c| matches!(self.doc.kind(c), NodeKind::Element(_)));
        self.doc.set_parsed_root(root_element);

        debug!(nodes = self.doc.node_count(), "parsed document");
        Ok(self.doc)
    }

    // --- Character data ---

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.doc.root())
    }

    /// Takes the pending character data that ends at `end`.
    fn take_pending(&mut self, end: usize) -> Option<&'a str> {
        self.text_start
            .take()
            .map(|start| self.input.slice(start, end))
            .filter(|raw| !raw.is_empty())
    }

    /// Whether the innermost `xml:space` in scope says `preserve`.
    fn in_preserve_scope(&self) -> bool {
        self.stack
            .iter()
            .rev()
            .find_map(|&id| self.doc.attribute(id, "xml:space"))
            .is_some_and(|v| v == "preserve")
    }

    fn append(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.current();
        let id = self.doc.create_node(kind);
        self.doc.append_parsed(parent, id);
        id
    }

    fn flush_text(&mut self, raw: &str) {
        let text = Text {
            content: decode_entities(raw).into_owned(),
            raw: Some(raw.to_string()),
            cdata: false,
            preserve_whitespace: self.in_preserve_scope(),
        };
        self.append(NodeKind::Text(text));
    }

    // --- Markup dispatch ---

    fn parse_markup(&mut self) -> Result<(), ParseError> {
        let tag_start = self.input.pos();
        let start = self.input.save_position();
        let pending = self.take_pending(tag_start);

        if self.input.looking_at(b"</") {
            return self.parse_end_tag(start, tag_start, pending);
        }
        if self.looking_at_doctype() {
            return self.parse_doctype(start, tag_start, pending);
        }

        if let Some(raw) = pending {
            self.flush_text(raw);
        }

        if self.input.looking_at(b"<!--") {
            self.parse_comment(start)
        } else if self.input.looking_at(b"<![CDATA[") {
            self.parse_cdata(start)
        } else if self.input.looking_at(b"<!") {
            self.skip_declaration(tag_start)
        } else if self.input.looking_at(b"<?") {
            self.parse_processing_instruction(start, tag_start)
        } else {
            self.parse_start_tag(start, tag_start)
        }
    }

    fn looking_at_doctype(&self) -> bool {
        self.input
            .remaining()
            .get(..9)
            .is_some_and(|s| s.eq_ignore_ascii_case(b"<!DOCTYPE"))
    }

    // --- Comments, CDATA, declarations ---

    fn parse_comment(&mut self, start: SavedPosition) -> Result<(), ParseError> {
        self.input.advance(4);
        let Some(len) = self.input.find(b"-->") else {
            return Err(self.input.error_at(start, "unterminated comment"));
        };
        let body = self.input.slice(self.input.pos(), self.input.pos() + len);
        self.input.advance(len + 3);
        self.append(NodeKind::Comment(Comment::new(body)));
        Ok(())
    }

    fn parse_cdata(&mut self, start: SavedPosition) -> Result<(), ParseError> {
        self.input.advance(9);
        let Some(len) = self.input.find(b"]]>") else {
            return Err(self.input.error_at(start, "unterminated CDATA section"));
        };
        let body = self.input.slice(self.input.pos(), self.input.pos() + len);
        self.input.advance(len + 3);
        let mut text = Text::cdata(body);
        text.preserve_whitespace = self.in_preserve_scope();
        self.append(NodeKind::Text(text));
        Ok(())
    }

    /// Skips a `<!…>` construct that is neither a comment, CDATA, nor a
    /// DOCTYPE. An unterminated one swallows the rest of the input.
    fn skip_declaration(&mut self, tag_start: usize) -> Result<(), ParseError> {
        let Some(len) = self.input.find(b">") else {
            self.input.advance_to_end();
            warn!(offset = tag_start, "unterminated markup declaration skipped to end of input");
            return Ok(());
        };
        self.input.advance(len + 1);
        debug!(
            declaration = self.input.slice(tag_start, self.input.pos()),
            "skipped markup declaration"
        );
        Ok(())
    }

    fn parse_doctype(
        &mut self,
        start: SavedPosition,
        tag_start: usize,
        pending: Option<&'a str>,
    ) -> Result<(), ParseError> {
        let top_level = self.stack.len() == 1 && self.doc.doctype().is_none();
        let whitespace = match pending {
            Some(raw) if top_level && raw.chars().all(char::is_whitespace) => raw,
            Some(raw) => {
                self.flush_text(raw);
                ""
            }
            None => "",
        };

        self.input.advance(9);
        let Some(len) = doctype_length(self.input.remaining()) else {
            return Err(self.input.error_at(start, "unterminated DOCTYPE"));
        };
        self.input.advance(len + 1);
        let literal = self.input.slice(tag_start, self.input.pos());

        if top_level {
            self.doc
                .set_parsed_doctype(literal.to_string(), whitespace.to_string());
        } else {
            warn!("DOCTYPE inside content or repeated; dropped");
        }
        Ok(())
    }

    fn parse_processing_instruction(
        &mut self,
        start: SavedPosition,
        tag_start: usize,
    ) -> Result<(), ParseError> {
        self.input.advance(2);
        let Some(len) = self.input.find(b"?>") else {
            return Err(self.input.error_at(start, "unterminated processing instruction"));
        };
        self.input.advance(len + 2);
        let literal = self.input.slice(tag_start, self.input.pos());
        let pi = ProcessingInstruction::from_literal(literal);

        let is_declaration = pi.target == "xml"
            && self.stack.len() == 1
            && self.doc.first_child(self.doc.root()).is_none()
            && self.doc.xml_declaration().is_none()
            && self.doc.doctype().is_none();

        if is_declaration {
            trace!(declaration = literal, "xml declaration");
            self.doc.set_parsed_declaration(
                literal.to_string(),
                pseudo_attribute(literal, "version"),
                pseudo_attribute(literal, "encoding"),
                pseudo_attribute(literal, "standalone").map(|s| s == "yes"),
            );
        } else {
            self.append(NodeKind::ProcessingInstruction(pi));
        }
        Ok(())
    }

    // --- Tags ---

    fn parse_start_tag(&mut self, start: SavedPosition, tag_start: usize) -> Result<(), ParseError> {
        self.input.advance(1);
        let name = self
            .input
            .take_while(|b| !b.is_ascii_whitespace() && b != b'>' && b != b'/');
        if name.is_empty() {
            let message = if self.input.at_end() {
                "unterminated start tag"
            } else {
                "empty element name"
            };
            return Err(self.input.error_at(start, message));
        }

        let mut element = Element::new(name);
        loop {
            let ws = self.input.skip_whitespace();
            match (self.input.peek(), self.input.peek_at(1)) {
                (None, _) | (Some(b'/'), None) => {
                    return Err(self.input.error_at(start, "unterminated start tag"));
                }
                (Some(b'>'), _) => {
                    element.open_tag_whitespace = ws.to_string();
                    self.input.advance(1);
                    break;
                }
                (Some(b'/'), Some(b'>')) => {
                    element.open_tag_whitespace = ws.to_string();
                    element.self_closing = true;
                    self.input.advance(2);
                    break;
                }
                (Some(b'/'), Some(_)) => {
                    return Err(self.input.fatal("expected '>' after '/'"));
                }
                (Some(_), _) => {
                    let attr_start = self.input.save_position();
                    let attr = self.parse_attribute(start, ws)?;
                    if element.attributes.contains_key(&attr.name) {
                        return Err(self
                            .input
                            .error_at(attr_start, format!("duplicate attribute '{}'", attr.name)));
                    }
                    element.attributes.insert(attr.name.clone(), attr);
                }
            }
        }

        let self_closing = element.self_closing;
        element.original_open_tag = Some(self.input.slice(tag_start, self.input.pos()).to_string());
        let id = self.append(NodeKind::Element(element));
        if !self_closing {
            if self.max_depth.is_some_and(|max| self.stack.len() > max) {
                return Err(self.input.error_at(start, "maximum nesting depth exceeded"));
            }
            self.stack.push(id);
        }
        Ok(())
    }

    fn parse_attribute(
        &mut self,
        tag: SavedPosition,
        preceding_whitespace: &str,
    ) -> Result<Attribute, ParseError> {
        let name = self
            .input
            .take_while(|b| b != b'=' && b != b'/' && b != b'>' && !b.is_ascii_whitespace());
        if name.is_empty() {
            return Err(self.input.fatal("empty attribute name"));
        }

        self.input.skip_whitespace();
        match self.input.peek() {
            None => return Err(self.input.error_at(tag, "unterminated start tag")),
            Some(b'=') => self.input.advance(1),
            Some(_) => {
                return Err(self
                    .input
                    .fatal(format!("missing '=' after attribute '{name}'")))
            }
        }

        self.input.skip_whitespace();
        let quote = match self.input.peek() {
            None => return Err(self.input.error_at(tag, "unterminated start tag")),
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.input.fatal("missing attribute value quote")),
        };
        let quote_pos = self.input.save_position();
        self.input.advance(1);
        let Some(len) = self.input.find(&[quote]) else {
            return Err(self.input.error_at(quote_pos, "unterminated attribute value"));
        };
        let raw = self.input.slice(self.input.pos(), self.input.pos() + len);
        self.input.advance(len + 1);

        Ok(Attribute {
            name: name.to_string(),
            value: decode_entities(raw).into_owned(),
            raw_value: Some(raw.to_string()),
            quote: QuoteStyle::from_char(char::from(quote)).unwrap_or_default(),
            preceding_whitespace: preceding_whitespace.to_string(),
        })
    }

    fn parse_end_tag(
        &mut self,
        start: SavedPosition,
        tag_start: usize,
        pending: Option<&'a str>,
    ) -> Result<(), ParseError> {
        self.input.advance(2);
        let close_ws = self.input.skip_whitespace();
        let Some(len) = self.input.find(b">") else {
            return Err(self.input.error_at(start, "unterminated end tag"));
        };
        let name = self
            .input
            .slice(self.input.pos(), self.input.pos() + len)
            .trim_end();
        self.input.advance(len + 1);
        let literal = self.input.slice(tag_start, self.input.pos());

        let top = self.current();
        if self.stack.len() == 1 || self.doc.node_name(top) != Some(name) {
            if let Some(raw) = pending {
                self.flush_text(raw);
            }
            warn!(
                found = name,
                open = self.doc.node_name(top).unwrap_or(""),
                "mismatched end tag ignored"
            );
            return Ok(());
        }

        match pending {
            Some(raw)
                if self.doc.first_child(top).is_none()
                    && raw.chars().all(char::is_whitespace)
                    && !self.in_preserve_scope() =>
            {
                if let NodeKind::Element(el) = &mut self.doc.node_mut(top).kind {
                    el.inner_whitespace = raw.to_string();
                }
            }
            Some(raw) => self.flush_text(raw),
            None => {}
        }

        if let NodeKind::Element(el) = &mut self.doc.node_mut(top).kind {
            el.close_tag_whitespace = close_ws.to_string();
            el.original_close_tag = Some(literal.to_string());
        }
        self.stack.pop();
        Ok(())
    }
}

/// Length of a DOCTYPE body up to its closing `>`, skipping over quoted
/// literals, comments, and the bracketed internal subset.
fn doctype_length(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
        } else if depth > 0 && bytes[i..].starts_with(b"<!--") {
            let close = bytes[i + 4..].windows(3).position(|w| w == b"-->")?;
            i += 4 + close + 3;
            continue;
        } else {
            match b {
                b'"' | b'\'' => quote = Some(b),
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Some(i),
                _ => {}
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Document {
        XmlParser::new(input, &ParseOptions::default())
            .parse()
            .unwrap()
    }

    fn parse_err(input: &str) -> ParseError {
        XmlParser::new(input, &ParseOptions::default())
            .parse()
            .unwrap_err()
    }

    #[test]
    fn test_parse_empty_element() {
        let doc = parse("<root/>");
        let root = doc.root_element().unwrap();
        let el = doc.element(root).unwrap();
        assert_eq!(el.name, "root");
        assert!(el.self_closing);
        assert_eq!(el.original_open_tag.as_deref(), Some("<root/>"));
        assert_eq!(el.original_close_tag, None);
    }

    #[test]
    fn test_parse_nested_elements() {
        let doc = parse("<a><b><c/></b></a>");
        let a = doc.root_element().unwrap();
        let b = doc.first_child(a).unwrap();
        let c = doc.first_child(b).unwrap();
        assert_eq!(doc.node_name(b), Some("b"));
        assert_eq!(doc.node_name(c), Some("c"));
        assert_eq!(
            doc.element(b).unwrap().original_close_tag.as_deref(),
            Some("</b>")
        );
    }

    #[test]
    fn test_attribute_formatting_captured() {
        let doc = parse("<a  x='1'\n   y = \"&lt;2&gt;\"  />");
        let a = doc.root_element().unwrap();
        let x = doc.attribute_node(a, "x").unwrap();
        assert_eq!(x.quote, QuoteStyle::Single);
        assert_eq!(x.preceding_whitespace, "  ");
        let y = doc.attribute_node(a, "y").unwrap();
        assert_eq!(y.value, "<2>");
        assert_eq!(y.raw_value.as_deref(), Some("&lt;2&gt;"));
        assert_eq!(y.preceding_whitespace, "\n   ");
        assert_eq!(doc.element(a).unwrap().open_tag_whitespace, "  ");
    }

    #[test]
    fn test_text_keeps_raw_and_decodes() {
        let doc = parse("<a>x &amp;lt; y</a>");
        let a = doc.root_element().unwrap();
        let t = doc.text(doc.first_child(a).unwrap()).unwrap();
        assert_eq!(t.content, "x &lt; y");
        assert_eq!(t.raw.as_deref(), Some("x &amp;lt; y"));
    }

    #[test]
    fn test_inner_whitespace_of_childless_element() {
        let doc = parse("<a>  \n</a>");
        let a = doc.root_element().unwrap();
        assert_eq!(doc.first_child(a), None);
        assert_eq!(doc.element(a).unwrap().inner_whitespace, "  \n");
    }

    #[test]
    fn test_xml_space_preserve_flags_text() {
        let doc = parse("<a xml:space=\"preserve\"><b>  </b></a>");
        let a = doc.root_element().unwrap();
        let b = doc.first_child(a).unwrap();
        let t = doc.text(doc.first_child(b).unwrap()).unwrap();
        assert!(t.preserve_whitespace);
        assert_eq!(t.content, "  ");
    }

    #[test]
    fn test_close_tag_whitespace() {
        let doc = parse("<a></ a>");
        let a = doc.root_element().unwrap();
        let el = doc.element(a).unwrap();
        assert_eq!(el.close_tag_whitespace, " ");
        assert_eq!(el.original_close_tag.as_deref(), Some("</ a>"));
    }

    #[test]
    fn test_declaration_and_scalars() {
        let doc = parse("<?xml version=\"1.1\" encoding='ISO-8859-1' standalone=\"yes\"?>\n<r/>");
        assert_eq!(
            doc.xml_declaration(),
            Some("<?xml version=\"1.1\" encoding='ISO-8859-1' standalone=\"yes\"?>")
        );
        assert_eq!(doc.version(), "1.1");
        assert_eq!(doc.encoding(), "ISO-8859-1");
        assert!(doc.standalone());
        // the newline after the declaration is a top-level text node
        let first = doc.first_child(doc.root()).unwrap();
        assert_eq!(doc.text(first).unwrap().content, "\n");
    }

    #[test]
    fn test_late_xml_pi_stays_a_node() {
        let doc = parse("<r/><?xml version=\"1.0\"?>");
        assert_eq!(doc.xml_declaration(), None);
        let last = doc.last_child(doc.root()).unwrap();
        assert_eq!(doc.node_name(last), Some("xml"));
    }

    #[test]
    fn test_doctype_with_internal_subset() {
        let input = "<?xml version=\"1.0\"?>\n<!DOCTYPE note [\n  <!-- it's here -->\n  <!ENTITY e \"a>b\">\n]>\n<note/>";
        let doc = parse(input);
        assert_eq!(
            doc.doctype(),
            Some("<!DOCTYPE note [\n  <!-- it's here -->\n  <!ENTITY e \"a>b\">\n]>")
        );
        assert_eq!(doc.doctype_preceding_whitespace(), "\n");
        assert_eq!(doc.doctype_index(), 0);
        assert_eq!(doc.node_name(doc.root_element().unwrap()), Some("note"));
    }

    #[test]
    fn test_doctype_after_comment_remembers_position() {
        let doc = parse("<!--c--><!DOCTYPE r><r/>");
        assert_eq!(doc.doctype_index(), 1);
        assert_eq!(doc.doctype_preceding_whitespace(), "");
    }

    #[test]
    fn test_processing_instruction_node() {
        let doc = parse("<?xml-stylesheet href=\"a.xsl\"?><r/>");
        let pi = doc.first_child(doc.root()).unwrap();
        match doc.kind(pi) {
            NodeKind::ProcessingInstruction(pi) => {
                assert_eq!(pi.target, "xml-stylesheet");
                assert_eq!(pi.data, "href=\"a.xsl\"");
            }
            other => panic!("expected PI, got {}", other.label()),
        }
    }

    #[test]
    fn test_cdata_is_not_decoded() {
        let doc = parse("<r><![CDATA[<&amp;>]]></r>");
        let r = doc.root_element().unwrap();
        let t = doc.text(doc.first_child(r).unwrap()).unwrap();
        assert!(t.cdata);
        assert_eq!(t.content, "<&amp;>");
        assert_eq!(t.raw, None);
    }

    #[test]
    fn test_unclosed_element_gets_empty_close_literal() {
        let doc = parse("<a><b>text");
        let a = doc.root_element().unwrap();
        let b = doc.first_child(a).unwrap();
        assert_eq!(doc.element(a).unwrap().original_close_tag.as_deref(), Some(""));
        assert_eq!(doc.element(b).unwrap().original_close_tag.as_deref(), Some(""));
        assert_eq!(doc.text_content(b), "text");
    }

    #[test]
    fn test_mismatched_end_tag_leaves_stack() {
        let doc = parse("<a><b></c></b></a>");
        let a = doc.root_element().unwrap();
        let b = doc.first_child(a).unwrap();
        assert_eq!(doc.node_name(b), Some("b"));
        assert_eq!(doc.parent(b), Some(a));
        assert_eq!(doc.first_child(b), None);
    }

    #[test]
    fn test_other_declarations_skipped() {
        let doc = parse("<r><!ELEMENT x ANY></r>");
        let r = doc.root_element().unwrap();
        assert_eq!(doc.first_child(r), None);
    }

    #[test]
    fn test_unterminated_declaration_runs_to_end() {
        let doc = parse("<r><a/><!ELEMENT x ANY");
        let r = doc.root_element().unwrap();
        assert_eq!(doc.child_count(r), 1);
        assert_eq!(doc.to_xml(), "<r><a/>");
    }

    #[test]
    fn test_root_is_first_top_level_element() {
        let doc = parse("<!--lead-->\n<first/><second/>");
        assert_eq!(doc.node_name(doc.root_element().unwrap()), Some("first"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_err("").message, "empty input");
        assert_eq!(parse_err("  \n").message, "empty input");
        assert_eq!(parse_err("<a><!-- x</a>").message, "unterminated comment");
        assert_eq!(parse_err("<a><![CDATA[x</a>").message, "unterminated CDATA section");
        assert_eq!(parse_err("<?pi x").message, "unterminated processing instruction");
        assert_eq!(parse_err("<!DOCTYPE r [ <r/>").message, "unterminated DOCTYPE");
        assert_eq!(parse_err("<a>< b/></a>").message, "empty element name");
        assert_eq!(parse_err("<a x=\"1></a>").message, "unterminated attribute value");
        assert_eq!(parse_err("<a x=1></a>").message, "missing attribute value quote");
        assert_eq!(parse_err("<a x></a>").message, "missing '=' after attribute 'x'");
        assert_eq!(parse_err("<a x='1' x='2'/>").message, "duplicate attribute 'x'");
        assert_eq!(parse_err("<a></a").message, "unterminated end tag");
    }

    #[test]
    fn test_unterminated_start_tag_position() {
        let err = parse_err("<a");
        assert_eq!(err.message, "unterminated start tag");
        assert_eq!(err.position(), 0);

        let err = parse_err("<r>\n  <child attr='1'");
        assert_eq!(err.message, "unterminated start tag");
        assert_eq!(err.location.line, 2);
        assert_eq!(err.location.column, 3);
        assert_eq!(err.position(), 6);
    }

    #[test]
    fn test_depth_limit() {
        let deep = "<a>".repeat(20);
        let options = ParseOptions::default().max_depth(10);
        let err = XmlParser::new(&deep, &options).parse().unwrap_err();
        assert_eq!(err.message, "maximum nesting depth exceeded");
    }
}
