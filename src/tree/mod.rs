//! Arena-based round-trip document tree.
//!
//! All nodes live in a contiguous `Vec<NodeData>` owned by the `Document`
//! and are referenced by `NodeId`, a newtype over `NonZeroU32`. Each node
//! links to its parent, its first and last child, and its siblings by index.
//! A container owns its ordered child sequence through those links; a
//! child's `parent` is only a back-reference and is always updated together
//! with the sibling links on attach and detach.
//!
//! Every node carries a *modified* flag. Parsed nodes start clean and keep
//! their literal source text; the serializer replays clean nodes verbatim
//! and regenerates modified ones. Marking a node modified walks up to the
//! document, so a node is never modified while its parent is clean.

mod attribute;
mod edit;
mod node;

pub use attribute::{Attribute, QuoteStyle};
pub use node::{Comment, Element, NodeKind, ProcessingInstruction, Text};

use std::num::NonZeroU32;

use crate::config::Config;
use crate::error::{ParseError, SerializeError, TreeError};

/// A typed index into the document's node arena.
///
/// `NodeId` is a newtype over `NonZeroU32`, so `Option<NodeId>` has the same
/// size as `NodeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Creates a `NodeId` from a raw arena index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is 0.
    #[allow(clippy::expect_used, clippy::cast_possible_truncation)]
    fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new(index as u32).expect("NodeId index must be non-zero"))
    }

    fn as_index(self) -> usize {
        self.0.get() as usize
    }
}

/// Storage for a single node in the document arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// What kind of node this is and its payload.
    pub kind: NodeKind,
    /// Containing node, if attached.
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node (for O(1) append).
    pub last_child: Option<NodeId>,
    /// Next sibling.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling.
    pub prev_sibling: Option<NodeId>,
    /// Whitespace emitted before the node. Empty for parsed nodes, whose
    /// surrounding whitespace is held by sibling text nodes.
    pub preceding_whitespace: String,
    /// Set when the node or anything beneath it was edited.
    pub modified: bool,
}

impl NodeData {
    fn new(kind: NodeKind, modified: bool) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
            preceding_whitespace: String::new(),
            modified,
        }
    }
}

/// An XML document that remembers how it was written.
///
/// # Examples
///
/// ```
/// use xmltrip::Document;
///
/// let mut doc = Document::parse_str("<project>\n  <version>1.0</version>\n</project>").unwrap();
/// let root = doc.root_element().unwrap();
/// let version = doc.child_element(root, "version").unwrap();
/// doc.set_text_content(version, "2.0").unwrap();
/// assert_eq!(doc.to_xml(), "<project>\n  <version>2.0</version>\n</project>");
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    /// The node arena. Index 0 is unused (placeholder for `NonZeroU32`).
    nodes: Vec<NodeData>,
    /// The document node id (not the root element).
    root: NodeId,
    xml_declaration: Option<String>,
    doctype: Option<String>,
    doctype_preceding_whitespace: String,
    /// Number of top-level children that precede the DOCTYPE.
    doctype_index: usize,
    root_element: Option<NodeId>,
    version: String,
    encoding: String,
    standalone: bool,
    /// The input started with a byte order mark, which is written back.
    has_bom: bool,
}

impl Document {
    /// Creates a new empty document, flagged as modified.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self::empty();
        doc.node_mut(doc.root).modified = true;
        doc
    }

    /// Creates an empty, unmodified document for the parser to fill.
    pub(crate) fn empty() -> Self {
        let mut nodes = Vec::with_capacity(64);
        // Index 0: placeholder (NodeId uses NonZeroU32)
        nodes.push(NodeData::new(NodeKind::Document, false));
        nodes.push(NodeData::new(NodeKind::Document, false));
        Self {
            nodes,
            root: NodeId::from_index(1),
            xml_declaration: None,
            doctype: None,
            doctype_preceding_whitespace: String::new(),
            doctype_index: 0,
            root_element: None,
            version: "1.0".to_string(),
            encoding: "UTF-8".to_string(),
            standalone: false,
            has_bom: false,
        }
    }

    /// Parses an XML string into a `Document`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the input is empty or malformed.
    pub fn parse_str(input: &str) -> Result<Self, ParseError> {
        crate::parser::parse_str(input)
    }

    /// Parses XML from raw bytes, detecting the encoding from a byte order
    /// mark or the XML declaration.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the bytes cannot be decoded or the resulting
    /// text is malformed.
    pub fn parse_bytes(input: &[u8]) -> Result<Self, ParseError> {
        crate::parser::parse_bytes(input)
    }

    // --- Serialization ---

    /// Serializes with the default configuration. Unmodified input comes
    /// back byte-for-byte.
    #[must_use]
    pub fn to_xml(&self) -> String {
        crate::serial::serialize(self)
    }

    /// Serializes with the given configuration.
    #[must_use]
    pub fn to_xml_with(&self, config: &Config) -> String {
        crate::serial::serialize_with_config(self, config)
    }

    /// Serializes and writes the document to `sink` in the named encoding.
    ///
    /// With `None`, the document's own encoding is used, falling back to
    /// UTF-8 if that label is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::UnsupportedEncoding`] for an unknown
    /// explicit label and [`SerializeError::Io`] if the sink fails.
    pub fn write_bytes<W: std::io::Write>(
        &self,
        sink: &mut W,
        encoding: Option<&str>,
    ) -> Result<(), SerializeError> {
        self.write_bytes_with(sink, encoding, &Config::default())
    }

    /// Like [`write_bytes`](Self::write_bytes) with an explicit configuration.
    ///
    /// # Errors
    ///
    /// See [`write_bytes`](Self::write_bytes).
    pub fn write_bytes_with<W: std::io::Write>(
        &self,
        sink: &mut W,
        encoding: Option<&str>,
        config: &Config,
    ) -> Result<(), SerializeError> {
        crate::serial::write_bytes(self, sink, encoding, config)
    }

    // --- Accessors ---

    /// Returns the document node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the designated root element.
    ///
    /// After parsing this is the first top-level element.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.root_element
    }

    /// Returns a reference to the `NodeData` for the given node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    /// Returns the node's kind and payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Returns the element payload, if `id` is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Returns the text payload, if `id` is a text or CDATA node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&Text> {
        match &self.node(id).kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the element name or PI target.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(&el.name),
            NodeKind::ProcessingInstruction(pi) => Some(&pi.target),
            _ => None,
        }
    }

    /// Returns the concatenated text of a node and all its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &mut result);
        result
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text(t) => buf.push_str(&t.content),
            NodeKind::Document | NodeKind::Element(_) => {
                for child in self.children(id) {
                    self.collect_text(child, buf);
                }
            }
            NodeKind::Comment(_) | NodeKind::ProcessingInstruction(_) => {}
        }
    }

    /// Returns an iterator over an element's attributes in source order.
    ///
    /// Empty for non-element nodes.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = &Attribute> + '_ {
        self.element(id)
            .into_iter()
            .flat_map(|el| el.attributes.values())
    }

    /// Returns the decoded value of an attribute.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attribute(name))
    }

    /// Returns the full attribute record, formatting included.
    #[must_use]
    pub fn attribute_node(&self, id: NodeId, name: &str) -> Option<&Attribute> {
        self.element(id).and_then(|el| el.attributes.get(name))
    }

    /// Returns the whitespace emitted before the node.
    #[must_use]
    pub fn preceding_whitespace(&self, id: NodeId) -> &str {
        &self.node(id).preceding_whitespace
    }

    /// Returns whether the node, or anything beneath it, has been edited.
    #[must_use]
    pub fn is_modified(&self, id: NodeId) -> bool {
        self.node(id).modified
    }

    /// The XML declaration exactly as written, if any.
    #[must_use]
    pub fn xml_declaration(&self) -> Option<&str> {
        self.xml_declaration.as_deref()
    }

    /// The DOCTYPE declaration exactly as written, if any.
    #[must_use]
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Whitespace that preceded the DOCTYPE.
    #[must_use]
    pub fn doctype_preceding_whitespace(&self) -> &str {
        &self.doctype_preceding_whitespace
    }

    pub(crate) fn doctype_index(&self) -> usize {
        self.doctype_index
    }

    /// XML version, `"1.0"` unless the declaration says otherwise.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Character encoding label, `"UTF-8"` unless declared or detected otherwise.
    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// The standalone flag from the declaration.
    #[must_use]
    pub fn standalone(&self) -> bool {
        self.standalone
    }

    /// Whether the input began with a byte order mark.
    #[must_use]
    pub fn has_bom(&self) -> bool {
        self.has_bom
    }

    /// Sets whether a byte order mark is written in front of the output.
    pub fn set_bom(&mut self, bom: bool) {
        self.has_bom = bom;
        self.mark_modified(self.root);
    }

    // --- Navigation ---

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Returns an iterator over the children of a node.
    pub fn children(&self, id: NodeId) -> Linked<'_> {
        Linked {
            doc: self,
            next: self.node(id).first_child,
            step: |n| n.next_sibling,
        }
    }

    /// Returns an iterator over the element children of a node.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(|&c| matches!(self.node(c).kind, NodeKind::Element(_)))
    }

    /// Returns the first child element with the given name.
    #[must_use]
    pub fn child_element(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(id)
            .find(|&c| self.node_name(c) == Some(name))
    }

    /// Returns an iterator over a node and its ancestors (walking up to root).
    pub fn ancestors(&self, id: NodeId) -> Linked<'_> {
        Linked {
            doc: self,
            next: Some(id),
            step: |n| n.parent,
        }
    }

    /// Returns an iterator over all descendants of a node (depth-first).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Number of element ancestors. The root element has depth 0.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id)
            .skip(1)
            .filter(|&a| matches!(self.node(a).kind, NodeKind::Element(_)))
            .count()
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Total number of nodes in the arena, detached ones included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1 // subtract placeholder at index 0
    }

    // --- Construction ---

    /// Allocates a clean node. Used by the parser.
    pub(crate) fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(NodeData::new(kind, false));
        NodeId::from_index(index)
    }

    fn create_modified(&mut self, kind: NodeKind) -> NodeId {
        let id = self.create_node(kind);
        self.node_mut(id).modified = true;
        id
    }

    /// Creates a detached element.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyName`] if `name` is empty.
    pub fn create_element(&mut self, name: &str) -> Result<NodeId, TreeError> {
        if name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        let element = Element {
            follows_empty_style: true,
            ..Element::new(name)
        };
        Ok(self.create_modified(NodeKind::Element(element)))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.create_modified(NodeKind::Text(Text::new(content)))
    }

    /// Creates a detached CDATA section.
    pub fn create_cdata(&mut self, content: &str) -> NodeId {
        self.create_modified(NodeKind::Text(Text::cdata(content)))
    }

    /// Creates a detached comment.
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.create_modified(NodeKind::Comment(Comment::new(content)))
    }

    /// Creates a detached processing instruction.
    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        self.create_modified(NodeKind::ProcessingInstruction(ProcessingInstruction::new(
            target, data,
        )))
    }

    // --- Structure ---

    /// Appends `child` as the last child of `parent`.
    ///
    /// A child that is already attached elsewhere is moved.
    ///
    /// # Errors
    ///
    /// Fails if `parent` cannot hold children, `child` is the document node,
    /// or `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.prepare_attach(parent, child)?;
        self.link_last(parent, child);
        self.finish_attach(parent);
        Ok(())
    }

    /// Inserts `child` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`append_child`](Self::append_child).
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.insert_child_at(parent, 0, child)
    }

    /// Inserts `child` so that it becomes the child at `index`. Indexes past
    /// the end append.
    ///
    /// # Errors
    ///
    /// See [`append_child`](Self::append_child).
    pub fn insert_child_at(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TreeError> {
        self.prepare_attach(parent, child)?;
        match self.children(parent).nth(index) {
            Some(reference) => self.link_before(parent, reference, child),
            None => self.link_last(parent, child),
        }
        self.finish_attach(parent);
        Ok(())
    }

    /// Inserts `new_child` immediately before `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAChild`] if `reference` is detached, plus the
    /// errors of [`append_child`](Self::append_child).
    pub fn insert_before(&mut self, reference: NodeId, new_child: NodeId) -> Result<(), TreeError> {
        if reference == new_child {
            return Ok(());
        }
        let parent = self.parent(reference).ok_or(TreeError::NotAChild)?;
        self.prepare_attach(parent, new_child)?;
        self.link_before(parent, reference, new_child);
        self.finish_attach(parent);
        Ok(())
    }

    /// Inserts `new_child` immediately after `reference`.
    ///
    /// # Errors
    ///
    /// See [`insert_before`](Self::insert_before).
    pub fn insert_after(&mut self, reference: NodeId, new_child: NodeId) -> Result<(), TreeError> {
        if reference == new_child {
            return Ok(());
        }
        let parent = self.parent(reference).ok_or(TreeError::NotAChild)?;
        self.prepare_attach(parent, new_child)?;
        match self.next_sibling(reference) {
            Some(next) => self.link_before(parent, next, new_child),
            None => self.link_last(parent, new_child),
        }
        self.finish_attach(parent);
        Ok(())
    }

    /// Detaches a node from its parent. The node stays allocated and can be
    /// attached again; the former parent is marked modified.
    pub fn detach(&mut self, id: NodeId) {
        let node = self.node(id);
        let (Some(parent), prev, next) = (node.parent, node.prev_sibling, node.next_sibling) else {
            return;
        };

        // unlink from both neighbors, or from the parent's end pointers
        *match prev {
            Some(p) => &mut self.node_mut(p).next_sibling,
            None => &mut self.node_mut(parent).first_child,
        } = next;
        *match next {
            Some(n) => &mut self.node_mut(n).prev_sibling,
            None => &mut self.node_mut(parent).last_child,
        } = prev;

        let node = self.node_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
        self.mark_modified(parent);
    }

    /// Detaches a node and, if it was the designated root element, clears
    /// the designation.
    pub fn remove_node(&mut self, id: NodeId) {
        self.detach(id);
        if self.root_element == Some(id) {
            self.root_element = None;
            self.mark_modified(self.root);
        }
    }

    /// Appends without touching modification flags. Used by the parser.
    pub(crate) fn append_parsed(&mut self, parent: NodeId, child: NodeId) {
        self.link_last(parent, child);
    }

    fn prepare_attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.node(parent).kind.is_container() {
            return Err(TreeError::NotAContainer);
        }
        if matches!(self.node(child).kind, NodeKind::Document) {
            return Err(TreeError::WrongKind);
        }
        if self.ancestors(parent).any(|a| a == child) {
            return Err(TreeError::Cycle);
        }
        self.detach(child);
        Ok(())
    }

    fn finish_attach(&mut self, parent: NodeId) {
        if let NodeKind::Element(el) = &mut self.node_mut(parent).kind {
            if el.self_closing {
                el.self_closing = false;
                el.forget_literals();
            }
        }
        self.mark_modified(parent);
    }

    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);

        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
            self.node_mut(parent).last_child = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
            self.node_mut(parent).last_child = Some(child);
        }
    }

    fn link_before(&mut self, parent: NodeId, reference: NodeId, new_child: NodeId) {
        self.node_mut(new_child).parent = Some(parent);

        if let Some(prev) = self.node(reference).prev_sibling {
            self.node_mut(prev).next_sibling = Some(new_child);
            self.node_mut(new_child).prev_sibling = Some(prev);
        } else {
            self.node_mut(parent).first_child = Some(new_child);
        }

        self.node_mut(new_child).next_sibling = Some(reference);
        self.node_mut(reference).prev_sibling = Some(new_child);
    }

    // --- Modification flags ---

    /// Flags a node and its ancestors as modified.
    ///
    /// The walk stops at the first ancestor that is already flagged: a
    /// flagged node always has a flagged parent. A designated root element
    /// that is not attached counts the document node as its parent.
    pub fn mark_modified(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(n) = current {
            let data = self.node_mut(n);
            if data.modified {
                break;
            }
            data.modified = true;
            current = data.parent;
            if current.is_none() && self.root_element == Some(n) {
                current = Some(self.root);
            }
        }
    }

    /// Clears the modification flag on a node and all of its descendants.
    ///
    /// Nodes whose literal text was discarded by an edit keep rendering from
    /// their decoded state.
    pub fn clear_modified(&mut self, id: NodeId) {
        let mut ids: Vec<NodeId> = std::iter::once(id).chain(self.descendants(id)).collect();
        if id == self.root {
            if let Some(r) = self.root_element.filter(|&r| self.parent(r).is_none()) {
                ids.extend(std::iter::once(r).chain(self.descendants(r)));
            }
        }
        for n in ids {
            self.node_mut(n).modified = false;
        }
    }

    // --- Parser hooks ---

    pub(crate) fn set_parsed_declaration(
        &mut self,
        literal: String,
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<bool>,
    ) {
        self.xml_declaration = Some(literal);
        if let Some(v) = version {
            self.version = v;
        }
        if let Some(e) = encoding {
            self.encoding = e;
        }
        if let Some(s) = standalone {
            self.standalone = s;
        }
    }

    pub(crate) fn set_parsed_doctype(&mut self, literal: String, whitespace: String) {
        self.doctype_index = self.child_count(self.root);
        self.doctype = Some(literal);
        self.doctype_preceding_whitespace = whitespace;
    }

    pub(crate) fn set_parsed_root(&mut self, id: Option<NodeId>) {
        self.root_element = id;
    }

    pub(crate) fn set_detected_encoding(&mut self, label: &str) {
        self.encoding = label.to_string();
    }

    pub(crate) fn set_parsed_bom(&mut self, bom: bool) {
        self.has_bom = bom;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// --- Iterators ---

/// Follows one link of each node in turn: the sibling link for
/// [`Document::children`], the parent link for [`Document::ancestors`].
pub struct Linked<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
    step: fn(&NodeData) -> Option<NodeId>,
}

impl Iterator for Linked<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = (self.step)(self.doc.node(current));
        Some(current)
    }
}

/// Pre-order walk of a subtree, excluding its root.
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Descendants<'_> {
    /// The node after `id` once its subtree is done: the nearest following
    /// sibling of `id` or of an ancestor below the walk's root.
    fn after_subtree(&self, mut id: NodeId) -> Option<NodeId> {
        while id != self.root {
            if let Some(sibling) = self.doc.next_sibling(id) {
                return Some(sibling);
            }
            id = self.doc.parent(id)?;
        }
        None
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self
            .doc
            .first_child(current)
            .or_else(|| self.after_subtree(current));
        Some(current)
    }
}
