//! Content edits on an existing tree.
//!
//! Every operation here marks the touched node modified. Operations that
//! change what an element's tags would look like also drop the element's
//! cached tag literals, so the serializer renders them from decoded state
//! even after the flags are cleared.

use tracing::trace;

use super::{Attribute, Document, Element, NodeId, NodeKind, ProcessingInstruction, Text};
use crate::config::Config;
use crate::error::TreeError;
use crate::format::infer_attribute_formatting;

impl Document {
    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, TreeError> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(TreeError::NotAnElement),
        }
    }

    fn text_mut(&mut self, id: NodeId) -> Result<&mut Text, TreeError> {
        match &mut self.node_mut(id).kind {
            NodeKind::Text(t) => Ok(t),
            _ => Err(TreeError::WrongKind),
        }
    }

    fn pi_mut(&mut self, id: NodeId) -> Result<&mut ProcessingInstruction, TreeError> {
        match &mut self.node_mut(id).kind {
            NodeKind::ProcessingInstruction(pi) => Ok(pi),
            _ => Err(TreeError::WrongKind),
        }
    }

    /// Applies `edit` to an element's tag and marks it modified.
    fn edit_tag(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut Element),
    ) -> Result<(), TreeError> {
        let el = self.element_mut(id)?;
        edit(el);
        el.forget_literals();
        self.mark_modified(id);
        Ok(())
    }

    // --- Elements ---

    /// Renames an element.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an element or `name` is empty.
    pub fn rename_element(&mut self, id: NodeId, name: &str) -> Result<(), TreeError> {
        if name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        self.edit_tag(id, |el| el.name = name.to_string())
    }

    /// Sets an attribute value using the default configuration for any
    /// formatting that has to be inferred.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an element or `name` is empty.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), TreeError> {
        self.set_attribute_with(id, name, value, &Config::default())
    }

    /// Sets an attribute value.
    ///
    /// An existing attribute keeps its position, quote style, and preceding
    /// whitespace. A new attribute is appended with formatting inferred from
    /// the element's other attributes.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an element or `name` is empty.
    pub fn set_attribute_with(
        &mut self,
        id: NodeId,
        name: &str,
        value: &str,
        config: &Config,
    ) -> Result<(), TreeError> {
        if name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        let exists = self
            .element(id)
            .ok_or(TreeError::NotAnElement)?
            .attributes
            .contains_key(name);
        let attr = if exists {
            None
        } else {
            let fmt = infer_attribute_formatting(self, id, config);
            trace!(attribute = name, quote = %fmt.quote, "inferred attribute formatting");
            Some(
                Attribute::new(name, value)
                    .with_quote(fmt.quote)
                    .with_preceding_whitespace(fmt.preceding_whitespace),
            )
        };
        self.edit_tag(id, |el| match attr {
            Some(attr) => {
                el.attributes.insert(name.to_string(), attr);
            }
            None => {
                if let Some(existing) = el.attributes.get_mut(name) {
                    existing.set_value(value);
                }
            }
        })
    }

    /// Inserts a fully specified attribute, replacing any attribute of the
    /// same name in place.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an element or the attribute name is empty.
    pub fn insert_attribute(&mut self, id: NodeId, attr: Attribute) -> Result<(), TreeError> {
        if attr.name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        self.edit_tag(id, |el| {
            el.attributes.insert(attr.name.clone(), attr);
        })
    }

    /// Removes an attribute, keeping the order of the rest. Returns the
    /// removed attribute.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an element.
    pub fn remove_attribute(
        &mut self,
        id: NodeId,
        name: &str,
    ) -> Result<Option<Attribute>, TreeError> {
        if !self
            .element(id)
            .ok_or(TreeError::NotAnElement)?
            .attributes
            .contains_key(name)
        {
            return Ok(None);
        }
        let mut removed = None;
        self.edit_tag(id, |el| removed = el.attributes.shift_remove(name))?;
        Ok(removed)
    }

    /// Switches between `<a/>` and `<a></a>` forms. Ignored while the element
    /// has children. The choice overrides the configured empty-element
    /// style.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an element.
    pub fn set_self_closing(&mut self, id: NodeId, self_closing: bool) -> Result<(), TreeError> {
        let has_children = self.first_child(id).is_some();
        self.edit_tag(id, |el| {
            el.self_closing = self_closing && !has_children;
            el.follows_empty_style = false;
        })
    }

    /// Sets the whitespace inside the open tag before `>` or `/>`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an element.
    pub fn set_open_tag_whitespace(&mut self, id: NodeId, ws: &str) -> Result<(), TreeError> {
        self.edit_tag(id, |el| el.open_tag_whitespace = ws.to_string())
    }

    /// Sets the whitespace between `</` and the name in the close tag.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an element.
    pub fn set_close_tag_whitespace(&mut self, id: NodeId, ws: &str) -> Result<(), TreeError> {
        self.edit_tag(id, |el| el.close_tag_whitespace = ws.to_string())
    }

    /// Sets the whitespace emitted just before the close tag of a childless
    /// element.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an element.
    pub fn set_inner_whitespace(&mut self, id: NodeId, ws: &str) -> Result<(), TreeError> {
        self.edit_tag(id, |el| el.inner_whitespace = ws.to_string())
    }

    // --- Leaves ---

    /// Sets text content.
    ///
    /// On a text or CDATA node this replaces the content. On an element it
    /// removes every text child and, if `content` is non-empty, appends a
    /// single new text node.
    ///
    /// # Errors
    ///
    /// Fails for comments, processing instructions, and the document node.
    pub fn set_text_content(&mut self, id: NodeId, content: &str) -> Result<(), TreeError> {
        if let Ok(text) = self.text_mut(id) {
            text.content = content.to_string();
            text.raw = None;
            self.mark_modified(id);
            return Ok(());
        }
        match self.element_mut(id) {
            Ok(el) if !content.is_empty() => el.inner_whitespace.clear(),
            Ok(_) => {}
            Err(_) => return Err(TreeError::WrongKind),
        }
        let texts: Vec<NodeId> = self
            .children(id)
            .filter(|&c| matches!(self.node(c).kind, NodeKind::Text(_)))
            .collect();
        for t in texts {
            self.detach(t);
        }
        if !content.is_empty() {
            let t = self.create_text(content);
            self.append_child(id, t)?;
        }
        self.mark_modified(id);
        Ok(())
    }

    /// Replaces a text node's content while keeping its leading and trailing
    /// whitespace, so `"\n    1.0\n"` becomes `"\n    2.0\n"`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a text node.
    pub fn set_text_preserving_whitespace(
        &mut self,
        id: NodeId,
        content: &str,
    ) -> Result<(), TreeError> {
        let text = self.text_mut(id)?;
        let old = &text.content;
        let trimmed_start = old.trim_start();
        let leading = &old[..old.len() - trimmed_start.len()];
        let trailing = &trimmed_start[trimmed_start.trim_end().len()..];
        text.content = format!("{leading}{content}{trailing}");
        text.raw = None;
        self.mark_modified(id);
        Ok(())
    }

    /// Turns a text node into a CDATA section or back.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a text node.
    pub fn set_cdata(&mut self, id: NodeId, cdata: bool) -> Result<(), TreeError> {
        let text = self.text_mut(id)?;
        text.cdata = cdata;
        text.raw = None;
        self.mark_modified(id);
        Ok(())
    }

    /// Sets whether a text node survives whitespace stripping in pretty mode.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a text node.
    pub fn set_preserve_whitespace(&mut self, id: NodeId, preserve: bool) -> Result<(), TreeError> {
        self.text_mut(id)?.preserve_whitespace = preserve;
        self.mark_modified(id);
        Ok(())
    }

    /// Sets the body of a comment.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a comment.
    pub fn set_comment_content(&mut self, id: NodeId, content: &str) -> Result<(), TreeError> {
        match &mut self.node_mut(id).kind {
            NodeKind::Comment(c) => c.content = content.to_string(),
            _ => return Err(TreeError::WrongKind),
        }
        self.mark_modified(id);
        Ok(())
    }

    /// Sets a processing instruction's target.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a processing instruction or `target` is empty.
    pub fn set_pi_target(&mut self, id: NodeId, target: &str) -> Result<(), TreeError> {
        if target.is_empty() {
            return Err(TreeError::EmptyName);
        }
        let pi = self.pi_mut(id)?;
        pi.target = target.to_string();
        pi.raw = None;
        self.mark_modified(id);
        Ok(())
    }

    /// Sets a processing instruction's data.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not a processing instruction.
    pub fn set_pi_data(&mut self, id: NodeId, data: &str) -> Result<(), TreeError> {
        let pi = self.pi_mut(id)?;
        pi.data = data.to_string();
        pi.raw = None;
        self.mark_modified(id);
        Ok(())
    }

    /// Sets the whitespace emitted before a node.
    pub fn set_preceding_whitespace(&mut self, id: NodeId, ws: &str) {
        self.node_mut(id).preceding_whitespace = ws.to_string();
        self.mark_modified(id);
    }

    // --- Document ---

    /// Designates the root element. The element does not have to be attached;
    /// a detached root is emitted after the document's children.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an element.
    pub fn set_root_element(&mut self, id: NodeId) -> Result<(), TreeError> {
        if self.element(id).is_none() {
            return Err(TreeError::NotAnElement);
        }
        self.root_element = Some(id);
        self.mark_modified(self.root);
        Ok(())
    }

    /// Replaces the literal XML declaration. `None` removes it.
    pub fn set_xml_declaration(&mut self, declaration: Option<&str>) {
        self.xml_declaration = declaration.map(str::to_string);
        self.mark_modified(self.root);
    }

    /// Adds a declaration built from the version, encoding, and standalone
    /// values if the document has none.
    pub fn ensure_xml_declaration(&mut self) {
        if self.xml_declaration.is_none() {
            let decl = self.generate_xml_declaration();
            self.set_xml_declaration(Some(&decl));
        }
    }

    /// Builds `<?xml version="…" encoding="…"?>` from the document scalars.
    #[must_use]
    pub fn generate_xml_declaration(&self) -> String {
        let mut decl = format!(
            "<?xml version=\"{}\" encoding=\"{}\"",
            self.version, self.encoding
        );
        if self.standalone {
            decl.push_str(" standalone=\"yes\"");
        }
        decl.push_str("?>");
        decl
    }

    /// Replaces the literal DOCTYPE. A new DOCTYPE is placed before all
    /// top-level nodes; `None` removes it.
    pub fn set_doctype(&mut self, doctype: Option<&str>) {
        if self.doctype.is_none() {
            self.doctype_index = 0;
        }
        self.doctype = doctype.map(str::to_string);
        if self.doctype.is_none() {
            self.doctype_preceding_whitespace.clear();
        }
        self.mark_modified(self.root);
    }

    /// Sets the whitespace emitted before the DOCTYPE.
    pub fn set_doctype_preceding_whitespace(&mut self, ws: &str) {
        self.doctype_preceding_whitespace = ws.to_string();
        self.mark_modified(self.root);
    }

    /// Sets the version used when synthesizing a declaration.
    pub fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
        self.mark_modified(self.root);
    }

    /// Sets the encoding label used when synthesizing a declaration and as
    /// the default for [`write_bytes`](Document::write_bytes).
    pub fn set_encoding(&mut self, encoding: &str) {
        self.encoding = encoding.to_string();
        self.mark_modified(self.root);
    }

    /// Sets the standalone flag used when synthesizing a declaration.
    pub fn set_standalone(&mut self, standalone: bool) {
        self.standalone = standalone;
        self.mark_modified(self.root);
    }
}
