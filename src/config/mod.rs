//! Serialization and inference policy.
//!
//! A [`Config`] is an immutable value: builder methods consume and return
//! it, so a configuration can be shared freely once built.
//!
//! ```
//! use xmltrip::{Config, QuoteStyle};
//!
//! let config = Config::pretty()
//!     .indent_unit("\t")
//!     .default_quote_style(QuoteStyle::Single);
//! assert!(config.is_pretty_print());
//! assert_eq!(config.get_indent_unit(), "\t");
//! ```

use crate::tree::{Document, QuoteStyle};

/// Indent used when nothing better can be inferred.
pub const DEFAULT_INDENT: &str = "    ";

/// Line ending used when nothing better can be inferred.
pub const DEFAULT_LINE_ENDING: &str = "\n";

/// How an element created through the API is written while it has no
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmptyElementStyle {
    /// `<a></a>`
    Expanded,
    /// `<a/>`
    #[default]
    SelfClosing,
    /// `<a />`
    SelfClosingSpaced,
}

impl EmptyElementStyle {
    /// The text that ends the open tag: `>` when a close tag follows.
    #[must_use]
    pub fn tag_end(self) -> &'static str {
        match self {
            Self::Expanded => ">",
            Self::SelfClosing => "/>",
            Self::SelfClosingSpaced => " />",
        }
    }
}

/// Formatting and preservation switches consumed by the serializer and by
/// formatting inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    preserve_whitespace: bool,
    preserve_comments: bool,
    preserve_processing_instructions: bool,
    default_quote_style: QuoteStyle,
    empty_element_style: EmptyElementStyle,
    pretty_print: bool,
    indent_unit: String,
    line_ending: String,
    omit_xml_declaration: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Preserve everything: the no-op round trip is byte-identical.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            preserve_whitespace: true,
            preserve_comments: true,
            preserve_processing_instructions: true,
            default_quote_style: QuoteStyle::Double,
            empty_element_style: EmptyElementStyle::SelfClosing,
            pretty_print: false,
            indent_unit: DEFAULT_INDENT.to_string(),
            line_ending: DEFAULT_LINE_ENDING.to_string(),
            omit_xml_declaration: false,
        }
    }

    /// Re-indent the whole document, ignoring captured layout.
    #[must_use]
    pub fn pretty() -> Self {
        Self::defaults()
            .pretty_print(true)
            .preserve_whitespace(false)
    }

    /// Drop comments, processing instructions, and the XML declaration.
    #[must_use]
    pub fn minimal() -> Self {
        Self::defaults()
            .preserve_comments(false)
            .preserve_processing_instructions(false)
            .omit_xml_declaration(true)
            .preserve_whitespace(false)
    }

    /// Compact output: pretty structure with no indentation and no line
    /// breaks, which strips whitespace-only text.
    #[must_use]
    pub fn raw() -> Self {
        Self::pretty().indent_unit("").line_ending("")
    }

    /// Replay captured literals for unmodified nodes.
    #[must_use]
    pub fn preserve_whitespace(mut self, yes: bool) -> Self {
        self.preserve_whitespace = yes;
        self
    }

    /// Emit comment nodes.
    #[must_use]
    pub fn preserve_comments(mut self, yes: bool) -> Self {
        self.preserve_comments = yes;
        self
    }

    /// Emit processing-instruction nodes.
    #[must_use]
    pub fn preserve_processing_instructions(mut self, yes: bool) -> Self {
        self.preserve_processing_instructions = yes;
        self
    }

    /// Quote style for new attributes on elements with no attributes yet.
    #[must_use]
    pub fn default_quote_style(mut self, style: QuoteStyle) -> Self {
        self.default_quote_style = style;
        self
    }

    /// Form of empty elements created through the API.
    #[must_use]
    pub fn empty_element_style(mut self, style: EmptyElementStyle) -> Self {
        self.empty_element_style = style;
        self
    }

    /// Writes created empty elements the way most empty elements in `doc`
    /// are already written.
    #[must_use]
    pub fn auto_detected_empty_element_style(self, doc: &Document) -> Self {
        let style = crate::format::detect_empty_element_style(doc);
        self.empty_element_style(style)
    }

    /// Regenerate layout from depth instead of replaying it.
    #[must_use]
    pub fn pretty_print(mut self, yes: bool) -> Self {
        self.pretty_print = yes;
        self
    }

    /// Indent emitted per nesting level in pretty mode, and the fallback
    /// for indentation inference.
    #[must_use]
    pub fn indent_unit(mut self, unit: impl Into<String>) -> Self {
        self.indent_unit = unit.into();
        self
    }

    /// Line ending emitted in pretty mode.
    #[must_use]
    pub fn line_ending(mut self, ending: impl Into<String>) -> Self {
        self.line_ending = ending.into();
        self
    }

    /// Leave out the XML declaration.
    #[must_use]
    pub fn omit_xml_declaration(mut self, yes: bool) -> Self {
        self.omit_xml_declaration = yes;
        self
    }

    #[must_use]
    pub fn is_preserve_whitespace(&self) -> bool {
        self.preserve_whitespace
    }

    #[must_use]
    pub fn is_preserve_comments(&self) -> bool {
        self.preserve_comments
    }

    #[must_use]
    pub fn is_preserve_processing_instructions(&self) -> bool {
        self.preserve_processing_instructions
    }

    #[must_use]
    pub fn get_default_quote_style(&self) -> QuoteStyle {
        self.default_quote_style
    }

    #[must_use]
    pub fn get_empty_element_style(&self) -> EmptyElementStyle {
        self.empty_element_style
    }

    #[must_use]
    pub fn is_pretty_print(&self) -> bool {
        self.pretty_print
    }

    #[must_use]
    pub fn get_indent_unit(&self) -> &str {
        &self.indent_unit
    }

    #[must_use]
    pub fn get_line_ending(&self) -> &str {
        &self.line_ending
    }

    #[must_use]
    pub fn is_omit_xml_declaration(&self) -> bool {
        self.omit_xml_declaration
    }
}
