//! Element attributes and their captured formatting.

use std::fmt;

/// Which quote character delimits an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuoteStyle {
    /// `name='value'`
    Single,
    /// `name="value"`
    #[default]
    Double,
}

impl QuoteStyle {
    /// Returns the quote character.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }

    /// Maps a quote character to its style.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Self::Single),
            '"' => Some(Self::Double),
            _ => None,
        }
    }
}

impl fmt::Display for QuoteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single"),
            Self::Double => f.write_str("double"),
        }
    }
}

/// An XML attribute on an element.
///
/// Besides the decoded value, an attribute remembers how it was written:
/// the quote character, the whitespace before its name, and the literal
/// value text with entity references intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name as written, including any prefix.
    pub name: String,
    /// The decoded value.
    pub value: String,
    /// The value exactly as it appeared between the quotes. Cleared whenever
    /// the value is set programmatically.
    pub raw_value: Option<String>,
    /// The quote character used around the value.
    pub quote: QuoteStyle,
    /// Whitespace before the attribute name. May span a newline.
    pub preceding_whitespace: String,
}

impl Attribute {
    /// Creates a double-quoted attribute preceded by a single space.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmltrip::tree::{Attribute, QuoteStyle};
    ///
    /// let attr = Attribute::new("id", "main").with_quote(QuoteStyle::Single);
    /// assert_eq!(attr.quote, QuoteStyle::Single);
    /// assert_eq!(attr.preceding_whitespace, " ");
    /// ```
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            raw_value: None,
            quote: QuoteStyle::Double,
            preceding_whitespace: " ".to_string(),
        }
    }

    /// Sets the quote style.
    #[must_use]
    pub fn with_quote(mut self, quote: QuoteStyle) -> Self {
        self.quote = quote;
        self
    }

    /// Sets the whitespace emitted before the attribute name.
    #[must_use]
    pub fn with_preceding_whitespace(mut self, whitespace: impl Into<String>) -> Self {
        self.preceding_whitespace = whitespace.into();
        self
    }

    /// Replaces the decoded value and drops the captured literal.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.raw_value = None;
    }
}
