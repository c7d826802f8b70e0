//! # xmltrip
//!
//! A lossless XML round-trip engine. A document is parsed into a mutable
//! tree that remembers how every piece of it was written: attribute order,
//! quote characters, whitespace inside tags, entity references, CDATA
//! sections, comments, the XML declaration and DOCTYPE. Serializing an
//! unmodified tree returns the input byte for byte; after edits, only the
//! nodes that changed are regenerated, and new content picks up the
//! indentation and quoting style of its surroundings.
//!
//! ## Quick Start
//!
//! ```
//! use xmltrip::Document;
//!
//! let input = "<project>\n    <dependency scope='test'/>\n</project>";
//! let mut doc = Document::parse_str(input).unwrap();
//! assert_eq!(doc.to_xml(), input);
//!
//! let root = doc.root_element().unwrap();
//! let dep = doc.child_element(root, "dependency").unwrap();
//! doc.set_attribute(dep, "optional", "true").unwrap();
//! assert_eq!(
//!     doc.to_xml(),
//!     "<project>\n    <dependency scope='test' optional='true'/>\n</project>"
//! );
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod format;
pub mod parser;
pub mod serial;
pub mod tree;

// Re-export primary types at the crate root for convenience.
pub use config::{Config, EmptyElementStyle};
pub use error::{ParseError, SerializeError, SourceLocation, TreeError};
pub use parser::{parse_bytes, parse_str};
pub use tree::{Attribute, Document, NodeId, NodeKind, QuoteStyle};
