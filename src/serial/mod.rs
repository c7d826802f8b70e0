//! Serialization of a round-trip tree back to text or bytes.
//!
//! Unmodified nodes are replayed from the text captured at parse time;
//! modified nodes are rebuilt from their decoded state. See [`Config`] for
//! the preserve, pretty, and minimal modes.
//!
//! [`Config`]: crate::Config

pub mod xml;

pub use xml::{serialize, serialize_node, serialize_with_config, write_bytes};
