//! Configuration tree addressing and reading
//!
//! A configuration tree is a JSON object whose scalar attributes are plain
//! values and whose blocks are lists of objects. A block that allows a single
//! instance is still a one-element list.

pub mod decoder;
pub mod path;

pub use decoder::Decoder;
pub use path::{PathSegment, format_path, get_at_path, parse_path};

/// A configuration tree node: attribute name to value.
pub type TreeMap = serde_json::Map<String, serde_json::Value>;
