//! Attribute paths within a configuration tree
//!
//! # Path Syntax
//!
//! - Dot-separated keys: `thresholds.time_percentage`
//! - Block indexing: `space[0].percentage`
//! - Combined: `rules[1].tag_filter[0].key`
//!
//! A block is a repeated element, so addressing an attribute inside one
//! always goes through an index, even when at most one instance exists.
//!
//! ```
//! use cfgmap_core::tree::path::{parse_path, get_at_path, PathSegment};
//! use serde_json::json;
//!
//! let path = parse_path("space[0].percentage");
//! assert_eq!(path, vec![
//!     PathSegment::Key("space".to_string()),
//!     PathSegment::Index(0),
//!     PathSegment::Key("percentage".to_string()),
//! ]);
//!
//! let tree = json!({"space": [{"percentage": 10}]});
//! assert_eq!(get_at_path(&tree, &path), Some(&json!(10)));
//! ```

use std::fmt::Write as _;

use serde_json::Value;

/// A segment of a path - either an attribute name or a block index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parse a path string into segments.
///
/// Index brackets that do not contain a number are ignored.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current_key = String::new();
    let mut chars = path.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
            }
            '[' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
                let index: String = chars.by_ref().take_while(|c| *c != ']').collect();
                if let Ok(index) = index.trim().parse::<usize>() {
                    segments.push(PathSegment::Index(index));
                }
            }
            _ => current_key.push(ch),
        }
    }

    if !current_key.is_empty() {
        segments.push(PathSegment::Key(current_key));
    }

    segments
}

/// Render segments back into path syntax.
pub fn format_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
        }
    }
    out
}

/// Get a value at the given path.
///
/// Returns `None` if any segment is missing.
pub fn get_at_path<'a>(value: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    segments.iter().try_fold(value, |node, segment| match segment {
        PathSegment::Key(key) => node.get(key),
        PathSegment::Index(index) => node.get(*index),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_path_simple() {
        let path = parse_path("name");
        assert_eq!(path, vec![PathSegment::Key("name".to_string())]);
    }

    #[test]
    fn test_parse_path_dotted() {
        let path = parse_path("thresholds.time_percentage");
        assert_eq!(
            path,
            vec![
                PathSegment::Key("thresholds".to_string()),
                PathSegment::Key("time_percentage".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_path_nested_blocks() {
        let path = parse_path("rules[1].tag_filter[0].key");
        assert_eq!(
            path,
            vec![
                PathSegment::Key("rules".to_string()),
                PathSegment::Index(1),
                PathSegment::Key("tag_filter".to_string()),
                PathSegment::Index(0),
                PathSegment::Key("key".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_path_ignores_bad_index() {
        let path = parse_path("rules[x].key");
        assert_eq!(
            path,
            vec![
                PathSegment::Key("rules".to_string()),
                PathSegment::Key("key".to_string()),
            ]
        );
    }

    #[test]
    fn test_format_path_roundtrip() {
        let text = "rules[1].tag_filter[0].key";
        assert_eq!(format_path(&parse_path(text)), text);
        assert_eq!(format_path(&[]), "");
    }

    #[test]
    fn test_get_at_path_block() {
        let tree = json!({"rules": [{"delay": 1}, {"delay": 2}]});
        assert_eq!(
            get_at_path(&tree, &parse_path("rules[1].delay")),
            Some(&json!(2))
        );
        assert_eq!(get_at_path(&tree, &parse_path("rules[2].delay")), None);
    }
}
