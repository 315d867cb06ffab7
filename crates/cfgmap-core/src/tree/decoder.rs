//! Read cursor over a configuration tree

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::path::{PathSegment, format_path, get_at_path, parse_path};
use crate::error::{Error, Result};
use crate::mapper::{Canonical, Mapper, Toggle, sort_canonical};

/// Cursor over a proposed configuration tree and, optionally, the prior one.
///
/// Every path passed to a `Decoder` is relative to its root. The root of a
/// top-level decoder is the tree itself; [`Decoder::sub`] yields a decoder
/// rooted at one element of a repeated block. Parent mappers hand nested
/// mappers a sub-decoder rather than sharing path state.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    proposed: &'a Value,
    prior: Option<&'a Value>,
    root: Vec<PathSegment>,
}

impl<'a> Decoder<'a> {
    pub fn new(tree: &'a Value) -> Self {
        Self {
            proposed: tree,
            prior: None,
            root: Vec::new(),
        }
    }

    /// Decoder that can also see the previously applied tree.
    pub fn with_prior(tree: &'a Value, prior: &'a Value) -> Self {
        Self {
            proposed: tree,
            prior: Some(prior),
            root: Vec::new(),
        }
    }

    /// Absolute path of this decoder's root.
    pub fn path(&self) -> String {
        format_path(&self.root)
    }

    /// Absolute path of an attribute below this decoder's root.
    pub fn path_of(&self, path: &str) -> String {
        format_path(&self.resolve(path))
    }

    fn resolve(&self, path: &str) -> Vec<PathSegment> {
        let mut segments = self.root.clone();
        segments.extend(parse_path(path));
        segments
    }

    fn lookup(&self, base: &'a Value, path: &str) -> Option<&'a Value> {
        get_at_path(base, &self.resolve(path)).filter(|v| !v.is_null())
    }

    /// Value at `path` if it was explicitly set.
    ///
    /// A present `false` or `0` is returned as `Some`; only a missing key
    /// (or an explicit null) is `None`.
    pub fn get_ok(&self, path: &str) -> Option<&'a Value> {
        self.lookup(self.proposed, path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get_ok(path).is_some()
    }

    /// Prior and proposed values at `path`.
    pub fn get_change(&self, path: &str) -> (Option<&'a Value>, Option<&'a Value>) {
        let old = self.prior.and_then(|prior| self.lookup(prior, path));
        (old, self.get_ok(path))
    }

    /// Whether the proposed tree differs from the prior one at `path`.
    ///
    /// Without a prior tree every present attribute counts as changed.
    pub fn has_change(&self, path: &str) -> bool {
        let (old, new) = self.get_change(path);
        old != new
    }

    /// Number of elements in the repeated block at `path`, 0 if absent.
    pub fn count(&self, path: &str) -> usize {
        self.get_ok(path)
            .and_then(Value::as_array)
            .map_or(0, |items| items.len())
    }

    /// Decoder rooted at the `index`-th element of the repeated block `path`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Callers iterate up to
    /// [`Decoder::count`], so an out-of-range index is a mapper bug.
    pub fn sub(&self, path: &str, index: usize) -> Decoder<'a> {
        let count = self.count(path);
        assert!(
            index < count,
            "block index {index} out of range for {} ({count} elements)",
            self.path_of(path)
        );
        let mut root = self.resolve(path);
        root.push(PathSegment::Index(index));
        Decoder {
            proposed: self.proposed,
            prior: self.prior,
            root,
        }
    }

    /// Deserialize the value at `path`, `None` when absent.
    pub fn decode<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.get_ok(path)
            .map(|value| {
                T::deserialize(value).map_err(|e| Error::InvalidAttribute {
                    path: self.path_of(path),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    pub fn decode_required<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.decode(path)?
            .ok_or_else(|| Error::missing(self.path_of(path)))
    }

    /// Deserialize into `dest`, leaving it untouched when absent.
    ///
    /// Returns whether the attribute was present.
    pub fn decode_into<T: DeserializeOwned>(&self, path: &str, dest: &mut T) -> Result<bool> {
        match self.decode(path)? {
            Some(value) => {
                *dest = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Identity-like attribute: the prior value wins over the authored one.
    pub fn decode_preserved<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let (old, new) = self.get_change(path);
        old.or(new)
            .map(|value| {
                T::deserialize(value).map_err(|e| Error::InvalidAttribute {
                    path: self.path_of(path),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Decode the single instance of block `path`, `None` when absent.
    pub fn decode_block<T: Mapper>(&self, path: &str) -> Result<Option<T>> {
        match self.count(path) {
            0 => Ok(None),
            _ => T::from_tree(&self.sub(path, 0)).map(Some),
        }
    }

    /// Decode block `path`, substituting the disabled sentinel when absent.
    pub fn decode_toggle<T: Mapper + Toggle>(&self, path: &str) -> Result<T> {
        Ok(self.decode_block(path)?.unwrap_or_else(T::disabled))
    }

    /// Decode every element of the ordered block list `path`.
    pub fn decode_blocks<T: Mapper>(&self, path: &str) -> Result<Vec<T>> {
        (0..self.count(path))
            .map(|index| T::from_tree(&self.sub(path, index)))
            .collect()
    }

    /// Decode every element of the block set `path` in canonical order.
    pub fn decode_set<T: Mapper + Canonical>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = self.decode_blocks(path)?;
        sort_canonical(&mut items);
        debug!(path = %self.path_of(path), count = items.len(), "decoded block set");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_ok_distinguishes_zero_from_absent() {
        let tree = json!({"enabled": false, "delay": 0, "note": null});
        let decoder = Decoder::new(&tree);
        assert_eq!(decoder.get_ok("enabled"), Some(&json!(false)));
        assert_eq!(decoder.get_ok("delay"), Some(&json!(0)));
        assert_eq!(decoder.get_ok("note"), None);
        assert_eq!(decoder.get_ok("missing"), None);
    }

    #[test]
    fn test_sub_scopes_paths() {
        let tree = json!({"rules": [{"delay": 1}, {"delay": 2, "tags": [{"key": "a"}]}]});
        let decoder = Decoder::new(&tree);
        assert_eq!(decoder.count("rules"), 2);

        let second = decoder.sub("rules", 1);
        assert_eq!(second.path(), "rules[1]");
        assert_eq!(second.decode::<i64>("delay").unwrap(), Some(2));

        let tag = second.sub("tags", 0);
        assert_eq!(tag.path(), "rules[1].tags[0]");
        assert_eq!(tag.decode::<String>("key").unwrap().as_deref(), Some("a"));
    }

    #[test]
    #[should_panic(expected = "block index 1 out of range for space")]
    fn test_sub_out_of_range_panics() {
        let tree = json!({"space": [{"percentage": 5}]});
        let _ = Decoder::new(&tree).sub("space", 1);
    }

    #[test]
    fn test_count_absent_is_zero() {
        let tree = json!({});
        assert_eq!(Decoder::new(&tree).count("space"), 0);
    }

    #[test]
    fn test_get_change() {
        let prior = json!({"id": "abc", "name": "old"});
        let tree = json!({"name": "new"});
        let decoder = Decoder::with_prior(&tree, &prior);

        assert_eq!(decoder.get_change("id"), (Some(&json!("abc")), None));
        assert!(decoder.has_change("name"));
        assert_eq!(
            decoder.decode_preserved::<String>("id").unwrap().as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_decode_into_leaves_destination_when_absent() {
        let tree = json!({"delay": 7});
        let decoder = Decoder::new(&tree);

        let mut delay = 1_i64;
        let mut samples = 3_i64;
        assert!(decoder.decode_into("delay", &mut delay).unwrap());
        assert!(!decoder.decode_into("samples", &mut samples).unwrap());
        assert_eq!((delay, samples), (7, 3));
    }

    #[test]
    fn test_decode_error_reports_absolute_path() {
        let tree = json!({"rules": [{"delay": "soon"}]});
        let sub = Decoder::new(&tree).sub("rules", 0);
        let err = sub.decode::<i64>("delay").unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { ref path, .. } if path == "rules[0].delay"));
    }

    #[test]
    fn test_decode_required_missing() {
        let tree = json!({});
        let err = Decoder::new(&tree).decode_required::<String>("name").unwrap_err();
        assert!(err.is_schema_violation());
    }
}
