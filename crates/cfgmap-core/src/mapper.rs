//! The entity mapper contract
//!
//! Every configuration entity implements [`Mapper`]: it names its schema,
//! writes itself into a [`Properties`] node, and reads itself back from a
//! [`Decoder`]. The free functions in this module wrap the contract with
//! schema validation so individual mappers only deal with their own fields.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::props::Properties;
use crate::schema::Schema;
use crate::tree::{Decoder, TreeMap};

/// Conversion between a typed entity and a configuration tree node
pub trait Mapper: Sized {
    /// The entity's schema. Must return the same descriptor on every call.
    fn schema() -> &'static Schema;

    /// Write the entity's attributes.
    ///
    /// Required attributes must always be written. Unset optional values and
    /// absent blocks must be left out entirely.
    fn to_tree(&self, props: &mut Properties) -> Result<()>;

    /// Read the entity from the node the decoder is rooted at.
    ///
    /// Absent attributes leave the field at its zero value.
    fn from_tree(decoder: &Decoder<'_>) -> Result<Self>;
}

/// Elements of an unordered collection, emitted in canonical order
pub trait Canonical {
    type Key: Ord;

    fn canonical_key(&self) -> Self::Key;
}

impl<T: Canonical + ?Sized> Canonical for &T {
    type Key = T::Key;

    fn canonical_key(&self) -> Self::Key {
        (**self).canonical_key()
    }
}

/// Sort by canonical key, descending.
pub fn sort_canonical<T: Canonical>(items: &mut [T]) {
    items.sort_by(|a, b| b.canonical_key().cmp(&a.canonical_key()));
}

/// A sub-configuration whose block presence means "enabled"
pub trait Toggle {
    fn enabled(&self) -> bool;

    /// The explicit sentinel used when the block is absent.
    fn disabled() -> Self;
}

/// An entity made of several independent toggled sub-configurations
pub trait Composite {
    /// True iff at least one sub-configuration is enabled.
    fn is_configured(&self) -> bool;
}

/// Encode an entity into a tree node, checking required attributes.
pub fn to_tree<T: Mapper>(value: &T) -> Result<TreeMap> {
    let mut props = Properties::new();
    value.to_tree(&mut props)?;
    let tree = props.into_map();
    T::schema().check_emitted(&tree)?;
    Ok(tree)
}

/// Encode an entity into a tree value.
pub fn to_tree_value<T: Mapper>(value: &T) -> Result<Value> {
    to_tree(value).map(Value::Object)
}

fn validated<'a>(tree: &'a Value, schema: &Schema) -> Result<&'a TreeMap> {
    let Value::Object(map) = tree else {
        return Err(Error::TypeMismatch {
            path: String::new(),
            expected: "block".to_string(),
            found: crate::error::type_name(tree).to_string(),
        });
    };
    schema.validate(map)?;
    Ok(map)
}

/// Validate `tree` against the entity's schema and decode it.
pub fn from_tree<T: Mapper>(tree: &Value) -> Result<T> {
    validated(tree, T::schema())?;
    let entity = T::from_tree(&Decoder::new(tree))?;
    debug!(entity = std::any::type_name::<T>(), "decoded entity from tree");
    Ok(entity)
}

/// Like [`from_tree`], with the prior tree visible to identity lookups.
pub fn from_tree_with_prior<T: Mapper>(tree: &Value, prior: &Value) -> Result<T> {
    validated(tree, T::schema())?;
    T::from_tree(&Decoder::with_prior(tree, prior))
}

/// Decode into an existing entity, replacing it only on success.
pub fn decode_into<T: Mapper>(tree: &Value, dest: &mut T) -> Result<()> {
    *dest = from_tree(tree)?;
    Ok(())
}
