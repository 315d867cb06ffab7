//! Schema-driven configuration mapping
//!
//! Converts configuration entities between three representations:
//!
//! - a typed in-memory model,
//! - a nested configuration tree of attributes and blocks ([`tree`]),
//! - the wire JSON exchanged with a remote configuration API ([`wire`]).
//!
//! Each entity declares a [`Schema`] and implements [`Mapper`] for the tree
//! side and [`WireEntity`] for the wire side. The batch helpers in [`props`]
//! keep both implementations short.

pub mod catalog;
pub mod document;
pub mod error;
pub mod mapper;
pub mod props;
pub mod schema;
pub mod tree;
pub mod wire;

pub use catalog::UnknownVariant;
pub use document::{TreeFormat, load_tree, save_tree};
pub use error::{Error, ErrorKind, Result};
pub use mapper::{Canonical, Composite, Mapper, Toggle, from_tree, from_tree_with_prior, to_tree};
pub use props::{Properties, PropertyDecoder};
pub use schema::{Element, FieldKind, FieldSpec, Presence, Schema, ValueKind};
pub use tree::{Decoder, TreeMap};
pub use wire::{Identified, Unknowns, WireEntity};

#[doc(hidden)]
pub use serde as __serde;
#[doc(hidden)]
pub use serde_json as __serde_json;
