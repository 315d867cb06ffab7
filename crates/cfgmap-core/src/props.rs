//! Batch property encoding and decoding
//!
//! [`Properties`] collects named values for either a tree node or a wire
//! object, dropping anything that serializes to null, an empty list, or an
//! empty object. [`PropertyDecoder`] is its inverse over a wire object: each
//! lookup consumes its slot, and whatever is left afterwards is the set of
//! fields nobody modeled.
//!
//! Absent and zero are only distinguishable end to end when the model keeps
//! optional fields as `Option`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::mapper::{self, Canonical, Mapper, Toggle, sort_canonical};

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Named values being emitted into a tree node or wire object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    map: Map<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `value` under `name` unless it is nil or empty.
    pub fn encode<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<&mut Self> {
        let value = serde_json::to_value(value)?;
        if !is_empty(&value) {
            self.map.insert(name.to_string(), value);
        }
        Ok(self)
    }

    /// Insert an already-built value, subject to the same omission rule.
    pub fn insert(&mut self, name: &str, value: Value) -> &mut Self {
        if !is_empty(&value) {
            self.map.insert(name.to_string(), value);
        }
        self
    }

    /// Emit `value` as a one-element block list.
    pub fn encode_block<T: Mapper>(&mut self, name: &str, value: &T) -> Result<&mut Self> {
        let child = mapper::to_tree(value)?;
        self.map
            .insert(name.to_string(), Value::Array(vec![Value::Object(child)]));
        Ok(self)
    }

    /// Emit an optional block only when it is set.
    pub fn encode_optional_block<T: Mapper>(
        &mut self,
        name: &str,
        value: Option<&T>,
    ) -> Result<&mut Self> {
        match value {
            Some(value) => self.encode_block(name, value),
            None => Ok(self),
        }
    }

    /// Emit a toggled block only when it is enabled.
    pub fn encode_toggle<T: Mapper + Toggle>(&mut self, name: &str, value: &T) -> Result<&mut Self> {
        if value.enabled() {
            self.encode_block(name, value)
        } else {
            Ok(self)
        }
    }

    /// Emit an ordered block list, preserving element order.
    pub fn encode_blocks<T: Mapper>(&mut self, name: &str, values: &[T]) -> Result<&mut Self> {
        let children = values
            .iter()
            .map(|value| mapper::to_tree(value).map(Value::Object))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.insert(name, Value::Array(children)))
    }

    /// Emit a block set in canonical order.
    pub fn encode_set<T: Mapper + Canonical>(
        &mut self,
        name: &str,
        values: &[T],
    ) -> Result<&mut Self> {
        let mut ordered: Vec<&T> = values.iter().collect();
        sort_canonical(&mut ordered);
        let children = ordered
            .into_iter()
            .map(|value| mapper::to_tree(value).map(Value::Object))
            .collect::<Result<Vec<_>>>()?;
        debug!(name, count = children.len(), "encoded block set");
        Ok(self.insert(name, Value::Array(children)))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.map
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.map
    }
}

/// Consuming reader over the raw fields of a wire object
#[derive(Debug, Clone, Default)]
pub struct PropertyDecoder {
    slots: Map<String, Value>,
}

impl PropertyDecoder {
    pub fn new(slots: Map<String, Value>) -> Self {
        Self { slots }
    }

    fn convert<T: DeserializeOwned>(name: &str, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| Error::InvalidField {
            field: name.to_string(),
            message: e.to_string(),
        })
    }

    /// Remove and deserialize slot `name`. A null slot is consumed as absent.
    pub fn take<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>> {
        match self.slots.remove(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Self::convert(name, value).map(Some),
        }
    }

    pub fn take_required<T: DeserializeOwned>(&mut self, name: &str) -> Result<T> {
        self.take(name)?.ok_or_else(|| Error::missing(name))
    }

    pub fn take_or_default<T: DeserializeOwned + Default>(&mut self, name: &str) -> Result<T> {
        Ok(self.take(name)?.unwrap_or_default())
    }

    /// Deserialize slot `name` into `dest`, leaving it untouched when absent.
    pub fn take_into<T: DeserializeOwned>(&mut self, name: &str, dest: &mut T) -> Result<bool> {
        match self.take(name)? {
            Some(value) => {
                *dest = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Fields not consumed by any lookup.
    pub fn into_remaining(self) -> Map<String, Value> {
        self.slots
    }
}
