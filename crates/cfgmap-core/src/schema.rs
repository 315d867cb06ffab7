//! Schema descriptors
//!
//! A [`Schema`] declares, per attribute, its shape ([`FieldKind`]), whether it
//! is required, optional, or computed ([`Presence`]), its cardinality bounds,
//! and a human-readable description. Schemas are plain data: entity types
//! build theirs once and hand out a `&'static` reference.
//!
//! # Examples
//!
//! ```
//! use cfgmap_core::schema::{FieldSpec, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new(vec![
//!     FieldSpec::string("name").required().describe("Display name"),
//!     FieldSpec::int("delay").describe("Delay in minutes"),
//! ]);
//!
//! let tree = json!({"name": "prod", "delay": 5});
//! assert!(schema.validate(tree.as_object().unwrap()).is_ok());
//!
//! let tree = json!({"delay": 5});
//! assert!(schema.validate(tree.as_object().unwrap()).is_err());
//! ```

use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::error::{Error, Result, type_name};
use crate::tree::path::{PathSegment, format_path};

/// Primitive value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Bool,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Bool => value.is_boolean(),
        }
    }
}

/// Whether an attribute must be authored, may be authored, or is assigned remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    Computed,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Computed => "computed",
        }
    }
}

/// Element type of a repeated attribute
#[derive(Debug, Clone, Copy)]
pub enum Element {
    Scalar(ValueKind),
    Block(&'static Schema),
}

/// Shape of an attribute
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Scalar(ValueKind),
    /// Repeated elements whose order is meaningful
    List(Element),
    /// Repeated elements emitted in canonical order
    Set(Element),
    /// Nested block, at most one instance
    Block(&'static Schema),
}

impl FieldKind {
    pub fn is_repeated(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }

    fn label(&self) -> String {
        match self {
            Self::Scalar(kind) => kind.as_str().to_string(),
            Self::List(Element::Scalar(kind)) => format!("list({})", kind.as_str()),
            Self::List(Element::Block(_)) => "list(block)".to_string(),
            Self::Set(Element::Scalar(kind)) => format!("set({})", kind.as_str()),
            Self::Set(Element::Block(_)) => "set(block)".to_string(),
            Self::Block(_) => "block".to_string(),
        }
    }
}

/// Declaration of a single attribute
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    pub min_items: usize,
    pub max_items: Option<usize>,
    pub allowed: Option<&'static [&'static str]>,
    pub description: &'static str,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        let max_items = match kind {
            FieldKind::Block(_) => Some(1),
            _ => None,
        };
        Self {
            name,
            kind,
            presence: Presence::Optional,
            min_items: 0,
            max_items,
            allowed: None,
            description: "",
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::Scalar(ValueKind::String))
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, FieldKind::Scalar(ValueKind::Int))
    }

    pub fn float(name: &'static str) -> Self {
        Self::new(name, FieldKind::Scalar(ValueKind::Float))
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, FieldKind::Scalar(ValueKind::Bool))
    }

    pub fn block(name: &'static str, schema: &'static Schema) -> Self {
        Self::new(name, FieldKind::Block(schema))
    }

    pub fn list_of(name: &'static str, kind: ValueKind) -> Self {
        Self::new(name, FieldKind::List(Element::Scalar(kind)))
    }

    pub fn list_of_blocks(name: &'static str, schema: &'static Schema) -> Self {
        Self::new(name, FieldKind::List(Element::Block(schema)))
    }

    pub fn set_of(name: &'static str, kind: ValueKind) -> Self {
        Self::new(name, FieldKind::Set(Element::Scalar(kind)))
    }

    pub fn set_of_blocks(name: &'static str, schema: &'static Schema) -> Self {
        Self::new(name, FieldKind::Set(Element::Block(schema)))
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = min;
        self
    }

    /// Upper bound on repeated elements. Blocks are always capped at one.
    pub fn max_items(mut self, max: usize) -> Self {
        if !matches!(self.kind, FieldKind::Block(_)) {
            self.max_items = Some(max);
        }
        self
    }

    /// Restrict a string attribute to a closed catalog.
    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = Some(values);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }

    /// Schema of nested blocks, if this attribute holds blocks.
    pub fn element_schema(&self) -> Option<&'static Schema> {
        match self.kind {
            FieldKind::Block(schema)
            | FieldKind::List(Element::Block(schema))
            | FieldKind::Set(Element::Block(schema)) => Some(schema),
            _ => None,
        }
    }

    fn bounds_label(&self) -> String {
        match (self.min_items, self.max_items) {
            (0, None) => String::new(),
            (min, None) => format!("{min}.."),
            (min, Some(max)) => format!("{min}..={max}"),
        }
    }
}

/// Ordered collection of attribute declarations for one entity type
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of attributes the mapper must always emit.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_required())
    }

    /// Validate a tree node against this schema, recursing into blocks.
    pub fn validate(&self, tree: &Map<String, Value>) -> Result<()> {
        self.validate_at(tree, &mut Vec::new())
    }

    pub(crate) fn validate_at(
        &self,
        tree: &Map<String, Value>,
        path: &mut Vec<PathSegment>,
    ) -> Result<()> {
        for key in tree.keys() {
            if self.field(key).is_none() {
                return Err(Error::UnknownAttribute {
                    path: child_path(path, key),
                });
            }
        }

        for spec in &self.fields {
            path.push(PathSegment::Key(spec.name.to_string()));
            let result = match tree.get(spec.name).filter(|v| !v.is_null()) {
                None if spec.is_required() => Err(Error::missing(format_path(path))),
                None => Ok(()),
                Some(value) => validate_field(spec, value, path),
            };
            path.pop();
            result?;
        }
        Ok(())
    }

    /// Check that an emitted tree carries every required attribute.
    pub fn check_emitted(&self, tree: &Map<String, Value>) -> Result<()> {
        for spec in self.required_fields() {
            if tree.get(spec.name).is_none_or(Value::is_null) {
                return Err(Error::missing(spec.name));
            }
        }
        Ok(())
    }

    /// Render a human-readable field table.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out, 0);
        out
    }

    fn describe_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        for spec in &self.fields {
            let _ = write!(
                out,
                "{indent}{} ({}, {}",
                spec.name,
                spec.kind.label(),
                spec.presence.as_str()
            );
            let bounds = spec.bounds_label();
            if !bounds.is_empty() && !matches!(spec.kind, FieldKind::Block(_)) {
                let _ = write!(out, ", items {bounds}");
            }
            out.push(')');
            if !spec.description.is_empty() {
                let _ = write!(out, " - {}", spec.description);
            }
            if let Some(allowed) = spec.allowed {
                let _ = write!(out, " [{}]", allowed.join(", "));
            }
            out.push('\n');
            if let Some(child) = spec.element_schema() {
                child.describe_into(out, depth + 1);
            }
        }
    }
}

fn child_path(path: &[PathSegment], key: &str) -> String {
    let mut segments = path.to_vec();
    segments.push(PathSegment::Key(key.to_string()));
    format_path(&segments)
}

fn validate_field(spec: &FieldSpec, value: &Value, path: &mut Vec<PathSegment>) -> Result<()> {
    match spec.kind {
        FieldKind::Scalar(kind) => validate_scalar(kind, spec.allowed, value, path),
        FieldKind::Block(_) | FieldKind::List(_) | FieldKind::Set(_) => {
            let Value::Array(items) = value else {
                return Err(mismatch(path, &spec.kind.label(), value));
            };
            let over = spec.max_items.is_some_and(|max| items.len() > max);
            let under = spec.is_required() && items.len() < spec.min_items;
            if over || under {
                return Err(Error::Cardinality {
                    path: format_path(path),
                    count: items.len(),
                    min: spec.min_items,
                    max: spec
                        .max_items
                        .map_or_else(|| "unbounded".to_string(), |m| m.to_string()),
                });
            }
            let element = match spec.kind {
                FieldKind::Block(schema) => Element::Block(schema),
                FieldKind::List(element) | FieldKind::Set(element) => element,
                FieldKind::Scalar(_) => unreachable!("scalar handled above"),
            };
            for (index, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                let result = match element {
                    Element::Scalar(kind) => validate_scalar(kind, spec.allowed, item, path),
                    Element::Block(schema) => match item {
                        Value::Object(map) => schema.validate_at(map, path),
                        other => Err(mismatch(path, "block", other)),
                    },
                };
                path.pop();
                result?;
            }
            Ok(())
        }
    }
}

fn validate_scalar(
    kind: ValueKind,
    allowed: Option<&'static [&'static str]>,
    value: &Value,
    path: &[PathSegment],
) -> Result<()> {
    if !kind.accepts(value) {
        return Err(mismatch(path, kind.as_str(), value));
    }
    if let (Some(allowed), Some(text)) = (allowed, value.as_str()) {
        if !allowed.contains(&text) {
            return Err(Error::NotInCatalog {
                path: format_path(path),
                value: text.to_string(),
                allowed: allowed.to_vec(),
            });
        }
    }
    Ok(())
}

fn mismatch(path: &[PathSegment], expected: &str, found: &Value) -> Error {
    Error::TypeMismatch {
        path: format_path(path),
        expected: expected.to_string(),
        found: type_name(found).to_string(),
    }
}
