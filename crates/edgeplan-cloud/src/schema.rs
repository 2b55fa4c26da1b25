//! Attribute schema for managed resources
//!
//! A schema describes the shape of a resource's attributes and carries the
//! hints the planner needs: which lists are ordered, which are sets, which
//! attributes are computed by the remote side and which have defaults.

use serde_json::{Map, Value};

/// Shape of an attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    /// Scalar (or opaque) value compared as-is
    Value,
    /// List whose element order is significant
    List(Box<AttributeKind>),
    /// List whose element order carries no meaning
    Set(Box<AttributeKind>),
    /// Nested object with its own attributes
    Block(Vec<Attribute>),
}

/// A single attribute in a resource schema
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeKind,

    /// Set by the remote side only; never compared
    pub computed: bool,

    /// A change to this attribute requires replacing the resource
    pub force_new: bool,

    /// Value assumed when the attribute is absent
    pub default: Option<Value>,

    /// Must be present in the configuration
    pub required: bool,
}

impl Attribute {
    fn with_kind(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            computed: false,
            force_new: false,
            default: None,
            required: false,
        }
    }

    pub fn value(name: &'static str) -> Self {
        Self::with_kind(name, AttributeKind::Value)
    }

    pub fn list(name: &'static str, element: AttributeKind) -> Self {
        Self::with_kind(name, AttributeKind::List(Box::new(element)))
    }

    pub fn set(name: &'static str, element: AttributeKind) -> Self {
        Self::with_kind(name, AttributeKind::Set(Box::new(element)))
    }

    /// A single nested block, encoded as a one-element list
    pub fn block(name: &'static str, attributes: Vec<Attribute>) -> Self {
        Self::list(name, AttributeKind::Block(attributes))
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Normalized value of this attribute within `object`, `None` when unset
    pub fn normalized_in(&self, object: &Value) -> Option<Value> {
        if self.computed {
            return None;
        }

        let raw = object
            .get(self.name)
            .filter(|v| !v.is_null())
            .or(self.default.as_ref())?;

        let normalized = normalize(&self.kind, raw);
        if is_zero(&normalized) {
            None
        } else {
            Some(normalized)
        }
    }
}

/// Schema of a managed resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSchema {
    pub attributes: Vec<Attribute>,
}

impl ResourceSchema {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// First required attribute absent (or null) in `config`
    pub fn missing_required(&self, config: &Value) -> Option<&'static str> {
        self.attributes
            .iter()
            .filter(|a| a.required)
            .find(|a| config.get(a.name).is_none_or(Value::is_null))
            .map(|a| a.name)
    }

    /// Normalize a whole attribute object against this schema
    pub fn normalize(&self, value: &Value) -> Value {
        normalize_block(&self.attributes, value)
    }
}

/// Bring `value` into the canonical form for `kind`.
///
/// Sets are sorted by their canonical JSON text and deduplicated, blocks keep
/// only declared, non-zero attributes. Whole floats become integers. Values
/// that do not match the expected shape are returned unchanged so the
/// mismatch still shows up in a diff.
pub fn normalize(kind: &AttributeKind, value: &Value) -> Value {
    match (kind, value) {
        (_, Value::Number(n)) => normalize_number(n),
        (AttributeKind::List(element), Value::Array(items)) => {
            Value::Array(items.iter().map(|v| normalize(element, v)).collect())
        }
        (AttributeKind::Set(element), Value::Array(items)) => {
            let mut keyed: Vec<(String, Value)> = items
                .iter()
                .map(|v| {
                    let normalized = normalize(element, v);
                    (normalized.to_string(), normalized)
                })
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            keyed.dedup_by(|a, b| a.0 == b.0);
            Value::Array(keyed.into_iter().map(|(_, v)| v).collect())
        }
        (AttributeKind::Block(attributes), Value::Object(_)) => normalize_block(attributes, value),
        (_, v) => v.clone(),
    }
}

fn normalize_number(n: &serde_json::Number) -> Value {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Value::from(f as i64)
        }
        _ => Value::Number(n.clone()),
    }
}

fn normalize_block(attributes: &[Attribute], value: &Value) -> Value {
    let mut out = Map::new();
    for attribute in attributes {
        if let Some(v) = attribute.normalized_in(value) {
            out.insert(attribute.name.to_string(), v);
        }
    }
    Value::Object(out)
}

/// Zero values are indistinguishable from unset attributes when planning
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
