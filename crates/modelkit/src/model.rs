//! Domain object graph produced by the mapper

use crate::case::to_camel_case;
use crate::registry::TypeDescriptor;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A mapped configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    /// Null list element (null map values are never stored)
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Model>),
    Object(ModelObject),
}

impl Model {
    /// Borrow the value as a string, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the value as an object, if it is one
    pub fn as_object(&self) -> Option<&ModelObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the value as a list, if it is one
    pub fn as_list(&self) -> Option<&[Model]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert into the vendor's JSON wire format (camelCase keys)
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Model::to_wire).collect()),
            Self::Object(obj) => obj.to_wire(),
        }
    }
}

/// An instance of a registered domain type
///
/// Fields hold only the keys that were present in the configuration; an
/// unset field reads back as `None`.
#[derive(Clone, PartialEq)]
pub struct ModelObject {
    descriptor: &'static TypeDescriptor,
    fields: BTreeMap<String, Model>,
}

impl ModelObject {
    /// Create an empty instance of a registered type
    pub fn new(descriptor: &'static TypeDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
        }
    }

    /// Name of the type this object was instantiated from
    pub fn type_name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Descriptor of the type this object was instantiated from
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    /// Set a field, replacing any previous value
    pub fn set(&mut self, field: impl Into<String>, value: Model) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Model> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Model::as_str)
    }

    pub fn get_object(&self, field: &str) -> Option<&ModelObject> {
        self.get(field).and_then(Model::as_object)
    }

    pub fn get_list(&self, field: &str) -> Option<&[Model]> {
        self.get(field).and_then(Model::as_list)
    }

    /// Whether a field was set
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Follow a dotted path through nested objects
    pub fn lookup(&self, dotted_path: &str) -> Option<&Model> {
        let mut parts = dotted_path.split('.');
        let first = parts.next()?;
        let mut current = self.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Iterate over the set fields in key order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Model)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert into the vendor's JSON wire format (camelCase keys)
    pub fn to_wire(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, value)| (to_camel_case(key), value.to_wire()))
            .collect();
        Value::Object(map)
    }
}

impl fmt::Debug for ModelObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.descriptor.name);
        for (key, value) in &self.fields {
            s.field(key, value);
        }
        s.finish()
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl Serialize for ModelObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}
