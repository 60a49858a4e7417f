//! Type registry and path-based type overrides

use crate::mapper::Mapper;
use crate::model::ModelObject;
use std::collections::HashMap;

/// A statically declared domain type
#[derive(Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type name used for resolution (e.g. "LaunchSpecification")
    pub name: &'static str,
    /// Fields the vendor schema declares for this type
    pub fields: &'static [&'static str],
}

impl TypeDescriptor {
    pub const fn new(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self { name, fields }
    }

    /// Whether the vendor schema declares this field
    pub fn declares(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }

    /// Construct an empty instance of this type
    pub fn instantiate(&'static self) -> ModelObject {
        ModelObject::new(self)
    }
}

/// Registry mapping type names to their constructors
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<&'static str, &'static TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a static descriptor table
    pub fn from_descriptors(descriptors: &'static [TypeDescriptor]) -> Self {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor);
        }
        registry
    }

    /// Register a type; a later registration with the same name wins
    pub fn register(&mut self, descriptor: &'static TypeDescriptor) {
        self.types.insert(descriptor.name, descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&'static TypeDescriptor> {
        self.types.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Instantiate a registered type by name
    pub fn instantiate(&self, name: &str) -> Option<ModelObject> {
        self.get(name).map(TypeDescriptor::instantiate)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Dotted-path overrides for type resolution
///
/// Needed where a key alone is ambiguous: the same key can name different
/// types depending on where it is nested.
#[derive(Debug, Default, Clone)]
pub struct OverrideTable {
    entries: HashMap<String, String>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(dotted_path, type_name)` pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut table = Self::new();
        for (path, type_name) in pairs {
            table.insert(*path, *type_name);
        }
        table
    }

    pub fn insert(&mut self, path: impl Into<String>, type_name: impl Into<String>) {
        self.entries.insert(path.into(), type_name.into());
    }

    /// Exact-match lookup on a full dotted path
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything needed to map one resource's configuration tree
#[derive(Debug, Clone)]
pub struct Schema {
    root: &'static str,
    registry: TypeRegistry,
    overrides: OverrideTable,
}

impl Schema {
    /// Create a schema whose trees are rooted at `root` (e.g. "managed_instance")
    pub fn new(root: &'static str, registry: TypeRegistry, overrides: OverrideTable) -> Self {
        Self {
            root,
            registry,
            overrides,
        }
    }

    /// Field name of the tree root
    pub fn root(&self) -> &'static str {
        self.root
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn mapper(&self) -> Mapper<'_> {
        Mapper::new(self)
    }
}
