//! Configuration tree to domain object mapping

use crate::case::to_pascal_case;
use crate::error::{Error, Result};
use crate::model::{Model, ModelObject};
use crate::registry::Schema;
use serde_json::{Map, Value};

/// Maps configuration trees onto a schema's registered types
///
/// Mapping is deterministic and never fills in defaults: a field is set on
/// the output only when its key is present (and non-null) in the input.
#[derive(Debug, Clone, Copy)]
pub struct Mapper<'a> {
    schema: &'a Schema,
}

impl<'a> Mapper<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Map a whole resource tree found under the schema's root field
    pub fn map_root(&self, tree: &Value) -> Result<ModelObject> {
        let root = self.schema.root();
        match self.map(tree, root, None)? {
            Model::Object(obj) => Ok(obj),
            _ => Err(Error::NotAMap {
                path: root.to_string(),
            }),
        }
    }

    /// Map a node found under `field_name`, with `path` the dotted path of
    /// its parent map (`None` at the root)
    pub fn map(&self, node: &Value, field_name: &str, path: Option<&str>) -> Result<Model> {
        match node {
            Value::Null => Ok(Model::Null),
            Value::Bool(b) => Ok(Model::Bool(*b)),
            Value::Number(n) => Ok(Model::Number(n.clone())),
            Value::String(s) => Ok(Model::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| self.map(item, field_name, path))
                .collect::<Result<Vec<_>>>()
                .map(Model::List),
            Value::Object(entries) => {
                let child_path = match path {
                    Some(parent) => format!("{parent}.{field_name}"),
                    None => field_name.to_string(),
                };
                let type_name = self.resolve_type_name(field_name, &child_path);
                self.map_entries(entries, &type_name, &child_path)
                    .map(Model::Object)
            }
        }
    }

    /// Map a map node as an explicitly named type, rooted at `field_name`
    pub fn map_as(&self, node: &Value, type_name: &str, field_name: &str) -> Result<ModelObject> {
        match node {
            Value::Object(entries) => self.map_entries(entries, type_name, field_name),
            _ => Err(Error::NotAMap {
                path: field_name.to_string(),
            }),
        }
    }

    /// Resolve the type name for a map found at `path` under `field_name`
    pub fn resolve_type_name(&self, field_name: &str, path: &str) -> String {
        self.schema
            .overrides()
            .resolve(path)
            .map_or_else(|| to_pascal_case(field_name), str::to_string)
    }

    fn map_entries(
        &self,
        entries: &Map<String, Value>,
        type_name: &str,
        path: &str,
    ) -> Result<ModelObject> {
        let mut instance =
            self.schema
                .registry()
                .instantiate(type_name)
                .ok_or_else(|| Error::UnknownType {
                    type_name: type_name.to_string(),
                    path: path.to_string(),
                })?;

        for (key, value) in entries {
            if value.is_null() {
                continue;
            }
            if !instance.descriptor().declares(key) {
                log::warn!("'{path}.{key}' is not a declared field of {type_name}");
            }
            let mapped = self.map(value, key, Some(path))?;
            instance.set(key.clone(), mapped);
        }

        Ok(instance)
    }
}
