//! # modelkit
//!
//! Map loosely-typed configuration trees onto registered domain object types.
//!
//! A configuration tree is a [`serde_json::Value`] made of maps, lists and
//! scalars. The [`Mapper`] walks it and produces a [`ModelObject`] graph:
//!
//! - scalars are copied unchanged
//! - lists are mapped element by element
//! - maps become instances of a registered type
//!
//! The type of a map is resolved from its dotted path in the tree. An
//! [`OverrideTable`] entry for the exact path wins; otherwise the key is
//! converted from `snake_case` to `PascalCase`. The resolved name must exist
//! in the [`TypeRegistry`], or mapping fails for the whole tree.
//!
//! ## Example
//!
//! ```
//! use modelkit::{OverrideTable, Schema, TypeDescriptor, TypeRegistry};
//! use serde_json::json;
//!
//! static TYPES: &[TypeDescriptor] = &[
//!     TypeDescriptor::new("Server", &["name", "disk"]),
//!     TypeDescriptor::new("Volume", &["size"]),
//! ];
//!
//! let schema = Schema::new(
//!     "server",
//!     TypeRegistry::from_descriptors(TYPES),
//!     OverrideTable::from_pairs(&[("server.disk", "Volume")]),
//! );
//!
//! let tree = json!({ "name": "web-1", "disk": { "size": 20 } });
//! let server = schema.mapper().map_root(&tree).unwrap();
//!
//! assert_eq!(server.type_name(), "Server");
//! assert_eq!(server.get_object("disk").unwrap().type_name(), "Volume");
//! assert_eq!(
//!     server.to_wire(),
//!     json!({ "name": "web-1", "disk": { "size": 20 } })
//! );
//! ```

pub mod case;
pub mod error;
pub mod mapper;
pub mod model;
pub mod registry;

pub use case::{to_camel_case, to_pascal_case};
pub use error::{Error, Result};
pub use mapper::Mapper;
pub use model::{Model, ModelObject};
pub use registry::{OverrideTable, Schema, TypeDescriptor, TypeRegistry};
