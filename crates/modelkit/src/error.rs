//! Error types for the modelkit crate

use thiserror::Error;

/// Errors that can occur while mapping a configuration tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A map node resolved to a type name that is not registered
    #[error("unknown type '{type_name}' for configuration field '{path}'")]
    UnknownType { type_name: String, path: String },

    /// The node handed to a root mapping was not a map
    #[error("configuration field '{path}' must be a map")]
    NotAMap { path: String },
}

/// Result type for mapping operations
pub type Result<T> = std::result::Result<T, Error>;
