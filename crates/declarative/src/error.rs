//! Error types for reconciliation

use std::error::Error as StdError;
use thiserror::Error;

/// Fatal reconciliation errors
///
/// Configuration errors are raised before any mutating remote call;
/// `Remote` carries the collection's error untouched.
#[derive(Error, Debug)]
pub enum ReconcileError<E: StdError + 'static> {
    /// Delete by id requested without an id
    #[error("failed deleting {kind} - 'uniqueness_by' is set to 'id' but parameter 'id' was not provided")]
    MissingId { kind: &'static str },

    /// Name uniqueness requested but the configuration has no name
    #[error("'uniqueness_by' is set to 'name' but the {kind} configuration has no 'name'")]
    MissingName { kind: &'static str },

    /// More than one remote resource carries the configured name
    #[error("'uniqueness_by' is set to 'name' but there are {count} {kind}s named '{name}'")]
    AmbiguousName {
        kind: &'static str,
        name: String,
        count: usize,
    },

    /// The configuration could not be mapped onto the domain types
    #[error("invalid configuration: {0}")]
    Mapping(#[from] modelkit::Error),

    /// A remote call failed
    #[error("failed {operation} {kind}{}: {source}", id_suffix(.id))]
    Remote {
        kind: &'static str,
        operation: &'static str,
        id: Option<String>,
        #[source]
        source: E,
    },
}

fn id_suffix(id: &Option<String>) -> String {
    id.as_ref()
        .map(|id| format!(" (ID: {id})"))
        .unwrap_or_default()
}

impl<E: StdError + 'static> ReconcileError<E> {
    pub(crate) fn remote(
        kind: &'static str,
        operation: &'static str,
        id: Option<&str>,
        source: E,
    ) -> Self {
        Self::Remote {
            kind,
            operation,
            id: id.map(str::to_string),
            source,
        }
    }

    /// Whether this error comes from the caller's configuration
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::Remote { .. })
    }

    /// The remote error, if this is one
    pub fn remote_source(&self) -> Option<&E> {
        match self {
            Self::Remote { source, .. } => Some(source),
            _ => None,
        }
    }
}
