//! Remote collection trait for reconcilable resources
//!
//! A collection is the reconciler's only view of the outside world. The API
//! client implements it per resource kind; tests use [`crate::mock`].

use modelkit::ModelObject;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

/// Error returned by a remote collection
///
/// The reconciler needs exactly one bit of classification: whether the
/// remote says the resource does not exist.
pub trait RemoteFailure: StdError + Send + Sync + 'static {
    /// Whether the remote reported that the resource does not exist
    fn is_not_found(&self) -> bool;
}

/// Identity of a resource as listed by the remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResource {
    pub id: String,
    pub name: String,
}

impl RemoteResource {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// State of one instance backing a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl InstanceStatus {
    /// An instance is ready once it has been launched and has a private IP
    pub fn is_ready(&self) -> bool {
        self.instance_id.as_deref().is_some_and(|id| !id.is_empty())
            && self.private_ip.as_deref().is_some_and(|ip| !ip.is_empty())
    }
}

/// A collection of remote resources of one kind
///
/// Every call blocks until the remote answers.
pub trait RemoteCollection {
    type Error: RemoteFailure;

    /// Human-readable resource kind (e.g. "managed instance")
    fn kind(&self) -> &'static str;

    /// List every resource visible to the caller
    fn list(&self) -> Result<Vec<RemoteResource>, Self::Error>;

    /// Create a resource, returning its new identifier
    fn create(&self, model: &ModelObject) -> Result<String, Self::Error>;

    /// Update the resource with the given identifier
    fn update(&self, id: &str, model: &ModelObject) -> Result<(), Self::Error>;

    /// Delete the resource, optionally with cleanup options
    fn delete(&self, id: &str, cleanup: Option<&ModelObject>) -> Result<(), Self::Error>;

    /// Run a lifecycle action (e.g. "pause") on the resource
    fn run_action(&self, id: &str, action: &str) -> Result<(), Self::Error>;

    /// Instances currently backing the resource
    fn instances(&self, id: &str) -> Result<Vec<InstanceStatus>, Self::Error>;
}
