//! # Declarative
//!
//! Declarative reconciliation of remote resources.
//!
//! Given a desired configuration tree and a [`RemoteCollection`], the
//! reconciler decides whether the target exists and converges it:
//!
//! - **Resolve identity**: by explicit id, or by listing and matching names
//! - **Create**: map the configuration and submit it, optionally waiting for
//!   instances to become ready
//! - **Update**: drop excluded fields, map, submit, then attempt an optional
//!   lifecycle action
//! - **Delete**: submit with optional cleanup options; "already gone" is not
//!   an error
//!
//! ## Example
//!
//! ```
//! use declarative::mock::MockCollection;
//! use declarative::{DesiredState, ReconcileRequest, Uniqueness, reconcile};
//! use modelkit::{OverrideTable, Schema, TypeDescriptor, TypeRegistry};
//! use serde_json::json;
//!
//! static TYPES: &[TypeDescriptor] = &[TypeDescriptor::new("Group", &["name"])];
//! let schema = Schema::new("group", TypeRegistry::from_descriptors(TYPES), OverrideTable::new());
//!
//! let collection = MockCollection::new("group");
//! let request = ReconcileRequest::new(DesiredState::Present, Uniqueness::Name);
//! let outcome = reconcile(&json!({ "name": "grp-1" }), &request, &schema, &collection).unwrap();
//!
//! assert!(outcome.changed);
//! ```
//!
//! ## Provider Traits
//!
//! - [`RemoteCollection`]: list/create/update/delete/actions for one resource kind
//! - [`RemoteFailure`]: tells the reconciler whether an error means "not found"
//! - [`ProgressCallback`]: receives wait-loop progress

pub mod error;
pub mod exclusion;
pub mod mock;
pub mod reconciler;
pub mod remote;
pub mod types;
pub mod wait;

// Re-export main types at crate root
pub use error::ReconcileError;
pub use exclusion::ExclusionList;
pub use reconciler::{Phase, reconcile, reconcile_with_progress, resolve_operation};
pub use remote::{InstanceStatus, RemoteCollection, RemoteFailure, RemoteResource};
pub use types::{
    CleanupOptions, DesiredState, Operation, OperationKind, ReconcileOutcome, ReconcileRequest,
    Uniqueness,
};
pub use wait::{NoProgress, ProgressCallback, WaitOutcome, WaitPolicy, wait_until_ready};
