//! Core types for declarative reconciliation

use crate::exclusion::ExclusionList;
use crate::wait::WaitPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Requested end state of a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    /// Resource should exist and match the configuration
    #[default]
    Present,
    /// Resource should not exist
    Absent,
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// How the target resource is identified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Uniqueness {
    /// By an explicit opaque identifier
    Id,
    /// By matching the configured name against the live inventory
    #[default]
    Name,
}

impl fmt::Display for Uniqueness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => write!(f, "id"),
            Self::Name => write!(f, "name"),
        }
    }
}

/// Operation chosen once identity has been resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update { id: String },
    Delete { id: String },
    /// Nothing to do (absent resource requested absent)
    Noop { message: String },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Create => OperationKind::Create,
            Self::Update { .. } => OperationKind::Update,
            Self::Delete { .. } => OperationKind::Delete,
            Self::Noop { .. } => OperationKind::None,
        }
    }
}

/// Kind of operation performed, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    None,
}

/// Cleanup options sent along with a delete
///
/// `config` is the configuration map; it is mapped as `type_name` with
/// `field` as its root path.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupOptions {
    pub field: String,
    pub type_name: String,
    pub config: Value,
}

impl CleanupOptions {
    pub fn new(field: impl Into<String>, type_name: impl Into<String>, config: Value) -> Self {
        Self {
            field: field.into(),
            type_name: type_name.into(),
            config,
        }
    }
}

/// Everything the caller asked for besides the desired configuration
#[derive(Debug, Clone, Default)]
pub struct ReconcileRequest {
    pub state: DesiredState,
    pub uniqueness: Uniqueness,
    /// Explicit identifier (only meaningful with `Uniqueness::Id`)
    pub explicit_id: Option<String>,
    /// Fields never sent on update
    pub exclusions: ExclusionList,
    /// Lifecycle action attempted after a successful update
    pub action: Option<String>,
    /// Cleanup options sent with a delete
    pub cleanup: Option<CleanupOptions>,
    /// Wait for instances to become ready after a create
    pub wait: Option<WaitPolicy>,
}

impl ReconcileRequest {
    pub fn new(state: DesiredState, uniqueness: Uniqueness) -> Self {
        Self {
            state,
            uniqueness,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.explicit_id = id;
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionList) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_action(mut self, action: Option<String>) -> Self {
        self.action = action;
        self
    }

    pub fn with_cleanup(mut self, cleanup: Option<CleanupOptions>) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn with_wait(mut self, wait: Option<WaitPolicy>) -> Self {
        self.wait = wait;
        self
    }
}

/// Result of one reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub operation: OperationKind,
    pub changed: bool,
    /// Identifier of the resource acted on, when known
    pub id: Option<String>,
    pub message: String,
}

impl ReconcileOutcome {
    pub fn changed(operation: OperationKind, id: Option<String>, message: String) -> Self {
        Self {
            operation,
            changed: true,
            id,
            message,
        }
    }

    pub fn unchanged(operation: OperationKind, id: Option<String>, message: String) -> Self {
        Self {
            operation,
            changed: false,
            id,
            message,
        }
    }
}
