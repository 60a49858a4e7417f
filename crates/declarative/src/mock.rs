//! In-memory collection for tests
//!
//! ```
//! use declarative::mock::MockCollection;
//! use declarative::{RemoteCollection, RemoteResource};
//!
//! let mock = MockCollection::new("managed instance");
//! mock.add_resource(RemoteResource::new("smi-1", "web"));
//!
//! assert_eq!(mock.list().unwrap().len(), 1);
//! ```

use crate::remote::{InstanceStatus, RemoteCollection, RemoteFailure, RemoteResource};
use modelkit::ModelObject;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Error produced by [`MockCollection`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct MockError {
    pub message: String,
    pub not_found: bool,
}

impl MockError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            not_found: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            not_found: true,
        }
    }
}

impl RemoteFailure for MockError {
    fn is_not_found(&self) -> bool {
        self.not_found
    }
}

/// A recorded call; models are stored in wire format
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(Value),
    Update(String, Value),
    Delete(String, Option<Value>),
    Action(String, String),
    Instances(String),
}

#[derive(Debug, Default)]
struct State {
    resources: Vec<RemoteResource>,
    instances: HashMap<String, Vec<InstanceStatus>>,
    failures: HashMap<&'static str, MockError>,
    calls: Vec<Call>,
    next_id: usize,
}

/// In-memory [`RemoteCollection`] recording every call
#[derive(Debug, Clone)]
pub struct MockCollection {
    kind: &'static str,
    state: Arc<Mutex<State>>,
}

impl MockCollection {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn add_resource(&self, resource: RemoteResource) {
        self.state.lock().unwrap().resources.push(resource);
    }

    pub fn set_instances(&self, id: &str, instances: Vec<InstanceStatus>) {
        self.state
            .lock()
            .unwrap()
            .instances
            .insert(id.to_string(), instances);
    }

    /// Make every call of `operation` fail with `error`
    ///
    /// Operations: "list", "create", "update", "delete", "action", "instances".
    pub fn fail_on(&self, operation: &'static str, error: MockError) {
        self.state.lock().unwrap().failures.insert(operation, error);
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Whether any call other than `List` was made
    pub fn mutated(&self) -> bool {
        self.calls()
            .iter()
            .any(|c| !matches!(c, Call::List | Call::Instances(_)))
    }

    pub fn resources(&self) -> Vec<RemoteResource> {
        self.state.lock().unwrap().resources.clone()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), MockError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl RemoteCollection for MockCollection {
    type Error = MockError;

    fn kind(&self) -> &'static str {
        self.kind
    }

    fn list(&self) -> Result<Vec<RemoteResource>, MockError> {
        self.record("list", Call::List)?;
        Ok(self.resources())
    }

    fn create(&self, model: &ModelObject) -> Result<String, MockError> {
        self.record("create", Call::Create(model.to_wire()))?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("mock-{}", state.next_id);
        let name = model.get_str("name").unwrap_or_default().to_string();
        state.resources.push(RemoteResource::new(id.clone(), name));
        Ok(id)
    }

    fn update(&self, id: &str, model: &ModelObject) -> Result<(), MockError> {
        self.record("update", Call::Update(id.to_string(), model.to_wire()))
    }

    fn delete(&self, id: &str, cleanup: Option<&ModelObject>) -> Result<(), MockError> {
        self.record(
            "delete",
            Call::Delete(id.to_string(), cleanup.map(ModelObject::to_wire)),
        )?;
        self.state.lock().unwrap().resources.retain(|r| r.id != id);
        Ok(())
    }

    fn run_action(&self, id: &str, action: &str) -> Result<(), MockError> {
        self.record("action", Call::Action(id.to_string(), action.to_string()))
    }

    fn instances(&self, id: &str) -> Result<Vec<InstanceStatus>, MockError> {
        self.record("instances", Call::Instances(id.to_string()))?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .instances
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}
