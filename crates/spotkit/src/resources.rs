//! Reconcilable Spot resource collections.
//!
//! Each resource kind is described by an [`Endpoint`]: where it lives, which
//! envelope key wraps its body and where its name sits in a listed item.
//! [`Collection`] binds an endpoint to a client and implements
//! [`RemoteCollection`].

use crate::client::{SpotClient, first_str};
use crate::error::{Error, Result};
use declarative::{InstanceStatus, RemoteCollection, RemoteResource};
use modelkit::ModelObject;
use serde_json::{Map, Value};

/// API location and shape of one resource kind.
#[derive(Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// Human-readable kind used in messages
    pub kind: &'static str,
    /// Collection path relative to the API base
    pub path: &'static str,
    /// Key wrapping the resource body on create/update
    pub envelope: &'static str,
    /// JSON pointer to the name inside a listed item
    pub name_pointer: &'static str,
    /// Lifecycle actions, sent as `PUT {path}/{id}/{action}`
    pub actions: &'static [&'static str],
    /// Sub-path listing backing instances, if the kind has one
    pub instances: Option<&'static str>,
}

pub static MANAGED_INSTANCE: Endpoint = Endpoint {
    kind: "managed instance",
    path: "aws/ec2/managedInstance",
    envelope: "managedInstance",
    name_pointer: "/config/name",
    actions: &["pause", "resume", "recycle"],
    instances: Some("status"),
};

pub static ELASTIGROUP: Endpoint = Endpoint {
    kind: "elastigroup",
    path: "aws/ec2/group",
    envelope: "group",
    name_pointer: "/name",
    actions: &[],
    instances: Some("status"),
};

pub static MR_SCALER: Endpoint = Endpoint {
    kind: "mr scaler",
    path: "aws/emr/mrScaler",
    envelope: "mrScaler",
    name_pointer: "/name",
    actions: &[],
    instances: None,
};

impl Endpoint {
    fn item_path(&self, id: &str) -> String {
        format!("{}/{id}", self.path)
    }

    fn wrap(&self, model: &ModelObject) -> Value {
        let mut body = Map::new();
        body.insert(self.envelope.to_string(), model.to_wire());
        Value::Object(body)
    }

    fn resource(&self, item: &Value) -> Option<RemoteResource> {
        let id = item.get("id").and_then(Value::as_str)?;
        let name = item
            .pointer(self.name_pointer)
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(RemoteResource::new(id, name))
    }
}

/// A Spot resource collection.
#[derive(Debug)]
pub struct Collection<'a> {
    client: &'a SpotClient,
    endpoint: &'static Endpoint,
}

impl<'a> Collection<'a> {
    pub fn new(client: &'a SpotClient, endpoint: &'static Endpoint) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &'static Endpoint {
        self.endpoint
    }
}

impl RemoteCollection for Collection<'_> {
    type Error = Error;

    fn kind(&self) -> &'static str {
        self.endpoint.kind
    }

    fn list(&self) -> Result<Vec<RemoteResource>> {
        let items = self.client.get(self.endpoint.path)?;
        let resources: Vec<_> = items
            .iter()
            .filter_map(|item| self.endpoint.resource(item))
            .collect();
        if resources.len() != items.len() {
            log::warn!(
                "skipped {} {} item(s) without an id",
                items.len() - resources.len(),
                self.endpoint.kind
            );
        }
        Ok(resources)
    }

    fn create(&self, model: &ModelObject) -> Result<String> {
        let items = self
            .client
            .post(self.endpoint.path, &self.endpoint.wrap(model))?;
        first_str(&items, "/id")
    }

    fn update(&self, id: &str, model: &ModelObject) -> Result<()> {
        self.client
            .put(&self.endpoint.item_path(id), &self.endpoint.wrap(model))?;
        Ok(())
    }

    fn delete(&self, id: &str, cleanup: Option<&ModelObject>) -> Result<()> {
        let body = cleanup.map(ModelObject::to_wire);
        self.client
            .delete(&self.endpoint.item_path(id), body.as_ref())?;
        Ok(())
    }

    fn run_action(&self, id: &str, action: &str) -> Result<()> {
        if !self.endpoint.actions.contains(&action) {
            return Err(Error::Unsupported {
                kind: self.endpoint.kind,
                operation: format!("action '{action}'"),
            });
        }
        let path = format!("{}/{action}", self.endpoint.item_path(id));
        self.client.put(&path, &Value::Object(Map::new()))?;
        Ok(())
    }

    fn instances(&self, id: &str) -> Result<Vec<InstanceStatus>> {
        let Some(suffix) = self.endpoint.instances else {
            return Err(Error::Unsupported {
                kind: self.endpoint.kind,
                operation: "instance status".to_string(),
            });
        };
        let items = self
            .client
            .get(&format!("{}/{suffix}", self.endpoint.item_path(id)))?;
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Error::from))
            .collect()
    }
}
