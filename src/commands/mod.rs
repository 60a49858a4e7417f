//! Command implementations
//!
//! Each command exposes an `execute` function that works against the
//! collaborator traits (so tests can drive it with in-memory doubles) and a
//! `run` function that wires it to the real API client.

// Reconciled resources
pub mod elastigroup;
pub mod managed_instance;
pub mod mr_scaler;

// Organization setup
pub mod account;
pub mod facts;
pub mod user;

use anyhow::{Context as AnyhowContext, Result, bail};
use declarative::{DesiredState, ExclusionList, ReconcileOutcome, ReconcileRequest};
use serde::Serialize;
use serde_json::{Map, Value};
use spotkit::auth::{self, OAuthExchange, ProcessEnv};
use spotkit::{CredentialParams, SpotClient};

use crate::Context;
use crate::cli::ReconcileArgs;
use crate::config::{InvocationParams, Overrides};

/// Result record printed after every command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub changed: bool,
    pub message: String,
    /// Command-specific fields (resource id, snapshots)
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CommandResult {
    pub fn new(changed: bool, message: impl Into<String>) -> Self {
        Self {
            changed,
            message: message.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Result of a reconciliation, with the resource id under `id_field`
    pub fn from_outcome(outcome: ReconcileOutcome, id_field: &str) -> Self {
        Self::new(outcome.changed, outcome.message).with_field(id_field, outcome.id)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Resolve credentials and build an API client
///
/// Flags win over document keys; the environment and credentials file are
/// consulted by [`auth::resolve`].
pub fn connect(ctx: &Context, document: CredentialParams) -> Result<SpotClient> {
    let params = ctx.credentials.clone().or(document);
    let credentials = auth::resolve(&params, &ProcessEnv, &OAuthExchange::new())?;
    Ok(match &ctx.api_base {
        Some(base) => SpotClient::with_api_base(credentials, base.as_str()),
        None => SpotClient::new(credentials),
    })
}

/// Command-line overrides of the shared reconcile parameters
pub fn overrides(args: &ReconcileArgs) -> Overrides {
    Overrides {
        state: args.state.map(Into::into),
        uniqueness_by: args.uniqueness_by.map(Into::into),
        id: args.id.clone(),
        do_not_update: args.do_not_update.clone(),
        action: args.action.clone(),
    }
}

/// Build a reconcile request from the shared parameters
///
/// `default_exclusions` are fields the resource never accepts on update;
/// the caller's `do_not_update` paths are added to them.
pub fn build_request(params: &InvocationParams, default_exclusions: &[&str]) -> ReconcileRequest {
    let mut exclusions = ExclusionList::new(default_exclusions.iter().copied());
    exclusions.extend(params.do_not_update.iter().cloned());

    ReconcileRequest::new(params.state, params.uniqueness_by)
        .with_id(params.id.clone())
        .with_exclusions(exclusions)
        .with_action(params.action.clone())
}

/// The resource subtree under `root`
///
/// A delete needs no configuration, so a missing subtree is read as an
/// empty map when the desired state is absent.
pub fn desired_tree(document: &Value, root: &str, state: DesiredState) -> Result<Value> {
    match document.get(root) {
        Some(tree) if tree.is_object() => Ok(tree.clone()),
        Some(_) => bail!("'{root}' must be a map"),
        None if state == DesiredState::Absent => Ok(Value::Object(Map::new())),
        None => bail!("document has no '{root}' configuration"),
    }
}

/// Require a non-empty string parameter
pub fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("parameter '{name}' is required"))
}
