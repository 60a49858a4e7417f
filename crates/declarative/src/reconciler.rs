//! Reconciliation engine - resolves identity, then creates, updates or deletes
//!
//! One call walks `ResolvingIdentity -> {Creating | Updating | Deleting} ->
//! Done | Failed`. Nothing is retried; a fatal condition stops the walk and
//! surfaces a single error.

use crate::error::ReconcileError;
use crate::remote::{RemoteCollection, RemoteFailure};
use crate::types::{
    DesiredState, Operation, OperationKind, ReconcileOutcome, ReconcileRequest, Uniqueness,
};
use crate::wait::{NoProgress, ProgressCallback, WaitOutcome, wait_until_ready};
use modelkit::Schema;
use serde_json::Value;
use std::fmt;

type Result<T, E> = std::result::Result<T, ReconcileError<E>>;

/// Reconciliation phase, logged on each transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ResolvingIdentity,
    Creating,
    Updating,
    Deleting,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolvingIdentity => "resolving identity",
            Self::Creating => "creating",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn transition(kind: &str, from: Phase, to: Phase) {
    log::debug!("{kind}: {from} -> {to}");
}

/// Decide what to do with the target resource
///
/// By id, no remote call is made. By name, the collection is listed once and
/// filtered on exact name equality.
pub fn resolve_operation<C>(
    desired: &Value,
    request: &ReconcileRequest,
    collection: &C,
) -> Result<Operation, C::Error>
where
    C: RemoteCollection + ?Sized,
{
    let kind = collection.kind();

    match request.uniqueness {
        Uniqueness::Id => match (request.state, request.explicit_id.as_deref()) {
            (DesiredState::Present, None) => Ok(Operation::Create),
            (DesiredState::Present, Some(id)) => Ok(Operation::Update { id: id.to_string() }),
            (DesiredState::Absent, None) => Err(ReconcileError::MissingId { kind }),
            (DesiredState::Absent, Some(id)) => Ok(Operation::Delete { id: id.to_string() }),
        },
        Uniqueness::Name => {
            let name = desired
                .get("name")
                .and_then(Value::as_str)
                .ok_or(ReconcileError::MissingName { kind })?;

            let all = collection
                .list()
                .map_err(|e| ReconcileError::remote(kind, "listing", None, e))?;
            let matches: Vec<_> = all.into_iter().filter(|r| r.name == name).collect();
            log::debug!("{kind}: {} resource(s) named '{name}'", matches.len());

            match (matches.as_slice(), request.state) {
                ([], DesiredState::Present) => Ok(Operation::Create),
                ([], DesiredState::Absent) => Ok(Operation::Noop {
                    message: format!(
                        "{} named '{name}' not found, nothing to delete",
                        capitalize(kind)
                    ),
                }),
                ([only], DesiredState::Present) => Ok(Operation::Update {
                    id: only.id.clone(),
                }),
                ([only], DesiredState::Absent) => Ok(Operation::Delete {
                    id: only.id.clone(),
                }),
                (many, _) => Err(ReconcileError::AmbiguousName {
                    kind,
                    name: name.to_string(),
                    count: many.len(),
                }),
            }
        }
    }
}

/// Reconcile `desired` against the collection
pub fn reconcile<C>(
    desired: &Value,
    request: &ReconcileRequest,
    schema: &Schema,
    collection: &C,
) -> Result<ReconcileOutcome, C::Error>
where
    C: RemoteCollection + ?Sized,
{
    reconcile_with_progress(desired, request, schema, collection, &mut NoProgress)
}

/// Reconcile with a progress callback for the post-create wait loop
pub fn reconcile_with_progress<C, P>(
    desired: &Value,
    request: &ReconcileRequest,
    schema: &Schema,
    collection: &C,
    progress: &mut P,
) -> Result<ReconcileOutcome, C::Error>
where
    C: RemoteCollection + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let kind = collection.kind();

    let operation = resolve_operation(desired, request, collection).inspect_err(|_| {
        transition(kind, Phase::ResolvingIdentity, Phase::Failed);
    })?;

    let phase = match &operation {
        Operation::Create => Phase::Creating,
        Operation::Update { .. } => Phase::Updating,
        Operation::Delete { .. } => Phase::Deleting,
        Operation::Noop { .. } => Phase::Done,
    };
    transition(kind, Phase::ResolvingIdentity, phase);

    let result = match operation {
        Operation::Create => create(desired, request, schema, collection, progress),
        Operation::Update { id } => update(desired, request, schema, collection, &id),
        Operation::Delete { id } => delete(request, schema, collection, &id),
        Operation::Noop { message } => {
            return Ok(ReconcileOutcome::unchanged(OperationKind::None, None, message));
        }
    };

    match &result {
        Ok(_) => transition(kind, phase, Phase::Done),
        Err(_) => transition(kind, phase, Phase::Failed),
    }
    result
}

fn create<C, P>(
    desired: &Value,
    request: &ReconcileRequest,
    schema: &Schema,
    collection: &C,
    progress: &mut P,
) -> Result<ReconcileOutcome, C::Error>
where
    C: RemoteCollection + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let kind = collection.kind();
    let model = schema.mapper().map_root(desired)?;

    let id = collection
        .create(&model)
        .map_err(|e| ReconcileError::remote(kind, "creating", None, e))?;
    log::info!("created {kind} {id}");

    let mut message = format!("{} created successfully", capitalize(kind));

    if let Some(policy) = &request.wait {
        match wait_until_ready(collection, &id, policy, progress) {
            Ok(WaitOutcome::Ready { ready }) => {
                message.push_str(&format!(" and {ready} instance(s) are ready"));
            }
            Ok(WaitOutcome::TimedOut { ready, target }) => {
                log::warn!("{kind} {id}: timed out waiting for instances ({ready}/{target})");
                message.push_str(&format!(
                    " but only {ready}/{target} instance(s) were ready after {}s",
                    policy.timeout.as_secs()
                ));
            }
            Err(e) => {
                log::warn!("{kind} {id}: waiting for instances failed: {e}");
                message.push_str(&format!(" but waiting for instances failed, error: {e}"));
            }
        }
    }

    Ok(ReconcileOutcome::changed(OperationKind::Create, Some(id), message))
}

fn update<C>(
    desired: &Value,
    request: &ReconcileRequest,
    schema: &Schema,
    collection: &C,
    id: &str,
) -> Result<ReconcileOutcome, C::Error>
where
    C: RemoteCollection + ?Sized,
{
    let kind = collection.kind();

    let mut trimmed = desired.clone();
    let removed = request.exclusions.apply(&mut trimmed);
    if removed > 0 {
        log::debug!("{kind} {id}: dropped {removed} excluded field(s) before update");
    }
    let model = schema.mapper().map_root(&trimmed)?;

    collection
        .update(id, &model)
        .map_err(|e| ReconcileError::remote(kind, "updating", Some(id), e))?;
    log::info!("updated {kind} {id}");

    let mut message = format!("{} updated successfully", capitalize(kind));

    if let Some(action) = &request.action {
        match collection.run_action(id, action) {
            Ok(()) => message.push_str(&format!(" and action '{action}' started")),
            Err(e) => {
                log::warn!("{kind} {id}: action '{action}' failed: {e}");
                message.push_str(&format!(" but action '{action}' failed, error: {e}"));
            }
        }
    }

    Ok(ReconcileOutcome::changed(
        OperationKind::Update,
        Some(id.to_string()),
        message,
    ))
}

fn delete<C>(
    request: &ReconcileRequest,
    schema: &Schema,
    collection: &C,
    id: &str,
) -> Result<ReconcileOutcome, C::Error>
where
    C: RemoteCollection + ?Sized,
{
    let kind = collection.kind();

    let cleanup = request
        .cleanup
        .as_ref()
        .map(|c| schema.mapper().map_as(&c.config, &c.type_name, &c.field))
        .transpose()?;

    match collection.delete(id, cleanup.as_ref()) {
        Ok(()) => {
            log::info!("deleted {kind} {id}");
            Ok(ReconcileOutcome::changed(
                OperationKind::Delete,
                Some(id.to_string()),
                format!("{} {id} deleted successfully", capitalize(kind)),
            ))
        }
        Err(e) if e.is_not_found() => {
            log::info!("{kind} {id} is already gone: {e}");
            Ok(ReconcileOutcome::unchanged(
                OperationKind::Delete,
                Some(id.to_string()),
                format!("{} {id} doesn't exist, nothing to delete", capitalize(kind)),
            ))
        }
        Err(e) => Err(ReconcileError::remote(kind, "deleting", Some(id), e)),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
