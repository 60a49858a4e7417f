//! `spotctl elastigroup`

use anyhow::Result;
use declarative::{ProgressCallback, RemoteCollection, WaitPolicy, reconcile_with_progress};
use serde_json::Value;
use spotkit::resources::{Collection, ELASTIGROUP};
use std::time::Duration;

use super::{CommandResult, build_request, connect, desired_tree, overrides};
use crate::Context;
use crate::cli::{ElastigroupArgs, OutputFormat};
use crate::config::{self, ElastigroupParams, InvocationParams};
use crate::schema::elastigroup::{ROOT, UPDATE_EXCLUSIONS, schema};
use crate::ui::{self, WaitSpinner};

pub const ID_FIELD: &str = "group_id";

pub fn run(ctx: &Context, args: ElastigroupArgs) -> Result<()> {
    let document = config::load_document(&args.reconcile.file)?;
    let params = config::params::<InvocationParams>(&document)?
        .with_overrides(overrides(&args.reconcile));

    let mut wait: ElastigroupParams = config::params(&document)?;
    if args.wait_for_instances {
        wait.wait_for_instances = true;
    }
    if let Some(timeout) = args.wait_timeout {
        wait.wait_timeout = timeout;
    }

    let client = connect(ctx, params.credentials.clone())?;
    let mut spinner = WaitSpinner::new(!ctx.quiet && ctx.output == OutputFormat::Text);

    let result = execute(
        &document,
        &params,
        &wait,
        &Collection::new(&client, &ELASTIGROUP),
        &mut spinner,
    )?;
    ui::render(&result, ctx.output)
}

/// Wait policy for a freshly created group, if one was requested
///
/// The target is the group's `capacity.target`.
pub fn wait_policy(desired: &Value, wait: &ElastigroupParams) -> Option<WaitPolicy> {
    if !wait.wait_for_instances {
        return None;
    }
    match desired.pointer("/capacity/target").and_then(Value::as_u64) {
        Some(target) => Some(
            WaitPolicy::new(target as usize).with_timeout(Duration::from_secs(wait.wait_timeout)),
        ),
        None => {
            log::warn!("wait_for_instances is set but group.capacity.target is missing, not waiting");
            None
        }
    }
}

/// Reconcile the `group` subtree against `collection`
pub fn execute<C, P>(
    document: &Value,
    params: &InvocationParams,
    wait: &ElastigroupParams,
    collection: &C,
    progress: &mut P,
) -> Result<CommandResult>
where
    C: RemoteCollection + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let desired = desired_tree(document, ROOT, params.state)?;
    let request = build_request(params, UPDATE_EXCLUSIONS).with_wait(wait_policy(&desired, wait));

    let outcome = reconcile_with_progress(&desired, &request, &schema(), collection, progress)?;
    Ok(CommandResult::from_outcome(outcome, ID_FIELD))
}
