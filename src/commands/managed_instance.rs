//! `spotctl managed-instance`

use anyhow::Result;
use declarative::{CleanupOptions, RemoteCollection, reconcile};
use serde_json::Value;
use spotkit::resources::{Collection, MANAGED_INSTANCE};

use super::{CommandResult, build_request, connect, desired_tree, overrides};
use crate::Context;
use crate::cli::ReconcileArgs;
use crate::config::{self, InvocationParams, ManagedInstanceParams};
use crate::schema::managed_instance::{DELETION_CONFIG, ROOT, schema};
use crate::ui;

pub const ID_FIELD: &str = "managed_instance_id";

pub fn run(ctx: &Context, args: ReconcileArgs) -> Result<()> {
    let document = config::load_document(&args.file)?;
    let params = config::params::<InvocationParams>(&document)?.with_overrides(overrides(&args));
    let client = connect(ctx, params.credentials.clone())?;

    let result = execute(&document, &params, &Collection::new(&client, &MANAGED_INSTANCE))?;
    ui::render(&result, ctx.output)
}

/// Reconcile the `managed_instance` subtree against `collection`
pub fn execute<C>(document: &Value, params: &InvocationParams, collection: &C) -> Result<CommandResult>
where
    C: RemoteCollection + ?Sized,
{
    let desired = desired_tree(document, ROOT, params.state)?;
    let extra: ManagedInstanceParams = config::params(document)?;

    let cleanup = extra
        .managed_instance_config
        .deletion_config
        .map(|config| CleanupOptions::new("deletion_config", DELETION_CONFIG, config));
    let request = build_request(params, &[]).with_cleanup(cleanup);

    let outcome = reconcile(&desired, &request, &schema(), collection)?;
    Ok(CommandResult::from_outcome(outcome, ID_FIELD))
}
