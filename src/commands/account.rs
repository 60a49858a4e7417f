//! `spotctl account`
//!
//! Accounts are identified by name only. Deleting removes every account
//! carrying the name; each deletion is attempted even when an earlier one
//! fails.

use anyhow::{Context as AnyhowContext, Result};
use declarative::DesiredState;
use serde_json::{Value, json};
use spotkit::{Account, AccountsApi};

use super::{CommandResult, connect, required};
use crate::Context;
use crate::cli::DocumentArgs;
use crate::config::{self, AccountParams, Cloud};
use crate::ui;

pub const RESULT_FIELD: &str = "spotinst_accounts";

pub fn run(ctx: &Context, args: DocumentArgs) -> Result<()> {
    let document = config::load_document(&args.file)?;
    let mut params: AccountParams = config::params(&document)?;
    if let Some(state) = args.state {
        params.state = state.into();
    }
    let client = connect(ctx, params.credentials.clone())?;

    let result = execute(&params, &client)?;
    ui::render(&result, ctx.output)
}

pub fn execute<A: AccountsApi + ?Sized>(params: &AccountParams, api: &A) -> Result<CommandResult> {
    let name = required(params.name.as_deref(), "name")?;
    let matching: Vec<Account> = api
        .list_accounts()
        .context("failed listing accounts")?
        .into_iter()
        .filter(|a| a.name == name)
        .collect();

    match params.state {
        DesiredState::Present => create(params, name, &matching, api),
        DesiredState::Absent => delete_all(name, &matching, api),
    }
}

fn create<A: AccountsApi + ?Sized>(
    params: &AccountParams,
    name: &str,
    matching: &[Account],
    api: &A,
) -> Result<CommandResult> {
    if !matching.is_empty() && !params.allow_duplicates {
        return Ok(
            CommandResult::new(false, format!("Account '{name}' already exists"))
                .with_field(RESULT_FIELD, serde_json::to_value(matching)?),
        );
    }

    let iam_role = match params.cloud {
        Some(Cloud::Aws) => Some(required(params.aws_iam_role.as_deref(), "aws_iam_role")?),
        None => None,
    };

    let account = api
        .create_account(name)
        .with_context(|| format!("failed creating account '{name}'"))?;
    let mut message = format!("Account '{name}' created successfully");

    if let Some(iam_role) = iam_role {
        api.set_aws_credentials(
            &account.account_id,
            iam_role,
            params.aws_external_id.as_deref(),
        )
        .with_context(|| {
            format!(
                "account {} was created but setting its AWS credentials failed",
                account.account_id
            )
        })?;
        message.push_str(" and AWS credentials were set");
    }

    Ok(CommandResult::new(true, message).with_field(RESULT_FIELD, json!([account])))
}

fn delete_all<A: AccountsApi + ?Sized>(
    name: &str,
    matching: &[Account],
    api: &A,
) -> Result<CommandResult> {
    if matching.is_empty() {
        return Ok(
            CommandResult::new(false, format!("Account named '{name}' not found, nothing to delete"))
                .with_field(RESULT_FIELD, json!([])),
        );
    }

    let mut deleted = 0;
    let mut snapshot = Vec::with_capacity(matching.len());
    for account in matching {
        let mut entry = serde_json::to_value(account)?;
        match api.delete_account(&account.account_id) {
            Ok(()) => {
                deleted += 1;
                entry["deleted"] = Value::Bool(true);
            }
            Err(e) => {
                log::warn!("failed deleting account {}: {e}", account.account_id);
                entry["deleted"] = Value::Bool(false);
                entry["error"] = Value::String(e.to_string());
            }
        }
        snapshot.push(entry);
    }

    let failed = matching.len() - deleted;
    let message = if failed == 0 {
        format!("{deleted} account(s) named '{name}' deleted successfully")
    } else {
        format!("{deleted} account(s) named '{name}' deleted, {failed} failed")
    };

    Ok(CommandResult::new(deleted > 0, message).with_field(RESULT_FIELD, Value::Array(snapshot)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotkit::mock::{MockSpot, SetupCall};

    fn params(state: DesiredState, name: &str) -> AccountParams {
        AccountParams {
            state,
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_when_missing() {
        let spot = MockSpot::new();
        let result = execute(&params(DesiredState::Present, "prod"), &spot).unwrap();

        assert!(result.changed);
        assert_eq!(spot.calls(), vec![SetupCall::CreateAccount("prod".into())]);
        assert_eq!(result.get(RESULT_FIELD).unwrap()[0]["account_id"], "act-mock1");
    }

    #[test]
    fn test_existing_account_is_noop() {
        let spot = MockSpot::new();
        spot.add_account("act-1", "prod");

        let result = execute(&params(DesiredState::Present, "prod"), &spot).unwrap();
        assert!(!result.changed);
        assert!(result.message.contains("already exists"));
        assert!(spot.calls().is_empty());
        assert_eq!(result.get(RESULT_FIELD).unwrap()[0]["account_id"], "act-1");
    }

    #[test]
    fn test_allow_duplicates_creates_anyway() {
        let spot = MockSpot::new();
        spot.add_account("act-1", "prod");
        let params = AccountParams {
            allow_duplicates: true,
            ..params(DesiredState::Present, "prod")
        };

        let result = execute(&params, &spot).unwrap();
        assert!(result.changed);
        assert_eq!(spot.accounts().len(), 2);
    }

    #[test]
    fn test_aws_credentials_set_on_new_account() {
        let spot = MockSpot::new();
        let params = AccountParams {
            cloud: Some(Cloud::Aws),
            aws_iam_role: Some("arn:aws:iam::1:role/spot".into()),
            aws_external_id: Some("ext".into()),
            ..params(DesiredState::Present, "prod")
        };

        let result = execute(&params, &spot).unwrap();
        assert!(result.message.contains("AWS credentials"));
        assert_eq!(
            spot.calls()[1],
            SetupCall::SetAwsCredentials {
                account_id: "act-mock1".into(),
                iam_role: "arn:aws:iam::1:role/spot".into(),
                external_id: Some("ext".into()),
            }
        );
    }

    #[test]
    fn test_aws_without_role_fails_before_create() {
        let spot = MockSpot::new();
        let params = AccountParams {
            cloud: Some(Cloud::Aws),
            ..params(DesiredState::Present, "prod")
        };

        let err = execute(&params, &spot).unwrap_err();
        assert!(err.to_string().contains("aws_iam_role"));
        assert!(spot.calls().is_empty());
    }

    #[test]
    fn test_delete_every_match_best_effort() {
        let spot = MockSpot::new();
        spot.add_account("act-1", "old");
        spot.add_account("act-2", "old");
        spot.add_account("act-3", "keep");

        let result = execute(&params(DesiredState::Absent, "old"), &spot).unwrap();
        assert!(result.changed);
        assert_eq!(
            spot.calls(),
            vec![
                SetupCall::DeleteAccount("act-1".into()),
                SetupCall::DeleteAccount("act-2".into()),
            ]
        );
        assert_eq!(spot.accounts().len(), 1);
    }

    #[test]
    fn test_delete_failures_are_collected() {
        let spot = MockSpot::new();
        spot.add_account("act-1", "old");
        spot.add_account("act-2", "old");
        spot.fail_on("delete_account", "FORBIDDEN");

        let result = execute(&params(DesiredState::Absent, "old"), &spot).unwrap();
        assert!(!result.changed);
        assert!(result.message.contains("2 failed"));
        let snapshot = result.get(RESULT_FIELD).unwrap();
        assert_eq!(snapshot[1]["deleted"], false);
        assert!(snapshot[1]["error"].as_str().unwrap().contains("FORBIDDEN"));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let spot = MockSpot::new();
        let result = execute(&params(DesiredState::Absent, "ghost"), &spot).unwrap();
        assert!(!result.changed);
        assert!(result.message.contains("not found"));
    }

    #[test]
    fn test_name_is_required() {
        let spot = MockSpot::new();
        let params = AccountParams::default();
        assert!(execute(&params, &spot).is_err());
        assert_eq!(spot.list_calls(), 0);
    }
}
