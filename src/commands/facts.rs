//! `spotctl facts`

use anyhow::{Context as AnyhowContext, Result};
use serde_json::{Value, json};
use spotkit::{Account, AccountsApi, UsersApi};

use super::{CommandResult, connect};
use crate::Context;
use crate::cli::DocumentArgs;
use crate::config::{self, FactsParams, FactsType};
use crate::ui;

pub const RESULT_FIELD: &str = "spotinst_facts";

pub fn run(ctx: &Context, args: DocumentArgs) -> Result<()> {
    let document = config::load_document(&args.file)?;
    let params: FactsParams = config::params(&document)?;
    let client = connect(ctx, params.credentials.clone())?;

    let result = execute(&params, &client)?;
    ui::render(&result, ctx.output)
}

/// Account names by id, listed at most once per invocation
pub struct AccountDirectory<'a, A: ?Sized> {
    api: &'a A,
    accounts: Option<Vec<Account>>,
}

impl<'a, A: AccountsApi + ?Sized> AccountDirectory<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            accounts: None,
        }
    }

    pub fn name_of(&mut self, account_id: &str) -> Result<Option<String>> {
        if self.accounts.is_none() {
            let accounts = self
                .api
                .list_accounts()
                .context("failed listing accounts")?;
            self.accounts = Some(accounts);
        }
        Ok(self
            .accounts
            .iter()
            .flatten()
            .find(|a| a.account_id == account_id)
            .map(|a| a.name.clone()))
    }
}

pub fn execute<A>(params: &FactsParams, api: &A) -> Result<CommandResult>
where
    A: AccountsApi + UsersApi + ?Sized,
{
    let kind = params
        .kind
        .context("parameter 'type' is required (account or user)")?;

    let facts = match kind {
        FactsType::Account => {
            let accounts = api.list_accounts().context("failed listing accounts")?;
            serde_json::to_value(accounts)?
        }
        FactsType::User => {
            let emails = params
                .filter
                .email
                .clone()
                .context("missing filter for user facts, valid filters are: [email]")?
                .into_vec();
            user_facts(&emails, api)?
        }
    };

    let message = match kind {
        FactsType::Account => "Successfully listed accounts",
        FactsType::User => "Successfully listed user role mappings",
    };
    Ok(CommandResult::new(false, message).with_field(RESULT_FIELD, facts))
}

fn user_facts<A>(emails: &[String], api: &A) -> Result<Value>
where
    A: AccountsApi + UsersApi + ?Sized,
{
    let mut directory = AccountDirectory::new(api);
    let mut facts = Vec::with_capacity(emails.len());

    for email in emails {
        match api.get_user(email) {
            Ok(mut roles) => {
                for role in &mut roles {
                    role.account_name = directory.name_of(&role.account_id)?;
                }
                facts.push(json!({ "email": email, "roles": roles }));
            }
            Err(e) if e.is_not_found() => {
                facts.push(json!({ "email": email, "error": "User Not Found" }));
            }
            Err(e) => {
                log::warn!("failed looking up user {email}: {e}");
                facts.push(json!({ "email": email, "error": e.to_string() }));
            }
        }
    }

    Ok(Value::Array(facts))
}
