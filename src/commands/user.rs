//! `spotctl user`

use anyhow::{Context as AnyhowContext, Result};
use declarative::DesiredState;
use serde_json::json;
use spotkit::{ErrorCode, NewUser, UserRole, UsersApi};

use super::{CommandResult, connect, required};
use crate::Context;
use crate::cli::DocumentArgs;
use crate::config::{self, UserParams};
use crate::ui;

pub const RESULT_FIELD: &str = "spotinst_user";

pub fn run(ctx: &Context, args: DocumentArgs) -> Result<()> {
    let document = config::load_document(&args.file)?;
    let mut params: UserParams = config::params(&document)?;
    if let Some(state) = args.state {
        params.state = state.into();
    }
    let client = connect(ctx, params.credentials.clone())?;

    let result = execute(&params, &client)?;
    ui::render(&result, ctx.output)
}

/// Roles of the user, or `None` when the user does not exist
fn find_user<U: UsersApi + ?Sized>(api: &U, email: &str) -> Result<Option<Vec<UserRole>>> {
    match api.get_user(email) {
        Ok(roles) => Ok(Some(roles)),
        Err(e) if e.code() == Some(ErrorCode::UserDoesNotExist) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed looking up user {email}")),
    }
}

pub fn execute<U: UsersApi + ?Sized>(params: &UserParams, api: &U) -> Result<CommandResult> {
    let email = required(params.email.as_deref(), "email")?;

    match params.state {
        DesiredState::Present => apply(params, email, api),
        DesiredState::Absent => match api.delete_user(email) {
            Ok(()) => Ok(CommandResult::new(true, "User deleted successfully")
                .with_field(RESULT_FIELD, json!({ "email": email }))),
            Err(e) if e.code() == Some(ErrorCode::UserDoesNotExist) => Ok(CommandResult::new(
                false,
                format!("User {email} doesn't exist, nothing to delete"),
            )
            .with_field(RESULT_FIELD, json!({ "email": email }))),
            Err(e) => Err(e).with_context(|| format!("failed deleting user {email}")),
        },
    }
}

fn apply<U: UsersApi + ?Sized>(params: &UserParams, email: &str, api: &U) -> Result<CommandResult> {
    let (changed, message) = match find_user(api, email)? {
        None => {
            let user = NewUser {
                email: email.to_string(),
                first_name: params.first_name.clone().unwrap_or_default(),
                last_name: params.last_name.clone().unwrap_or_default(),
                password: params.password.clone(),
                role: params.role,
            };
            api.create_user(&user)
                .with_context(|| format!("failed creating user {email}"))?;
            if !params.role_mapping.is_empty() {
                api.assign_roles(email, &params.role_mapping)
                    .with_context(|| format!("user {email} was created but mapping roles failed"))?;
            }
            (true, "User created successfully".to_string())
        }
        Some(_) if params.role_mapping.is_empty() => {
            (false, format!("User {email} already exists, no role mapping to update"))
        }
        Some(_) => {
            for mapping in &params.role_mapping {
                api.update_role(&mapping.account_id, email, mapping.role)
                    .with_context(|| {
                        format!("failed updating role of {email} on {}", mapping.account_id)
                    })?;
            }
            (true, "User updated successfully".to_string())
        }
    };

    let roles = find_user(api, email)?.unwrap_or_default();
    Ok(CommandResult::new(changed, message)
        .with_field(RESULT_FIELD, json!({ "email": email, "roles": roles })))
}
