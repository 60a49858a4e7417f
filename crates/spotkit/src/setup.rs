//! Organization setup: accounts and users.
//!
//! These endpoints are not reconciled through a [`declarative::RemoteCollection`];
//! accounts are matched by name and users by email, so the commands drive
//! them directly through [`AccountsApi`] and [`UsersApi`].

use crate::client::{Method, SpotClient, first_str};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// A Spot account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(alias = "accountId")]
    pub account_id: String,
    pub name: String,
    #[serde(default, alias = "organizationId", skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

/// Role a user holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

/// One account a user is mapped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    #[serde(alias = "accountId")]
    pub account_id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
}

/// A user-to-account role assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMapping {
    pub account_id: String,
    pub role: Role,
}

/// Fields for a new user.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Account administration.
pub trait AccountsApi {
    fn list_accounts(&self) -> Result<Vec<Account>>;
    fn create_account(&self, name: &str) -> Result<Account>;
    fn delete_account(&self, account_id: &str) -> Result<()>;
    /// Attach an AWS IAM role to the account.
    fn set_aws_credentials(&self, account_id: &str, iam_role: &str, external_id: Option<&str>)
    -> Result<()>;
}

/// User administration.
///
/// A user that does not exist surfaces as an API error with code
/// `USER_DOES_NOT_EXIST`.
pub trait UsersApi {
    /// Roles the user holds across accounts.
    fn get_user(&self, email: &str) -> Result<Vec<UserRole>>;
    fn create_user(&self, user: &NewUser) -> Result<()>;
    fn assign_roles(&self, email: &str, mappings: &[RoleMapping]) -> Result<()>;
    fn update_role(&self, account_id: &str, email: &str, role: Role) -> Result<()>;
    fn delete_user(&self, email: &str) -> Result<()>;
}

const ACCOUNTS: &str = "setup/account";
const AWS_CREDENTIALS: &str = "setup/credentials/aws";
const USERS: &str = "setup/user";
const USER_MAPPING: &str = "setup/accountUserMapping";

fn decode<T: for<'de> Deserialize<'de>>(items: Vec<Value>) -> Result<Vec<T>> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(Into::into))
        .collect()
}

impl AccountsApi for SpotClient {
    fn list_accounts(&self) -> Result<Vec<Account>> {
        decode(self.get(ACCOUNTS)?)
    }

    fn create_account(&self, name: &str) -> Result<Account> {
        let items = self.post(ACCOUNTS, &json!({ "account": { "name": name } }))?;
        let account_id = first_str(&items, "/id")
            .or_else(|_| first_str(&items, "/accountId"))?;
        log::info!("created account {account_id} ({name})");
        Ok(Account {
            account_id,
            name: name.to_string(),
            organization_id: items
                .first()
                .and_then(|i| i.get("organizationId"))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    fn delete_account(&self, account_id: &str) -> Result<()> {
        self.delete(&format!("{ACCOUNTS}/{account_id}"), None)?;
        log::info!("deleted account {account_id}");
        Ok(())
    }

    fn set_aws_credentials(
        &self,
        account_id: &str,
        iam_role: &str,
        external_id: Option<&str>,
    ) -> Result<()> {
        let mut credentials = json!({ "iamRole": iam_role });
        if let Some(external_id) = external_id {
            credentials["externalId"] = json!(external_id);
        }
        self.send(
            Method::Post,
            AWS_CREDENTIALS,
            Some(account_id),
            Some(&json!({ "credentials": credentials })),
        )?;
        Ok(())
    }
}

impl UsersApi for SpotClient {
    fn get_user(&self, email: &str) -> Result<Vec<UserRole>> {
        decode(self.get(&format!("{USERS}/{email}"))?)
    }

    fn create_user(&self, user: &NewUser) -> Result<()> {
        let mut body = json!({
            "firstName": user.first_name,
            "lastName": user.last_name,
            "email": user.email,
            "role": user.role.to_string(),
        });
        if let Some(password) = &user.password {
            body["password"] = json!(password);
        }
        self.post(USERS, &body)?;
        log::info!("created user {}", user.email);
        Ok(())
    }

    fn assign_roles(&self, email: &str, mappings: &[RoleMapping]) -> Result<()> {
        let mappings: Vec<_> = mappings
            .iter()
            .map(|m| {
                json!({
                    "userEmail": email,
                    "accountId": m.account_id,
                    "role": m.role.to_string(),
                })
            })
            .collect();
        self.post(USER_MAPPING, &json!({ "mappings": mappings }))?;
        Ok(())
    }

    fn update_role(&self, account_id: &str, email: &str, role: Role) -> Result<()> {
        self.send(
            Method::Put,
            USER_MAPPING,
            Some(account_id),
            Some(&json!({ "userEmail": email, "role": role.to_string() })),
        )?;
        Ok(())
    }

    fn delete_user(&self, email: &str) -> Result<()> {
        self.delete(&format!("{USERS}/{email}"), None)?;
        log::info!("deleted user {email}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_from_wire() {
        let account: Account = serde_json::from_value(json!({
            "accountId": "act-1",
            "name": "prod",
            "organizationId": "606079"
        }))
        .unwrap();
        assert_eq!(account.account_id, "act-1");
        assert_eq!(account.organization_id.as_deref(), Some("606079"));
    }

    #[test]
    fn test_user_role_from_wire() {
        let roles: Vec<UserRole> = decode(vec![json!({ "accountId": "act-1", "role": "viewer" })]).unwrap();
        assert_eq!(roles[0].account_id, "act-1");
        assert_eq!(roles[0].account_name, None);
    }

    #[test]
    fn test_role_defaults_to_viewer() {
        let user: NewUser = serde_json::from_value(json!({ "email": "a@b.c" })).unwrap();
        assert_eq!(user.role, Role::Viewer);
        let user: NewUser =
            serde_json::from_value(json!({ "email": "a@b.c", "role": "admin" })).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(serde_json::from_value::<NewUser>(json!({ "email": "x", "role": "owner" })).is_err());
    }

    #[test]
    fn test_new_user_debug_hides_password() {
        let user: NewUser =
            serde_json::from_value(json!({ "email": "a@b.c", "password": "hunter2" })).unwrap();
        assert!(!format!("{user:?}").contains("hunter2"));
    }
}
