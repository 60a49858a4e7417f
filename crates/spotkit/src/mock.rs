//! In-memory account and user administration for tests.
//!
//! ```
//! use spotkit::mock::MockSpot;
//! use spotkit::AccountsApi;
//!
//! let spot = MockSpot::new();
//! spot.create_account("prod").unwrap();
//! assert_eq!(spot.list_accounts().unwrap().len(), 1);
//! ```

use crate::error::{Error, ErrorCode, Result};
use crate::setup::{Account, AccountsApi, NewUser, Role, RoleMapping, UserRole, UsersApi};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// A recorded mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupCall {
    CreateAccount(String),
    DeleteAccount(String),
    SetAwsCredentials {
        account_id: String,
        iam_role: String,
        external_id: Option<String>,
    },
    CreateUser(String, Role),
    AssignRoles(String, Vec<RoleMapping>),
    UpdateRole {
        account_id: String,
        email: String,
        role: Role,
    },
    DeleteUser(String),
}

#[derive(Debug, Default)]
struct State {
    accounts: Vec<Account>,
    users: BTreeMap<String, Vec<UserRole>>,
    failures: HashMap<&'static str, String>,
    calls: Vec<SetupCall>,
    list_calls: usize,
    next_id: usize,
}

/// In-memory [`AccountsApi`] and [`UsersApi`].
#[derive(Debug, Clone, Default)]
pub struct MockSpot {
    state: Arc<Mutex<State>>,
}

impl MockSpot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, account_id: &str, name: &str) {
        self.state.lock().unwrap().accounts.push(Account {
            account_id: account_id.to_string(),
            name: name.to_string(),
            organization_id: None,
        });
    }

    pub fn add_user(&self, email: &str, roles: &[(&str, &str)]) {
        let roles = roles
            .iter()
            .map(|(account_id, role)| UserRole {
                account_id: (*account_id).to_string(),
                role: (*role).to_string(),
                account_name: None,
            })
            .collect();
        self.state
            .lock()
            .unwrap()
            .users
            .insert(email.to_string(), roles);
    }

    /// Make `operation` fail with an API error carrying `code`
    ///
    /// Operations: "list_accounts", "create_account", "delete_account",
    /// "set_aws_credentials", "get_user", "create_user", "assign_roles",
    /// "update_role", "delete_user".
    pub fn fail_on(&self, operation: &'static str, code: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation, code.to_string());
    }

    /// Mutating calls made so far, in order
    pub fn calls(&self) -> Vec<SetupCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// How many times accounts were listed
    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.state.lock().unwrap().accounts.clone()
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        match self.state.lock().unwrap().failures.get(operation) {
            Some(code) => Err(api_error(code)),
            None => Ok(()),
        }
    }

    fn record(&self, call: SetupCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn api_error(code: &str) -> Error {
    Error::Api {
        status: 400,
        code: Some(code.to_string()),
        message: format!("mock failure: {code}"),
        payload: Value::Null,
    }
}

impl AccountsApi for MockSpot {
    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.state.lock().unwrap().list_calls += 1;
        self.check("list_accounts")?;
        Ok(self.accounts())
    }

    fn create_account(&self, name: &str) -> Result<Account> {
        self.check("create_account")?;
        self.record(SetupCall::CreateAccount(name.to_string()));
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let account = Account {
            account_id: format!("act-mock{}", state.next_id),
            name: name.to_string(),
            organization_id: None,
        };
        state.accounts.push(account.clone());
        Ok(account)
    }

    fn delete_account(&self, account_id: &str) -> Result<()> {
        self.check("delete_account")?;
        self.record(SetupCall::DeleteAccount(account_id.to_string()));
        let mut state = self.state.lock().unwrap();
        let before = state.accounts.len();
        state.accounts.retain(|a| a.account_id != account_id);
        if state.accounts.len() == before {
            return Err(api_error(ErrorCode::AccountDoesNotExist.as_str()));
        }
        Ok(())
    }

    fn set_aws_credentials(
        &self,
        account_id: &str,
        iam_role: &str,
        external_id: Option<&str>,
    ) -> Result<()> {
        self.check("set_aws_credentials")?;
        self.record(SetupCall::SetAwsCredentials {
            account_id: account_id.to_string(),
            iam_role: iam_role.to_string(),
            external_id: external_id.map(str::to_string),
        });
        Ok(())
    }
}

impl UsersApi for MockSpot {
    fn get_user(&self, email: &str) -> Result<Vec<UserRole>> {
        self.check("get_user")?;
        self.state
            .lock()
            .unwrap()
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| api_error(ErrorCode::UserDoesNotExist.as_str()))
    }

    fn create_user(&self, user: &NewUser) -> Result<()> {
        self.check("create_user")?;
        self.record(SetupCall::CreateUser(user.email.clone(), user.role));
        self.state
            .lock()
            .unwrap()
            .users
            .insert(user.email.clone(), Vec::new());
        Ok(())
    }

    fn assign_roles(&self, email: &str, mappings: &[RoleMapping]) -> Result<()> {
        self.check("assign_roles")?;
        self.record(SetupCall::AssignRoles(email.to_string(), mappings.to_vec()));
        let mut state = self.state.lock().unwrap();
        let roles = state.users.entry(email.to_string()).or_default();
        for mapping in mappings {
            roles.retain(|r| r.account_id != mapping.account_id);
            roles.push(UserRole {
                account_id: mapping.account_id.clone(),
                role: mapping.role.to_string(),
                account_name: None,
            });
        }
        Ok(())
    }

    fn update_role(&self, account_id: &str, email: &str, role: Role) -> Result<()> {
        self.check("update_role")?;
        self.record(SetupCall::UpdateRole {
            account_id: account_id.to_string(),
            email: email.to_string(),
            role,
        });
        let mut state = self.state.lock().unwrap();
        if let Some(roles) = state.users.get_mut(email) {
            for r in roles.iter_mut().filter(|r| r.account_id == account_id) {
                r.role = role.to_string();
            }
        }
        Ok(())
    }

    fn delete_user(&self, email: &str) -> Result<()> {
        self.check("delete_user")?;
        self.record(SetupCall::DeleteUser(email.to_string()));
        match self.state.lock().unwrap().users.remove(email) {
            Some(_) => Ok(()),
            None => Err(api_error(ErrorCode::UserDoesNotExist.as_str())),
        }
    }
}
