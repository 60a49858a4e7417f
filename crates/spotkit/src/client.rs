//! Blocking Spot API client.
//!
//! Every response is wrapped in the same envelope:
//!
//! ```json
//! { "response": { "status": { "code": 200 }, "items": [ ... ] } }
//! ```
//!
//! Failures carry an `errors` array, either at the top level or under
//! `response`. [`parse_envelope`] turns both shapes into items or an
//! [`Error::Api`].

use crate::auth::Credentials;
use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;

/// Default Spot API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.spotinst.io";

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Spot API client.
///
/// # Example
///
/// ```no_run
/// use spotkit::{Credentials, SpotClient};
///
/// let client = SpotClient::new(Credentials::new("token", Some("act-123".into())));
/// let groups = client.get("aws/ec2/group").unwrap();
/// println!("{} groups", groups.len());
/// ```
pub struct SpotClient {
    agent: ureq::Agent,
    api_base: String,
    token: String,
    account_id: Option<String>,
}

impl SpotClient {
    /// Create a client against the public API.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self::with_api_base(credentials, DEFAULT_API_BASE)
    }

    /// Create a client with a custom API base (for testing).
    #[must_use]
    pub fn with_api_base(credentials: Credentials, api_base: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: credentials.token,
            account_id: credentials.account_id,
        }
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Account every request is scoped to, if any.
    #[must_use]
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn authorize<B>(
        &self,
        request: ureq::RequestBuilder<B>,
        account: Option<&str>,
    ) -> ureq::RequestBuilder<B> {
        let request = request
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("Accept", "application/json");
        match account {
            Some(account) => request.query("accountId", account),
            None => request,
        }
    }

    /// Send a request scoped to `account` (or the client's account) and
    /// return the envelope items.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        account: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Vec<Value>> {
        let url = self.url(path);
        let account = account.or(self.account_id.as_deref());
        log::debug!("{method} {url}");

        let response = match (method, body) {
            (Method::Get, _) => self.authorize(self.agent.get(&url), account).call(),
            (Method::Delete, None) => self.authorize(self.agent.delete(&url), account).call(),
            (Method::Delete, Some(body)) => self
                .authorize(self.agent.delete(&url), account)
                .force_send_body()
                .send_json(body),
            (Method::Post, Some(body)) => {
                self.authorize(self.agent.post(&url), account).send_json(body)
            }
            (Method::Post, None) => self.authorize(self.agent.post(&url), account).send_empty(),
            (Method::Put, Some(body)) => {
                self.authorize(self.agent.put(&url), account).send_json(body)
            }
            (Method::Put, None) => self.authorize(self.agent.put(&url), account).send_empty(),
        };

        let mut response = response?;
        let status = response.status().as_u16();
        let text = response.body_mut().read_to_string()?;
        log::trace!("{method} {url} -> {status}: {text}");

        let payload = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        parse_envelope(status, payload)
    }

    pub fn get(&self, path: &str) -> Result<Vec<Value>> {
        self.send(Method::Get, path, None, None)
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<Vec<Value>> {
        self.send(Method::Post, path, None, Some(body))
    }

    pub fn put(&self, path: &str, body: &Value) -> Result<Vec<Value>> {
        self.send(Method::Put, path, None, Some(body))
    }

    pub fn delete(&self, path: &str, body: Option<&Value>) -> Result<Vec<Value>> {
        self.send(Method::Delete, path, None, body)
    }
}

impl fmt::Debug for SpotClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotClient")
            .field("api_base", &self.api_base)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

/// Decode a response envelope into its items, or an API error.
pub fn parse_envelope(status: u16, payload: Value) -> Result<Vec<Value>> {
    if (200..300).contains(&status) {
        return Ok(payload
            .pointer("/response/items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default());
    }

    let first_error = payload
        .get("errors")
        .or_else(|| payload.pointer("/response/errors"))
        .and_then(Value::as_array)
        .and_then(|errors| errors.first());

    let code = first_error
        .and_then(|e| e.get("code"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let message = first_error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            payload
                .pointer("/response/status/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("request failed with HTTP {status}"));

    Err(Error::Api {
        status,
        code,
        message,
        payload,
    })
}

/// Pull a string field out of the first item.
pub(crate) fn first_str(items: &[Value], pointer: &str) -> Result<String> {
    items
        .first()
        .and_then(|item| item.pointer(pointer))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidResponse(format!("response has no '{pointer}'")))
}
