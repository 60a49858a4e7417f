//! Credential resolution.
//!
//! Token sources, first non-empty wins:
//!
//! 1. explicit token (flag or document)
//! 2. `SPOTINST_TOKEN`
//! 3. OAuth password exchange, when username, password, client id and client
//!    secret are all known
//! 4. `token` in the credentials file (`key = value` lines)
//!
//! The account id follows the same pattern: explicit, `SPOTINST_ACCOUNT_ID`,
//! `ACCOUNT`, then `account` in the credentials file.

use crate::client::{first_str, parse_envelope};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// OAuth token endpoint.
pub const OAUTH_TOKEN_URL: &str = "https://oauth.spotinst.io/token";

/// Resolved API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub account_id: Option<String>,
}

impl Credentials {
    pub fn new(token: impl Into<String>, account_id: Option<String>) -> Self {
        Self {
            token: token.into(),
            account_id,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Credential inputs gathered from flags and the invocation document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialParams {
    pub token: Option<String>,
    pub account_id: Option<String>,
    pub credentials_path: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl CredentialParams {
    /// Fill every unset field from `other`.
    pub fn or(self, other: Self) -> Self {
        Self {
            token: self.token.or(other.token),
            account_id: self.account_id.or(other.account_id),
            credentials_path: self.credentials_path.or(other.credentials_path),
            username: self.username.or(other.username),
            password: self.password.or(other.password),
            client_id: self.client_id.or(other.client_id),
            client_secret: self.client_secret.or(other.client_secret),
        }
    }
}

/// Environment variable lookup.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// OAuth password grant inputs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordGrant {
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for PasswordGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordGrant")
            .field("username", &self.username)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Exchanges a password grant for an access token.
pub trait TokenExchange {
    fn exchange(&self, grant: &PasswordGrant) -> Result<String>;
}

/// Token exchange against the Spot OAuth endpoint.
pub struct OAuthExchange {
    agent: ureq::Agent,
    url: String,
}

impl OAuthExchange {
    #[must_use]
    pub fn new() -> Self {
        Self::with_url(OAUTH_TOKEN_URL)
    }

    /// Exchange against a custom endpoint (for testing).
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            url: url.into(),
        }
    }
}

impl Default for OAuthExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenExchange for OAuthExchange {
    fn exchange(&self, grant: &PasswordGrant) -> Result<String> {
        log::debug!("POST {} (password grant for {})", self.url, grant.username);

        let mut response = self.agent.post(&self.url).send_form([
            ("username", grant.username.as_str()),
            ("password", grant.password.as_str()),
            ("grant_type", "password"),
            ("client_id", grant.client_id.as_str()),
            ("client_secret", grant.client_secret.as_str()),
        ])?;
        let status = response.status().as_u16();
        let payload: serde_json::Value = response.body_mut().read_json()?;

        let items = parse_envelope(status, payload)?;
        first_str(&items, "/accessToken")
    }
}

/// Parsed `key = value` credentials file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsFile {
    values: HashMap<String, String>,
}

impl CredentialsFile {
    /// Load a credentials file; a missing file yields an empty set.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no credentials file at {}", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// Parse `key = value` lines. Lines without `=` and `#` comments are skipped.
    pub fn parse(content: &str) -> Self {
        let values = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Expand `~` in a credentials path, or return the default location.
pub fn credentials_path(path: Option<&str>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).into_owned())),
        None => dirs::home_dir()
            .map(|home| home.join(".spotinst").join("credentials"))
            .ok_or_else(|| Error::Credentials("cannot determine home directory".into())),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Credentials file, read the first time a lookup reaches it.
struct LazyFile<'a> {
    path: Option<&'a str>,
    loaded: Option<(PathBuf, CredentialsFile)>,
}

impl<'a> LazyFile<'a> {
    fn new(path: Option<&'a str>) -> Self {
        Self { path, loaded: None }
    }

    fn get(&mut self, key: &str) -> Result<Option<String>> {
        if self.loaded.is_none() {
            let path = credentials_path(self.path)?;
            let file = CredentialsFile::load(&path)?;
            self.loaded = Some((path, file));
        }
        let value = self
            .loaded
            .as_ref()
            .and_then(|(_, file)| file.get(key))
            .map(str::to_string);
        Ok(non_empty(value))
    }

    fn describe(&self) -> String {
        match (&self.loaded, self.path) {
            (Some((path, _)), _) => path.display().to_string(),
            (None, Some(path)) => path.to_string(),
            (None, None) => "the credentials file".to_string(),
        }
    }
}

/// Resolve credentials from params, environment, OAuth and the credentials file.
///
/// The credentials file is only read when neither the token nor the account
/// id is found earlier in its chain.
pub fn resolve(
    params: &CredentialParams,
    env: &dyn Environment,
    exchange: &dyn TokenExchange,
) -> Result<Credentials> {
    let mut file = LazyFile::new(params.credentials_path.as_deref());

    let token = if let Some(token) = non_empty(params.token.clone()) {
        log::debug!("using explicit token");
        Some(token)
    } else if let Some(token) = non_empty(env.var("SPOTINST_TOKEN")) {
        log::debug!("using token from SPOTINST_TOKEN");
        Some(token)
    } else if let Some(grant) = password_grant(params, env) {
        log::debug!("exchanging password grant for a token");
        Some(exchange.exchange(&grant)?)
    } else {
        let token = file.get("token")?;
        if token.is_some() {
            log::debug!("using token from {}", file.describe());
        }
        token
    };

    let token = token.ok_or_else(|| {
        Error::Credentials(format!(
            "no token found (flag, SPOTINST_TOKEN, OAuth or {})",
            file.describe()
        ))
    })?;

    let account_id = match non_empty(params.account_id.clone())
        .or_else(|| non_empty(env.var("SPOTINST_ACCOUNT_ID")))
        .or_else(|| non_empty(env.var("ACCOUNT")))
    {
        Some(account_id) => Some(account_id),
        None => file.get("account")?,
    };

    Ok(Credentials { token, account_id })
}

fn password_grant(params: &CredentialParams, env: &dyn Environment) -> Option<PasswordGrant> {
    let pick = |explicit: &Option<String>, key: &str| {
        non_empty(explicit.clone()).or_else(|| non_empty(env.var(key)))
    };
    Some(PasswordGrant {
        username: pick(&params.username, "SPOTINST_USERNAME")?,
        password: pick(&params.password, "SPOTINST_PASSWORD")?,
        client_id: pick(&params.client_id, "SPOTINST_CLIENT_ID")?,
        client_secret: pick(&params.client_secret, "SPOTINST_CLIENT_SECRET")?,
    })
}
