//! Invocation documents
//!
//! Every command reads one document (JSON, or TOML by extension) whose
//! top-level keys are the command's parameters plus the resource subtree.
//! The raw tree is kept as a [`Value`] for the mapper; the scalar parameters
//! are deserialized into the typed structs below.

use anyhow::{Context, Result, bail};
use declarative::{DesiredState, Uniqueness};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use spotkit::CredentialParams;
use spotkit::setup::{Role, RoleMapping};
use std::fs;
use std::path::Path;

/// Document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension; anything but `.toml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

/// Read and parse an invocation document
pub fn load_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    parse_document(&content, ConfigFormat::from_path(path))
        .with_context(|| format!("Invalid document {}", path.display()))
}

/// Parse document text; the top level must be a map
pub fn parse_document(content: &str, format: ConfigFormat) -> Result<Value> {
    let document: Value = match format {
        ConfigFormat::Json => serde_json::from_str(content).context("Invalid JSON")?,
        ConfigFormat::Toml => {
            let table: toml::Table = toml::from_str(content).context("Invalid TOML")?;
            toml_to_json(toml::Value::Table(table))?
        }
    };
    if !document.is_object() {
        bail!("expected a map at the top level");
    }
    Ok(document)
}

/// Convert a TOML value into a JSON tree; datetimes become RFC 3339 strings
fn toml_to_json(value: toml::Value) -> Result<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .with_context(|| format!("unsupported float value {f}"))?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_json)
                .collect::<Result<_>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| toml_to_json(value).map(|value| (key, value)))
                .collect::<Result<_>>()?,
        ),
    })
}

/// Deserialize the typed parameters of a command from the document
pub fn params<T: DeserializeOwned>(document: &Value) -> Result<T> {
    T::deserialize(document).context("Invalid invocation parameters")
}

// ============================================================================
// Common parameters
// ============================================================================

/// Parameters shared by the reconciled resource commands
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvocationParams {
    pub state: DesiredState,
    pub uniqueness_by: Uniqueness,
    pub id: Option<String>,
    /// Dotted paths never sent on update
    pub do_not_update: Vec<String>,
    /// Lifecycle action run after an update
    pub action: Option<String>,
    #[serde(flatten)]
    pub credentials: CredentialParams,
}

/// Command-line values; they win over the document
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub state: Option<DesiredState>,
    pub uniqueness_by: Option<Uniqueness>,
    pub id: Option<String>,
    pub do_not_update: Vec<String>,
    pub action: Option<String>,
}

impl InvocationParams {
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(state) = overrides.state {
            self.state = state;
        }
        if let Some(uniqueness) = overrides.uniqueness_by {
            self.uniqueness_by = uniqueness;
        }
        if overrides.id.is_some() {
            self.id = overrides.id;
        }
        if overrides.action.is_some() {
            self.action = overrides.action;
        }
        for path in overrides.do_not_update {
            if !self.do_not_update.contains(&path) {
                self.do_not_update.push(path);
            }
        }
        self
    }
}

// ============================================================================
// Resource commands
// ============================================================================

/// `managed_instance_config` block
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManagedInstanceParams {
    pub managed_instance_config: ManagedInstanceConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManagedInstanceConfig {
    /// Cleanup options sent with a delete
    pub deletion_config: Option<Value>,
}

pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElastigroupParams {
    pub wait_for_instances: bool,
    /// Seconds
    pub wait_timeout: u64,
}

impl Default for ElastigroupParams {
    fn default() -> Self {
        Self {
            wait_for_instances: false,
            wait_timeout: DEFAULT_WAIT_TIMEOUT_SECS,
        }
    }
}

// ============================================================================
// Accounts and users
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cloud {
    Aws,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountParams {
    pub state: DesiredState,
    pub name: Option<String>,
    pub allow_duplicates: bool,
    pub cloud: Option<Cloud>,
    pub aws_iam_role: Option<String>,
    pub aws_external_id: Option<String>,
    #[serde(flatten)]
    pub credentials: CredentialParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserParams {
    pub state: DesiredState,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub role: Role,
    pub role_mapping: Vec<RoleMapping>,
    #[serde(flatten)]
    pub credentials: CredentialParams,
}

// ============================================================================
// Facts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactsType {
    Account,
    User,
}

/// A single value or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FactsFilter {
    pub email: Option<OneOrMany>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FactsParams {
    #[serde(rename = "type")]
    pub kind: Option<FactsType>,
    pub filter: FactsFilter,
    #[serde(flatten)]
    pub credentials: CredentialParams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("noext")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::Toml.extension(), "toml");
    }

    #[test]
    fn test_load_json_document() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(
            file,
            r#"{{"state": "absent", "group": {{"name": "web", "capacity": {{"target": 2}}}}}}"#
        )
        .unwrap();

        let document = load_document(file.path()).unwrap();
        assert_eq!(document["group"]["capacity"]["target"], 2);

        let params: InvocationParams = params(&document).unwrap();
        assert_eq!(params.state, DesiredState::Absent);
        assert_eq!(params.uniqueness_by, Uniqueness::Name);
    }

    #[test]
    fn test_load_toml_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mi.toml");
        fs::write(
            &path,
            r#"
uniqueness_by = "id"
id = "smi-123"
do_not_update = ["compute.product"]
token = "abc"

[managed_instance]
name = "web"

[managed_instance.compute]
product = "Linux/UNIX"
"#,
        )
        .unwrap();

        let document = load_document(&path).unwrap();
        assert_eq!(document["managed_instance"]["compute"]["product"], "Linux/UNIX");

        let params: InvocationParams = params(&document).unwrap();
        assert_eq!(params.uniqueness_by, Uniqueness::Id);
        assert_eq!(params.id.as_deref(), Some("smi-123"));
        assert_eq!(params.do_not_update, vec!["compute.product"]);
        assert_eq!(params.credentials.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_toml_datetimes_become_strings() {
        let document = parse_document(
            r#"
[[mr_scaler.scheduling.tasks]]
task_type = "setCapacity"
start_time = 2024-01-01T00:00:00Z
cutoff = 2024-06-30
ratio = 0.5
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let task = &document["mr_scaler"]["scheduling"]["tasks"][0];
        assert_eq!(task["start_time"], "2024-01-01T00:00:00Z");
        assert_eq!(task["cutoff"], "2024-06-30");
        assert_eq!(task["ratio"], 0.5);
    }

    #[test]
    fn test_toml_nan_is_rejected() {
        assert!(parse_document("ratio = nan", ConfigFormat::Toml).is_err());
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");
        let err = load_document(&path).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_top_level_must_be_map() {
        assert!(parse_document("[1, 2]", ConfigFormat::Json).is_err());
        assert!(parse_document("{", ConfigFormat::Json).is_err());
        assert!(parse_document("{}", ConfigFormat::Json).is_ok());
    }

    #[test]
    fn test_invalid_state_rejected() {
        let document = json!({ "state": "update" });
        assert!(params::<InvocationParams>(&document).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let base: InvocationParams = params(&json!({
            "state": "present",
            "id": "doc-id",
            "do_not_update": ["compute.product"]
        }))
        .unwrap();

        let merged = base.with_overrides(Overrides {
            state: Some(DesiredState::Absent),
            uniqueness_by: Some(Uniqueness::Id),
            id: None,
            do_not_update: vec!["compute.product".into(), "region".into()],
            action: Some("pause".into()),
        });

        assert_eq!(merged.state, DesiredState::Absent);
        assert_eq!(merged.uniqueness_by, Uniqueness::Id);
        assert_eq!(merged.id.as_deref(), Some("doc-id"));
        assert_eq!(merged.do_not_update, vec!["compute.product", "region"]);
        assert_eq!(merged.action.as_deref(), Some("pause"));
    }

    #[test]
    fn test_elastigroup_wait_defaults() {
        let params: ElastigroupParams = params(&json!({})).unwrap();
        assert!(!params.wait_for_instances);
        assert_eq!(params.wait_timeout, DEFAULT_WAIT_TIMEOUT_SECS);

        let params: ElastigroupParams =
            super::params(&json!({ "wait_for_instances": true, "wait_timeout": 60 })).unwrap();
        assert!(params.wait_for_instances);
        assert_eq!(params.wait_timeout, 60);
    }

    #[test]
    fn test_deletion_config_is_optional() {
        let params: ManagedInstanceParams = params(&json!({})).unwrap();
        assert!(params.managed_instance_config.deletion_config.is_none());

        let params: ManagedInstanceParams = super::params(&json!({
            "managed_instance_config": {
                "deletion_config": { "ami_backup": { "should_delete_images": true } }
            }
        }))
        .unwrap();
        assert!(params.managed_instance_config.deletion_config.is_some());
    }

    #[test]
    fn test_account_params() {
        let params: AccountParams = params(&json!({
            "name": "prod",
            "cloud": "aws",
            "aws_iam_role": "arn:aws:iam::1:role/spot",
            "account_id": "act-1"
        }))
        .unwrap();
        assert_eq!(params.name.as_deref(), Some("prod"));
        assert_eq!(params.cloud, Some(Cloud::Aws));
        assert!(!params.allow_duplicates);
        assert_eq!(params.credentials.account_id.as_deref(), Some("act-1"));

        assert!(super::params::<AccountParams>(&json!({ "cloud": "gcp" })).is_err());
    }

    #[test]
    fn test_user_params() {
        let params: UserParams = params(&json!({
            "email": "dev@example.com",
            "role_mapping": [{ "account_id": "act-1", "role": "admin" }]
        }))
        .unwrap();
        assert_eq!(params.role, Role::Viewer);
        assert_eq!(params.role_mapping[0].role, Role::Admin);
    }

    #[test]
    fn test_facts_email_string_or_list() {
        let params: FactsParams =
            params(&json!({ "type": "user", "filter": { "email": "a@x.io" } })).unwrap();
        assert_eq!(params.kind, Some(FactsType::User));
        assert_eq!(params.filter.email.unwrap().into_vec(), vec!["a@x.io"]);

        let params: FactsParams = super::params(&json!({
            "type": "user",
            "filter": { "email": ["a@x.io", "b@x.io"] }
        }))
        .unwrap();
        assert_eq!(params.filter.email.unwrap().into_vec().len(), 2);

        let params: FactsParams = super::params(&json!({ "type": "account" })).unwrap();
        assert_eq!(params.kind, Some(FactsType::Account));
        assert!(params.filter.email.is_none());
    }
}
