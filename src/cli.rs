use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use declarative::{DesiredState, Uniqueness};
use spotkit::CredentialParams;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spotctl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declaratively manage Spot.io accounts, users and AWS resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format for the result record
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, update or delete a managed instance
    ManagedInstance(ReconcileArgs),

    /// Create, update or delete an elastigroup
    Elastigroup(ElastigroupArgs),

    /// Create, update or delete an EMR scaler
    MrScaler(ReconcileArgs),

    /// Create or delete an account
    Account(DocumentArgs),

    /// Create, update or delete a user
    User(DocumentArgs),

    /// Read account or user facts
    Facts(DocumentArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Credentials
// ============================================================================

/// Credential flags; they take precedence over the document and environment
#[derive(Args, Default)]
pub struct CredentialArgs {
    /// Spot API token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Spot account id (act-...)
    #[arg(long, global = true)]
    pub account_id: Option<String>,

    /// Credentials file [default: ~/.spotinst/credentials]
    #[arg(long, global = true)]
    pub credentials_path: Option<String>,

    /// OAuth username
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// OAuth client id
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// API base URL
    #[arg(long, global = true, hide = true)]
    pub api_base: Option<String>,
}

impl CredentialArgs {
    pub fn params(&self) -> CredentialParams {
        CredentialParams {
            token: self.token.clone(),
            account_id: self.account_id.clone(),
            credentials_path: self.credentials_path.clone(),
            username: self.username.clone(),
            client_id: self.client_id.clone(),
            ..CredentialParams::default()
        }
    }
}

// ============================================================================
// Resource commands
// ============================================================================

#[derive(Args)]
pub struct DocumentArgs {
    /// Invocation document (JSON, or TOML with a .toml extension)
    pub file: PathBuf,

    /// Desired state, overriding the document
    #[arg(short, long, value_enum)]
    pub state: Option<StateArg>,
}

#[derive(Args)]
pub struct ReconcileArgs {
    /// Invocation document (JSON, or TOML with a .toml extension)
    pub file: PathBuf,

    /// Desired state, overriding the document
    #[arg(short, long, value_enum)]
    pub state: Option<StateArg>,

    /// How the resource is identified
    #[arg(short, long, value_enum)]
    pub uniqueness_by: Option<UniquenessArg>,

    /// Resource id (with --uniqueness-by id)
    #[arg(long)]
    pub id: Option<String>,

    /// Dotted path never sent on update (repeatable)
    #[arg(long = "do-not-update", value_name = "PATH")]
    pub do_not_update: Vec<String>,

    /// Lifecycle action to run after an update (e.g. pause, resume, recycle)
    #[arg(short, long)]
    pub action: Option<String>,
}

#[derive(Args)]
pub struct ElastigroupArgs {
    #[command(flatten)]
    pub reconcile: ReconcileArgs,

    /// Wait for instances to become ready after creation
    #[arg(long)]
    pub wait_for_instances: bool,

    /// Seconds to wait for instances
    #[arg(long)]
    pub wait_timeout: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StateArg {
    Present,
    Absent,
}

impl From<StateArg> for DesiredState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Present => Self::Present,
            StateArg::Absent => Self::Absent,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum UniquenessArg {
    Id,
    Name,
}

impl From<UniquenessArg> for Uniqueness {
    fn from(arg: UniquenessArg) -> Self {
        match arg {
            UniquenessArg::Id => Self::Id,
            UniquenessArg::Name => Self::Name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_reconcile_flags() {
        let cli = Cli::parse_from([
            "spotctl",
            "-vv",
            "--token",
            "abc",
            "managed-instance",
            "mi.json",
            "--state",
            "absent",
            "--uniqueness-by",
            "id",
            "--id",
            "smi-1",
            "--do-not-update",
            "compute.product",
            "--do-not-update",
            "region",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.credentials.params().token.as_deref(), Some("abc"));

        let Command::ManagedInstance(args) = cli.command else {
            panic!("expected managed-instance");
        };
        assert_eq!(args.file, PathBuf::from("mi.json"));
        assert_eq!(args.state.map(DesiredState::from), Some(DesiredState::Absent));
        assert_eq!(args.uniqueness_by.map(Uniqueness::from), Some(Uniqueness::Id));
        assert_eq!(args.do_not_update, vec!["compute.product", "region"]);
    }

    #[test]
    fn test_elastigroup_wait_flags() {
        let cli = Cli::parse_from([
            "spotctl",
            "elastigroup",
            "eg.toml",
            "--wait-for-instances",
            "--wait-timeout",
            "60",
            "--output",
            "json",
        ]);
        assert!(cli.output == OutputFormat::Json);
        let Command::Elastigroup(args) = cli.command else {
            panic!("expected elastigroup");
        };
        assert!(args.wait_for_instances);
        assert_eq!(args.wait_timeout, Some(60));
        assert!(args.reconcile.state.is_none());
    }
}
