mod cli;
mod commands;
mod config;
mod schema;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, OutputFormat};
use spotkit::CredentialParams;
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub output: OutputFormat,
    /// Credential flags, merged over the document's credential keys
    pub credentials: CredentialParams,
    pub api_base: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        output: cli.output,
        credentials: cli.credentials.params(),
        api_base: cli.credentials.api_base.clone(),
    };
    log::trace!("verbosity {}", ctx.verbose);

    match run(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::ManagedInstance(args) => commands::managed_instance::run(ctx, args),
        Command::Elastigroup(args) => commands::elastigroup::run(ctx, args),
        Command::MrScaler(args) => commands::mr_scaler::run(ctx, args),
        Command::Account(args) => commands::account::run(ctx, args),
        Command::User(args) => commands::user::run(ctx, args),
        Command::Facts(args) => commands::facts::run(ctx, args),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "spotctl", &mut io::stdout());
            Ok(())
        }
    }
}

/// Print an error with advice for Spot API failures
fn report(err: &anyhow::Error) {
    ui::error(&format!("{err:#}"));

    let category = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<spotkit::Error>())
        .map(spotkit::Error::category);
    if let Some(category) = category {
        ui::dim(&format!("{}: {}", category.description(), category.advice()));
    }
}
