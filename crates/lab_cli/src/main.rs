//! kestra-aws-lab CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 4: Template error
//! - 5: Stack operation failure
//! - 130: Cancelled

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lab_iac::IacError;
use lab_runner::RunnerError;
use lab_templates::TemplateError;

mod commands;

use commands::{Cli, Commands, Context};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const STACK_ERROR: u8 = 5;
    pub const CANCELLED: u8 = 130;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_exit_code(&e));
        }
    };

    init_logging(&cli);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping");
            on_interrupt.cancel();
        }
    });

    let ctx = Context::from_cli(&cli, cancel);

    let result = match cli.command {
        Commands::Deploy(args) => commands::deploy::execute(args, &ctx).await,
        Commands::Destroy(args) => commands::destroy::execute(args, &ctx).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = log_filter(cli, std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// RUST_LOG, when set and valid, replaces the default filter entirely.
fn log_filter(cli: &Cli, rust_log: Option<&str>) -> EnvFilter {
    let default = if cli.verbose {
        "lab=debug,warn"
    } else if cli.quiet {
        "warn"
    } else {
        "lab=info,warn"
    };

    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Exit code for a command line clap rejected; help and version output succeed.
fn parse_exit_code(e: &clap::Error) -> u8 {
    if e.use_stderr() {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::SUCCESS
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<IacError>() {
            return match err {
                IacError::Validation(_) | IacError::MalformedTag { .. } => {
                    ExitCodes::VALIDATION_FAILURE
                }
                IacError::Cancelled(_) => ExitCodes::CANCELLED,
                IacError::DuplicateParameter(_) | IacError::RandomSource(_) => {
                    ExitCodes::GENERAL_ERROR
                }
                IacError::StackNotFound(_)
                | IacError::OperationFailed { .. }
                | IacError::Timeout { .. }
                | IacError::Runner(_) => ExitCodes::STACK_ERROR,
            };
        }
        if cause.downcast_ref::<TemplateError>().is_some() {
            return ExitCodes::TEMPLATE_ERROR;
        }
        if cause.downcast_ref::<RunnerError>().is_some() {
            return ExitCodes::STACK_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}
