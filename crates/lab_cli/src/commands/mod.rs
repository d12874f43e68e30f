//! CLI command definitions.
//!
//! This module defines the command structure for the kestra-aws-lab CLI.
//! Each subcommand maps to one stack operation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use lab_iac::{PollConfig, StackOrchestrator, StatusEvent};
use lab_runner::StackProvisioner;
use lab_templates::AssetLoader;

pub mod deploy;
pub mod destroy;

/// kestra-aws-lab - Kestra environments on AWS
#[derive(Parser)]
#[command(name = "kestra-aws-lab")]
#[command(version, about = "Deploys Kestra environments to AWS")]
#[command(long_about = r#"
Deploys Kestra environments to AWS for development and testing purposes.

COMMANDS:
  deploy   → Materialize a stack template and create the stack
  destroy  → Delete a stack and wait until it is gone

ASSETS:
  Templates, Kestra configurations and init scripts are read from the
  template/, config/ and init/ directories next to the executable, or
  under --assets-dir when given.

EXIT CODES:
  0   - Success
  1   - General error
  2   - Invalid arguments
  3   - Validation failure
  4   - Template error
  5   - Stack operation failure
  130 - Cancelled
"#)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Directory holding template/, config/ and init/ (defaults to the executable's directory)
    #[arg(long, global = true, env = "KESTRA_LAB_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Seconds between stack status queries
    #[arg(long, global = true, default_value_t = 3)]
    pub poll_interval_secs: u64,

    /// Give up waiting for a terminal stack status after this many seconds
    #[arg(long, global = true)]
    pub max_wait_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy a Kestra environment as a new stack
    Deploy(deploy::DeployArgs),

    /// Destroy a previously deployed stack
    Destroy(destroy::DestroyArgs),
}

/// Settings shared by every command.
pub struct Context {
    pub assets_dir: Option<PathBuf>,
    pub poll: PollConfig,
    pub cancel: CancellationToken,
    pub quiet: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli, cancel: CancellationToken) -> Self {
        Self {
            assets_dir: cli.assets_dir.clone(),
            poll: PollConfig::default()
                .interval(Duration::from_secs(cli.poll_interval_secs))
                .max_wait(cli.max_wait_secs.map(Duration::from_secs)),
            cancel,
            quiet: cli.quiet,
        }
    }

    /// Asset loader rooted at --assets-dir or the executable's directory.
    pub fn asset_loader(&self) -> lab_templates::TemplateResult<AssetLoader> {
        match &self.assets_dir {
            Some(dir) => Ok(AssetLoader::new(dir)),
            None => AssetLoader::from_executable_dir(),
        }
    }

    /// Orchestrator that prints every observed stack status.
    pub fn orchestrator(&self, provisioner: Arc<dyn StackProvisioner>) -> StackOrchestrator {
        let orchestrator = StackOrchestrator::new(provisioner)
            .with_poll_config(self.poll)
            .with_cancellation(self.cancel.clone());

        if self.quiet {
            return orchestrator;
        }
        orchestrator.on_status(Arc::new(|event: &StatusEvent| {
            println!("Stack status: {}", event.status);
        }))
    }
}
