//! Destroy command - Delete a stack and wait until it is gone.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use lab_iac::IacError;
use lab_runner::{CloudFormationProvisioner, ProviderConfig};

use super::Context;

#[derive(Args)]
pub struct DestroyArgs {
    /// (Required) AWS region
    #[arg(short = 'r', long)]
    aws_region: String,

    /// (Required) Stack name
    #[arg(short = 'n', long)]
    name: String,

    /// AWS profile
    #[arg(short = 'a', long)]
    aws_profile: Option<String>,
}

pub async fn execute(args: DestroyArgs, ctx: &Context) -> Result<()> {
    for (value, flag) in [(&args.aws_region, "aws-region"), (&args.name, "name")] {
        if value.trim().is_empty() {
            return Err(IacError::Validation(format!("{} is required", flag)).into());
        }
    }

    info!("Destroying stack: {}", args.name);

    let config = ProviderConfig::new(&args.aws_region).profile(args.aws_profile.as_deref());
    let provisioner = CloudFormationProvisioner::connect(&config).await;

    let report = ctx
        .orchestrator(Arc::new(provisioner))
        .delete(&args.name)
        .await?;

    if !ctx.quiet {
        println!();
        println!("✅ Stack {} deleted", report.stack_name);
    }

    Ok(())
}
