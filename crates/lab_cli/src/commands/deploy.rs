//! Deploy command - Materialize a template and create the stack.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use lab_iac::{Defaults, DeployRequest, ParameterBuilder, ParameterSet};
use lab_runner::{CloudFormationProvisioner, ProviderConfig};
use lab_templates::DeploymentTemplate;

use super::Context;

#[derive(Args)]
pub struct DeployArgs {
    /// (Required) AWS region
    #[arg(short = 'r', long)]
    aws_region: String,

    /// (Required) Stack name
    #[arg(short = 'n', long)]
    name: String,

    /// (Required) CloudFormation template file in the template directory
    #[arg(short = 't', long)]
    template_file: String,

    /// Create a network. If not set, --subnet-id and --vpc-id are required
    #[arg(short = 'c', long)]
    create_network: bool,

    /// Existing subnet ID
    #[arg(short = 'b', long)]
    subnet_id: Option<String>,

    /// Existing VPC ID
    #[arg(short = 'v', long)]
    vpc_id: Option<String>,

    /// SSH tunnel user. Required if creating a network
    #[arg(short = 'u', long)]
    ssh_tunnel_user: Option<String>,

    /// SSH tunnel password. Required if creating a network
    #[arg(short = 'p', long)]
    ssh_tunnel_password: Option<String>,

    /// Comma-separated list of private IP addresses
    #[arg(short = 'I', long, value_delimiter = ',')]
    private_ip_addresses: Vec<String>,

    /// Instance type for the Kestra EC2 instance
    #[arg(short = 'm', long, default_value = Defaults::KESTRA_INSTANCE_TYPE)]
    kestra_instance_type: String,

    /// Name of the key pair to use for the EC2 instances
    #[arg(short = 'K', long)]
    key_pair_name: Option<String>,

    /// Comma-separated list of EBS volume IDs
    #[arg(short = 'x', long, value_delimiter = ',')]
    ebs_volume_ids: Vec<String>,

    /// Comma-separated list of EFS volume IDs
    #[arg(short = 'y', long, value_delimiter = ',')]
    efs_volume_ids: Vec<String>,

    /// Create a Vault
    #[arg(short = 'V', long)]
    create_vault: bool,

    /// Comma-separated list of tags in the format key=value
    #[arg(short = 'T', long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Kestra image
    #[arg(short = 'i', long, default_value = Defaults::KESTRA_IMAGE)]
    kestra_image: String,

    /// Kestra image repository user
    #[arg(short = 'e', long)]
    kestra_image_repository_user: Option<String>,

    /// Kestra image repository password
    #[arg(short = 'f', long)]
    kestra_image_repository_password: Option<String>,

    /// Kestra configuration file in the config directory
    #[arg(short = 'k', long, default_value = Defaults::KESTRA_CONFIG_FILE)]
    kestra_config_file: String,

    /// Kestra init script in the init directory
    #[arg(short = 's', long, default_value = Defaults::KESTRA_INIT_SCRIPT)]
    kestra_init_script: String,

    /// Java Xmx value for the Kestra service
    #[arg(short = 'j', long, default_value = Defaults::JAVA_XMX)]
    java_xmx: String,

    /// Timezone for the Kestra EC2 instance
    #[arg(short = 'z', long, default_value = Defaults::TIMEZONE)]
    timezone: String,

    /// Database user
    #[arg(short = 'U', long, default_value = Defaults::DATABASE_USER)]
    database_user: String,

    /// Database password. If not set, a random password is generated
    #[arg(short = 'P', long)]
    database_password: Option<String>,

    /// AWS profile
    #[arg(short = 'a', long)]
    aws_profile: Option<String>,

    /// Validate, materialize and print the stack parameters without deploying
    #[arg(long)]
    dry_run: bool,
}

impl DeployArgs {
    fn into_request(self) -> lab_iac::IacResult<DeployRequest> {
        DeployRequest::builder(self.aws_region, self.name, self.template_file)
            .create_network(self.create_network)
            .existing_network(self.subnet_id, self.vpc_id)
            .ssh_tunnel(self.ssh_tunnel_user, self.ssh_tunnel_password)
            .private_ip_addresses(self.private_ip_addresses)
            .kestra_instance_type(self.kestra_instance_type)
            .key_pair_name(self.key_pair_name)
            .ebs_volume_ids(self.ebs_volume_ids)
            .efs_volume_ids(self.efs_volume_ids)
            .create_vault(self.create_vault)
            .tags(self.tags)
            .kestra_image(self.kestra_image)
            .image_repository(
                self.kestra_image_repository_user,
                self.kestra_image_repository_password,
            )
            .kestra_config_file(self.kestra_config_file)
            .kestra_init_script(self.kestra_init_script)
            .java_xmx(self.java_xmx)
            .timezone(self.timezone)
            .database_user(self.database_user)
            .database_password(self.database_password)
            .aws_profile(self.aws_profile)
            .build()
    }
}

/// Parameter set as pretty JSON with secret values masked.
fn dry_run_output(params: &ParameterSet) -> Result<String> {
    serde_json::to_string_pretty(&params.masked()).context("Failed to serialize stack parameters")
}

pub async fn execute(args: DeployArgs, ctx: &Context) -> Result<()> {
    let dry_run = args.dry_run;
    let request = args.into_request()?;

    info!("Deploying stack: {}", request.name);

    let loader = ctx.asset_loader()?;
    let template = DeploymentTemplate::prepare(
        &loader,
        &request.template_file,
        &request.kestra_config_file,
        &request.kestra_init_script,
    )
    .with_context(|| format!("Failed to prepare template {}", request.template_file))?;

    let params = ParameterBuilder::new(&request).build()?;

    if dry_run {
        println!("{}", dry_run_output(&params)?);
        info!("Dry run: stack {} not submitted", request.name);
        return Ok(());
    }

    let config = ProviderConfig::new(&request.region).profile(request.aws_profile.as_deref());
    let provisioner = CloudFormationProvisioner::connect(&config).await;

    let report = ctx
        .orchestrator(Arc::new(provisioner))
        .create(&request.name, template.body(), &params)
        .await?;

    if !ctx.quiet {
        println!();
        println!("✅ Stack {} deployed", report.stack_name);
        if let Some(stack_id) = &report.stack_id {
            println!("   Stack ID: {}", stack_id);
        }
        println!("   Polls: {} ({:.0?})", report.polls, report.elapsed);
    }

    Ok(())
}
