//! Deploy request definition and validation.

use serde::{Deserialize, Serialize};

use crate::error::{IacError, IacResult};

/// Default values for optional deploy options.
pub struct Defaults;

impl Defaults {
    pub const KESTRA_INSTANCE_TYPE: &'static str = "t3.large";
    pub const KESTRA_IMAGE: &'static str = "kestra/kestra:latest-full";
    pub const KESTRA_CONFIG_FILE: &'static str = "default.yaml";
    pub const KESTRA_INIT_SCRIPT: &'static str = "default.sh";
    pub const JAVA_XMX: &'static str = "512m";
    pub const TIMEZONE: &'static str = "UTC";
    pub const DATABASE_USER: &'static str = "kestra";
}

/// User/password pair where both halves are required together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// All user-supplied options for a deployment.
///
/// Only obtainable through [`DeployRequestBuilder::build`], so every instance
/// satisfies the network and credential pairing rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
    pub region: String,
    pub name: String,
    pub template_file: String,
    pub create_network: bool,
    pub subnet_id: Option<String>,
    pub vpc_id: Option<String>,
    pub ssh_tunnel: Option<Credentials>,
    pub private_ip_addresses: Vec<String>,
    pub kestra_instance_type: String,
    pub key_pair_name: Option<String>,
    pub ebs_volume_ids: Vec<String>,
    pub efs_volume_ids: Vec<String>,
    pub create_vault: bool,
    pub tags: Vec<String>,
    pub kestra_image: String,
    pub image_repository: Option<Credentials>,
    pub kestra_config_file: String,
    pub kestra_init_script: String,
    pub java_xmx: String,
    pub timezone: String,
    pub database_user: String,
    pub database_password: Option<String>,
    pub aws_profile: Option<String>,
}

impl DeployRequest {
    pub fn builder(
        region: impl Into<String>,
        name: impl Into<String>,
        template_file: impl Into<String>,
    ) -> DeployRequestBuilder {
        DeployRequestBuilder::new(region, name, template_file)
    }
}

/// Builder for [`DeployRequest`].
#[derive(Debug, Clone)]
pub struct DeployRequestBuilder {
    region: String,
    name: String,
    template_file: String,
    create_network: bool,
    subnet_id: Option<String>,
    vpc_id: Option<String>,
    ssh_tunnel_user: Option<String>,
    ssh_tunnel_password: Option<String>,
    private_ip_addresses: Vec<String>,
    kestra_instance_type: String,
    key_pair_name: Option<String>,
    ebs_volume_ids: Vec<String>,
    efs_volume_ids: Vec<String>,
    create_vault: bool,
    tags: Vec<String>,
    kestra_image: String,
    image_repository_user: Option<String>,
    image_repository_password: Option<String>,
    kestra_config_file: String,
    kestra_init_script: String,
    java_xmx: String,
    timezone: String,
    database_user: String,
    database_password: Option<String>,
    aws_profile: Option<String>,
}

/// Treat blank strings the same as an unset option.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn pair(
    user: Option<String>,
    password: Option<String>,
    what: &str,
) -> IacResult<Option<Credentials>> {
    match (user, password) {
        (Some(user), Some(password)) => Ok(Some(Credentials { user, password })),
        (None, None) => Ok(None),
        _ => Err(IacError::Validation(format!(
            "both {} user and password are required together",
            what
        ))),
    }
}

impl DeployRequestBuilder {
    pub fn new(
        region: impl Into<String>,
        name: impl Into<String>,
        template_file: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            name: name.into(),
            template_file: template_file.into(),
            create_network: false,
            subnet_id: None,
            vpc_id: None,
            ssh_tunnel_user: None,
            ssh_tunnel_password: None,
            private_ip_addresses: Vec::new(),
            kestra_instance_type: Defaults::KESTRA_INSTANCE_TYPE.to_string(),
            key_pair_name: None,
            ebs_volume_ids: Vec::new(),
            efs_volume_ids: Vec::new(),
            create_vault: false,
            tags: Vec::new(),
            kestra_image: Defaults::KESTRA_IMAGE.to_string(),
            image_repository_user: None,
            image_repository_password: None,
            kestra_config_file: Defaults::KESTRA_CONFIG_FILE.to_string(),
            kestra_init_script: Defaults::KESTRA_INIT_SCRIPT.to_string(),
            java_xmx: Defaults::JAVA_XMX.to_string(),
            timezone: Defaults::TIMEZONE.to_string(),
            database_user: Defaults::DATABASE_USER.to_string(),
            database_password: None,
            aws_profile: None,
        }
    }

    pub fn create_network(mut self, create: bool) -> Self {
        self.create_network = create;
        self
    }

    pub fn existing_network(
        mut self,
        subnet_id: Option<String>,
        vpc_id: Option<String>,
    ) -> Self {
        self.subnet_id = present(subnet_id);
        self.vpc_id = present(vpc_id);
        self
    }

    pub fn ssh_tunnel(mut self, user: Option<String>, password: Option<String>) -> Self {
        self.ssh_tunnel_user = present(user);
        self.ssh_tunnel_password = present(password);
        self
    }

    pub fn private_ip_addresses(mut self, addresses: Vec<String>) -> Self {
        self.private_ip_addresses = addresses;
        self
    }

    pub fn kestra_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.kestra_instance_type = instance_type.into();
        self
    }

    pub fn key_pair_name(mut self, key_pair: Option<String>) -> Self {
        self.key_pair_name = present(key_pair);
        self
    }

    pub fn ebs_volume_ids(mut self, ids: Vec<String>) -> Self {
        self.ebs_volume_ids = ids;
        self
    }

    pub fn efs_volume_ids(mut self, ids: Vec<String>) -> Self {
        self.efs_volume_ids = ids;
        self
    }

    pub fn create_vault(mut self, create: bool) -> Self {
        self.create_vault = create;
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn kestra_image(mut self, image: impl Into<String>) -> Self {
        self.kestra_image = image.into();
        self
    }

    pub fn image_repository(mut self, user: Option<String>, password: Option<String>) -> Self {
        self.image_repository_user = present(user);
        self.image_repository_password = present(password);
        self
    }

    pub fn kestra_config_file(mut self, file: impl Into<String>) -> Self {
        self.kestra_config_file = file.into();
        self
    }

    pub fn kestra_init_script(mut self, file: impl Into<String>) -> Self {
        self.kestra_init_script = file.into();
        self
    }

    pub fn java_xmx(mut self, xmx: impl Into<String>) -> Self {
        self.java_xmx = xmx.into();
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn database_user(mut self, user: impl Into<String>) -> Self {
        self.database_user = user.into();
        self
    }

    pub fn database_password(mut self, password: Option<String>) -> Self {
        self.database_password = present(password);
        self
    }

    pub fn aws_profile(mut self, profile: Option<String>) -> Self {
        self.aws_profile = present(profile);
        self
    }

    /// Validate option consistency and produce the request.
    pub fn build(self) -> IacResult<DeployRequest> {
        for (value, flag) in [
            (&self.region, "aws-region"),
            (&self.name, "name"),
            (&self.template_file, "template-file"),
        ] {
            if value.trim().is_empty() {
                return Err(IacError::Validation(format!("{} is required", flag)));
            }
        }

        if self.create_network {
            if self.ssh_tunnel_user.is_none() || self.ssh_tunnel_password.is_none() {
                return Err(IacError::Validation(
                    "creating a network requires -u ssh-tunnel-user and -p ssh-tunnel-password"
                        .to_string(),
                ));
            }
        } else if self.subnet_id.is_none() || self.vpc_id.is_none() {
            return Err(IacError::Validation(
                "not creating a network requires -b subnet-id and -v vpc-id".to_string(),
            ));
        }

        let ssh_tunnel = pair(self.ssh_tunnel_user, self.ssh_tunnel_password, "SSH tunnel")?;
        let image_repository = pair(
            self.image_repository_user,
            self.image_repository_password,
            "Kestra image repository",
        )?;

        Ok(DeployRequest {
            region: self.region,
            name: self.name,
            template_file: self.template_file,
            create_network: self.create_network,
            subnet_id: self.subnet_id,
            vpc_id: self.vpc_id,
            ssh_tunnel,
            private_ip_addresses: self.private_ip_addresses,
            kestra_instance_type: self.kestra_instance_type,
            key_pair_name: self.key_pair_name,
            ebs_volume_ids: self.ebs_volume_ids,
            efs_volume_ids: self.efs_volume_ids,
            create_vault: self.create_vault,
            tags: self.tags,
            kestra_image: self.kestra_image,
            image_repository,
            kestra_config_file: self.kestra_config_file,
            kestra_init_script: self.kestra_init_script,
            java_xmx: self.java_xmx,
            timezone: self.timezone,
            database_user: self.database_user,
            database_password: self.database_password,
            aws_profile: self.aws_profile,
        })
    }
}
