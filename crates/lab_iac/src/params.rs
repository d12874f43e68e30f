//! Stack parameter assembly.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use lab_runner::Parameter;

use crate::error::{IacError, IacResult};
use crate::request::DeployRequest;
use crate::secrets::generate_secret;
use crate::tags::Tag;

/// Parameter names the deployment templates declare.
pub mod names {
    pub const NAME: &str = "Name";
    pub const CREATE_NETWORK: &str = "CreateNetwork";
    pub const KESTRA_INSTANCE_TYPE: &str = "KestraInstanceType";
    pub const KESTRA_IMAGE: &str = "KestraImage";
    pub const JAVA_XMX: &str = "JavaXmx";
    pub const TIMEZONE: &str = "Timezone";
    pub const DATABASE_USER: &str = "DatabaseUser";
    pub const DATABASE_PASSWORD: &str = "DatabasePassword";
    pub const EXISTING_SUBNET_ID: &str = "ExistingSubnetId";
    pub const EXISTING_VPC_ID: &str = "ExistingVpcId";
    pub const SSH_TUNNEL_USER: &str = "SshTunnelUser";
    pub const SSH_TUNNEL_PASSWORD: &str = "SshTunnelPassword";
    pub const PRIVATE_IP_ADDRESS: &str = "PrivateIpAddress";
    pub const KEY_PAIR_NAME: &str = "KeyPairName";
    pub const EBS_VOLUME_ID: &str = "EbsVolumeId";
    pub const EFS_VOLUME_ID: &str = "EfsVolumeId";
    pub const VAULT_TOKEN: &str = "VaultToken";
    pub const TAG_KEY: &str = "TagKey";
    pub const TAG_VALUE: &str = "TagValue";
    pub const KESTRA_IMAGE_REPOSITORY_USER: &str = "KestraImageRepositoryUser";
    pub const KESTRA_IMAGE_REPOSITORY_PASSWORD: &str = "KestraImageRepositoryPassword";

    /// Parameters whose values must never be printed.
    pub const SECRETS: &[&str] = &[
        DATABASE_PASSWORD,
        SSH_TUNNEL_PASSWORD,
        VAULT_TOKEN,
        KESTRA_IMAGE_REPOSITORY_PASSWORD,
    ];
}

/// Ordered parameter list with unique keys.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
    #[serde(skip)]
    keys: HashSet<String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. Fails if the key is already present.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> IacResult<()> {
        let key = key.into();
        if !self.keys.insert(key.clone()) {
            return Err(IacError::DuplicateParameter(key));
        }
        self.parameters.push(Parameter::new(key, value));
        Ok(())
    }

    /// Append `<prefix><i>` for every value, 1-indexed in input order.
    pub fn push_indexed(&mut self, prefix: &str, values: &[String]) -> IacResult<()> {
        for (i, value) in values.iter().enumerate() {
            self.push(format!("{}{}", prefix, i + 1), value.as_str())?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn as_slice(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn into_vec(self) -> Vec<Parameter> {
        self.parameters
    }

    /// Copy of the set with secret values replaced by `********`.
    pub fn masked(&self) -> Vec<Parameter> {
        self.parameters
            .iter()
            .map(|p| {
                if names::SECRETS.contains(&p.key.as_str()) {
                    Parameter::new(p.key.clone(), "********")
                } else {
                    p.clone()
                }
            })
            .collect()
    }
}

/// Converts a validated [`DeployRequest`] into the stack parameter set.
pub struct ParameterBuilder<'a> {
    request: &'a DeployRequest,
}

impl<'a> ParameterBuilder<'a> {
    pub fn new(request: &'a DeployRequest) -> Self {
        Self { request }
    }

    /// Build the parameter set. Generates the database password when none was
    /// given and a fresh vault token when a vault is requested.
    pub fn build(&self) -> IacResult<ParameterSet> {
        let request = self.request;
        let mut params = ParameterSet::new();

        let database_password = match &request.database_password {
            Some(password) => password.clone(),
            None => generate_secret()?,
        };

        params.push(names::NAME, request.name.as_str())?;
        params.push(names::CREATE_NETWORK, request.create_network.to_string())?;
        params.push(names::KESTRA_INSTANCE_TYPE, request.kestra_instance_type.as_str())?;
        params.push(names::KESTRA_IMAGE, request.kestra_image.as_str())?;
        params.push(names::JAVA_XMX, request.java_xmx.as_str())?;
        params.push(names::TIMEZONE, request.timezone.as_str())?;
        params.push(names::DATABASE_USER, request.database_user.as_str())?;
        params.push(names::DATABASE_PASSWORD, database_password)?;

        if !request.create_network {
            let (Some(subnet_id), Some(vpc_id)) = (&request.subnet_id, &request.vpc_id) else {
                return Err(IacError::Validation(
                    "not creating a network requires -b subnet-id and -v vpc-id".to_string(),
                ));
            };
            params.push(names::EXISTING_SUBNET_ID, subnet_id.as_str())?;
            params.push(names::EXISTING_VPC_ID, vpc_id.as_str())?;
        }

        if let Some(ssh) = &request.ssh_tunnel {
            params.push(names::SSH_TUNNEL_USER, ssh.user.as_str())?;
            params.push(names::SSH_TUNNEL_PASSWORD, ssh.password.as_str())?;
        }

        params.push_indexed(names::PRIVATE_IP_ADDRESS, &request.private_ip_addresses)?;

        if let Some(key_pair) = &request.key_pair_name {
            params.push(names::KEY_PAIR_NAME, key_pair.as_str())?;
        }

        params.push_indexed(names::EBS_VOLUME_ID, &request.ebs_volume_ids)?;
        params.push_indexed(names::EFS_VOLUME_ID, &request.efs_volume_ids)?;

        if request.create_vault {
            params.push(names::VAULT_TOKEN, generate_secret()?)?;
        }

        for (i, token) in request.tags.iter().enumerate() {
            let tag = Tag::parse(token)?;
            params.push(format!("{}{}", names::TAG_KEY, i + 1), tag.key)?;
            params.push(format!("{}{}", names::TAG_VALUE, i + 1), tag.value)?;
        }

        if let Some(repository) = &request.image_repository {
            params.push(names::KESTRA_IMAGE_REPOSITORY_USER, repository.user.as_str())?;
            params.push(
                names::KESTRA_IMAGE_REPOSITORY_PASSWORD,
                repository.password.as_str(),
            )?;
        }

        debug!(
            "Built {} stack parameters: {}",
            params.len(),
            params.keys().collect::<Vec<_>>().join(", ")
        );

        Ok(params)
    }
}
