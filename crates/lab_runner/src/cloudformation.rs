//! CloudFormation-backed stack provisioner.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_cloudformation::types;
use aws_sdk_cloudformation::Client;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::provisioner::{Capability, CreateStackInput, StackDescription, StackHandle, StackProvisioner};
use crate::status::StackStatus;

/// Stack provisioner talking to the CloudFormation API.
#[derive(Debug, Clone)]
pub struct CloudFormationProvisioner {
    client: Client,
}

impl CloudFormationProvisioner {
    /// Resolve credentials for the configured region/profile and build a client.
    pub async fn connect(config: &ProviderConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }

        info!(
            "Connecting to CloudFormation in {} (profile: {})",
            config.region,
            config.profile.as_deref().unwrap_or("default")
        );

        let sdk_config = loader.load().await;
        Self::from_client(Client::new(&sdk_config))
    }

    /// Wrap an existing SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn sdk_capability(capability: Capability) -> types::Capability {
    match capability {
        Capability::Iam => types::Capability::CapabilityIam,
        Capability::NamedIam => types::Capability::CapabilityNamedIam,
        Capability::AutoExpand => types::Capability::CapabilityAutoExpand,
    }
}

/// A listed stack always carries a status; one without is a malformed answer,
/// never a sign that the stack is gone.
fn describe(stack: &types::Stack, requested: &str) -> RunnerResult<StackDescription> {
    let Some(status) = stack.stack_status() else {
        warn!("DescribeStacks returned stack {} without a status", requested);
        return Err(RunnerError::DescribeFailed {
            stack: requested.to_string(),
            message: "stack returned without a status".to_string(),
        });
    };

    Ok(StackDescription {
        stack_name: stack.stack_name().unwrap_or(requested).to_string(),
        stack_id: stack.stack_id().map(str::to_string),
        status: StackStatus::from(status),
        status_reason: stack.stack_status_reason().map(str::to_string),
    })
}

/// CloudFormation answers DescribeStacks for an unknown stack with a
/// `ValidationError` whose message ends in "does not exist".
fn is_missing_stack<E: ProvideErrorMetadata>(err: &E) -> bool {
    err.code() == Some("ValidationError")
        && err.message().is_some_and(|m| m.contains("does not exist"))
}

#[async_trait]
impl StackProvisioner for CloudFormationProvisioner {
    async fn submit_create(&self, input: &CreateStackInput) -> RunnerResult<StackHandle> {
        let parameters = input
            .parameters
            .iter()
            .map(|p| {
                types::Parameter::builder()
                    .parameter_key(&p.key)
                    .parameter_value(&p.value)
                    .build()
            })
            .collect::<Vec<_>>();
        let capabilities = input
            .capabilities
            .iter()
            .copied()
            .map(sdk_capability)
            .collect::<Vec<_>>();

        debug!(
            "CreateStack {} with {} parameters and capabilities {:?}",
            input.stack_name,
            parameters.len(),
            input.capabilities
        );

        let output = self
            .client
            .create_stack()
            .stack_name(&input.stack_name)
            .template_body(&input.template_body)
            .set_parameters(Some(parameters))
            .set_capabilities(Some(capabilities))
            .send()
            .await
            .map_err(|e| RunnerError::SubmitFailed {
                stack: input.stack_name.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(StackHandle {
            stack_id: output
                .stack_id()
                .unwrap_or(input.stack_name.as_str())
                .to_string(),
            submitted_at: Utc::now(),
        })
    }

    async fn submit_delete(&self, stack_name: &str) -> RunnerResult<()> {
        debug!("DeleteStack {}", stack_name);

        self.client
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| RunnerError::SubmitFailed {
                stack: stack_name.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }

    async fn describe_stack(&self, stack_name: &str) -> RunnerResult<Option<StackDescription>> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| {
                if is_missing_stack(&e) {
                    RunnerError::StackNotFound(stack_name.to_string())
                } else {
                    RunnerError::DescribeFailed {
                        stack: stack_name.to_string(),
                        message: DisplayErrorContext(&e).to_string(),
                    }
                }
            })?;

        output
            .stacks()
            .first()
            .map(|stack| describe(stack, stack_name))
            .transpose()
    }
}
