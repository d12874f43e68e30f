//! Stack provisioner trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RunnerResult;
use crate::status::StackStatus;

/// A named input value supplied to a stack operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub value: String,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Capabilities a template may require the caller to acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Iam,
    NamedIam,
    AutoExpand,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iam => "CAPABILITY_IAM",
            Self::NamedIam => "CAPABILITY_NAMED_IAM",
            Self::AutoExpand => "CAPABILITY_AUTO_EXPAND",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input of a create-stack submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStackInput {
    pub stack_name: String,
    pub template_body: String,
    pub parameters: Vec<Parameter>,
    pub capabilities: Vec<Capability>,
}

impl CreateStackInput {
    pub fn new(stack_name: impl Into<String>, template_body: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            template_body: template_body.into(),
            parameters: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    pub fn parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }
}

/// Handle returned by an accepted create submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackHandle {
    /// Provider-assigned stack identifier
    pub stack_id: String,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
}

/// Current state of a stack as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackDescription {
    pub stack_name: String,
    pub stack_id: Option<String>,
    pub status: StackStatus,
    pub status_reason: Option<String>,
}

/// Remote provisioning service.
///
/// Implementations must report a stack the provider no longer knows about
/// either as `Ok(None)` or as `RunnerError::StackNotFound`.
#[async_trait]
pub trait StackProvisioner: Send + Sync {
    /// Submit a create-stack request.
    async fn submit_create(&self, input: &CreateStackInput) -> RunnerResult<StackHandle>;

    /// Submit a delete-stack request.
    async fn submit_delete(&self, stack_name: &str) -> RunnerResult<()>;

    /// Describe the current status of a stack.
    async fn describe_stack(&self, stack_name: &str) -> RunnerResult<Option<StackDescription>>;
}
