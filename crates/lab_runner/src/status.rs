//! Stack status values reported by the provisioning service.

use serde::{Deserialize, Serialize};

/// Stack status as reported by CloudFormation.
///
/// Values this tool never branches on are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StackStatus {
    CreateInProgress,
    CreateFailed,
    CreateComplete,
    RollbackInProgress,
    RollbackFailed,
    RollbackComplete,
    DeleteInProgress,
    DeleteFailed,
    DeleteComplete,
    ReviewInProgress,
    Other(String),
}

impl StackStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateInProgress => "CREATE_IN_PROGRESS",
            Self::CreateFailed => "CREATE_FAILED",
            Self::CreateComplete => "CREATE_COMPLETE",
            Self::RollbackInProgress => "ROLLBACK_IN_PROGRESS",
            Self::RollbackFailed => "ROLLBACK_FAILED",
            Self::RollbackComplete => "ROLLBACK_COMPLETE",
            Self::DeleteInProgress => "DELETE_IN_PROGRESS",
            Self::DeleteFailed => "DELETE_FAILED",
            Self::DeleteComplete => "DELETE_COMPLETE",
            Self::ReviewInProgress => "REVIEW_IN_PROGRESS",
            Self::Other(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "CREATE_IN_PROGRESS" => Self::CreateInProgress,
            "CREATE_FAILED" => Self::CreateFailed,
            "CREATE_COMPLETE" => Self::CreateComplete,
            "ROLLBACK_IN_PROGRESS" => Self::RollbackInProgress,
            "ROLLBACK_FAILED" => Self::RollbackFailed,
            "ROLLBACK_COMPLETE" => Self::RollbackComplete,
            "DELETE_IN_PROGRESS" => Self::DeleteInProgress,
            "DELETE_FAILED" => Self::DeleteFailed,
            "DELETE_COMPLETE" => Self::DeleteComplete,
            "REVIEW_IN_PROGRESS" => Self::ReviewInProgress,
            other => Self::Other(other.to_string()),
        }
    }

    /// Terminal success for either operation.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::CreateComplete | Self::DeleteComplete)
    }

    /// Terminal failure for either operation.
    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            Self::CreateFailed | Self::RollbackComplete | Self::DeleteFailed
        )
    }

    /// Neither a terminal success nor a terminal failure.
    pub fn is_in_progress(&self) -> bool {
        !self.is_complete() && !self.is_failed()
    }
}

impl std::fmt::Display for StackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for StackStatus {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for StackStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<StackStatus> for String {
    fn from(status: StackStatus) -> Self {
        status.as_str().to_string()
    }
}

impl From<&aws_sdk_cloudformation::types::StackStatus> for StackStatus {
    fn from(status: &aws_sdk_cloudformation::types::StackStatus) -> Self {
        Self::parse(status.as_str())
    }
}
