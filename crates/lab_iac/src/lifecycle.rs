//! Stack lifecycle state machine.
//!
//! A stack operation moves `Submitted → Polling → {Succeeded, Failed}`. The
//! transition out of `Polling` depends only on the operation kind and on what
//! the latest status query observed, so it is expressed as the pure function
//! [`next_state`].

use serde::{Deserialize, Serialize};

use lab_runner::StackStatus;

/// Kind of stack operation being driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The stack exists with this status.
    Status(StackStatus),
    /// The provider no longer knows the stack.
    Missing,
}

/// Why an operation ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The stack reached a terminal failure status.
    TerminalStatus(StackStatus),
    /// The stack a create was just submitted for is not describable.
    NotFound,
}

/// Lifecycle state of one stack operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Submitted,
    Polling,
    Succeeded,
    Failed(FailureReason),
}

impl LifecycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

/// Transition out of `Polling` given the latest observation.
pub fn next_state(operation: Operation, observation: &Observation) -> LifecycleState {
    match (operation, observation) {
        (Operation::Create, Observation::Missing) => {
            LifecycleState::Failed(FailureReason::NotFound)
        }
        // A stack that can no longer be described has been deleted.
        (Operation::Delete, Observation::Missing) => LifecycleState::Succeeded,

        (Operation::Create, Observation::Status(StackStatus::CreateComplete)) => {
            LifecycleState::Succeeded
        }
        (
            Operation::Create,
            Observation::Status(
                status @ (StackStatus::CreateFailed | StackStatus::RollbackComplete),
            ),
        ) => LifecycleState::Failed(FailureReason::TerminalStatus(status.clone())),

        (Operation::Delete, Observation::Status(StackStatus::DeleteComplete)) => {
            LifecycleState::Succeeded
        }
        (Operation::Delete, Observation::Status(status @ StackStatus::DeleteFailed)) => {
            LifecycleState::Failed(FailureReason::TerminalStatus(status.clone()))
        }

        (_, Observation::Status(_)) => LifecycleState::Polling,
    }
}
