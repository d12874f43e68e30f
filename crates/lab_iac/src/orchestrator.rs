//! Stack lifecycle orchestration.
//!
//! Submits a create or delete request, then polls the stack status at a fixed
//! interval until the lifecycle state machine reaches a terminal state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lab_runner::{Capability, CreateStackInput, StackProvisioner, StackStatus};

use crate::error::{IacError, IacResult};
use crate::lifecycle::{next_state, FailureReason, LifecycleState, Observation, Operation};
use crate::params::ParameterSet;

/// Interval between status queries when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Polling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Sleep before every status query
    pub interval: Duration,
    /// Give up after this long (None = wait for a terminal status forever)
    pub max_wait: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
        }
    }
}

impl PollConfig {
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }
}

/// One observed stack status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub operation: Operation,
    pub stack_name: String,
    pub status: StackStatus,
    pub status_reason: Option<String>,
    /// 1-based index of the poll that observed this status
    pub poll: usize,
    pub observed_at: DateTime<Utc>,
}

/// Status callback type.
pub type StatusHandler = Arc<dyn Fn(&StatusEvent) + Send + Sync>;

/// Summary of a stack operation that reached terminal success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleReport {
    pub operation: Operation,
    pub stack_name: String,
    pub stack_id: Option<String>,
    pub state: LifecycleState,
    /// Last observed status; None when a delete ended with the stack gone
    pub final_status: Option<StackStatus>,
    pub polls: usize,
    pub events: Vec<StatusEvent>,
    pub elapsed: Duration,
}

/// Drives create and delete operations to a terminal status.
pub struct StackOrchestrator {
    provisioner: Arc<dyn StackProvisioner>,
    poll: PollConfig,
    cancel: CancellationToken,
    status_handler: Option<StatusHandler>,
}

impl StackOrchestrator {
    pub fn new(provisioner: Arc<dyn StackProvisioner>) -> Self {
        Self {
            provisioner,
            poll: PollConfig::default(),
            cancel: CancellationToken::new(),
            status_handler: None,
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Stop waiting as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Receive every observed status.
    pub fn on_status(mut self, handler: StatusHandler) -> Self {
        self.status_handler = Some(handler);
        self
    }

    /// Submit a create request and wait for `CREATE_COMPLETE`.
    ///
    /// The request acknowledges `CAPABILITY_NAMED_IAM` since the deployment
    /// templates define named IAM resources.
    pub async fn create(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &ParameterSet,
    ) -> IacResult<LifecycleReport> {
        let input = CreateStackInput::new(stack_name, template_body)
            .parameters(parameters.as_slice().to_vec())
            .capability(Capability::NamedIam);

        info!(
            "Submitting create for stack {} ({} parameters)",
            stack_name,
            parameters.len()
        );
        let handle = self.provisioner.submit_create(&input).await?;
        debug!("Stack {} submitted as {}", stack_name, handle.stack_id);

        self.wait(Operation::Create, stack_name, Some(handle.stack_id))
            .await
    }

    /// Submit a delete request and wait until the stack is gone.
    pub async fn delete(&self, stack_name: &str) -> IacResult<LifecycleReport> {
        info!("Submitting delete for stack {}", stack_name);
        self.provisioner.submit_delete(stack_name).await?;

        self.wait(Operation::Delete, stack_name, None).await
    }

    async fn wait(
        &self,
        operation: Operation,
        stack_name: &str,
        stack_id: Option<String>,
    ) -> IacResult<LifecycleReport> {
        let started = Instant::now();
        let deadline = self.poll.max_wait.map(|max_wait| started + max_wait);
        let mut events: Vec<StatusEvent> = Vec::new();
        let mut polls = 0;

        loop {
            // The last sleep is cut short so the deadline itself gets a poll.
            let pause = match deadline {
                Some(deadline) => self
                    .poll
                    .interval
                    .min(deadline.saturating_duration_since(Instant::now())),
                None => self.poll.interval,
            };

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!("Cancelled {} of stack {} after {} polls", operation, stack_name, polls);
                    return Err(IacError::Cancelled(stack_name.to_string()));
                }
                _ = tokio::time::sleep(pause) => {}
            }

            if polls == 0 {
                debug!("Stack {} {}: submitted -> polling", stack_name, operation);
            }
            polls += 1;

            let observation = match self.provisioner.describe_stack(stack_name).await {
                Ok(Some(description)) => {
                    let event = StatusEvent {
                        operation,
                        stack_name: stack_name.to_string(),
                        status: description.status.clone(),
                        status_reason: description.status_reason,
                        poll: polls,
                        observed_at: Utc::now(),
                    };
                    debug!("Stack {} status: {}", stack_name, event.status);
                    if let Some(handler) = &self.status_handler {
                        handler(&event);
                    }
                    events.push(event);
                    Observation::Status(description.status)
                }
                Ok(None) => Observation::Missing,
                Err(e) if operation == Operation::Delete && e.is_not_found() => {
                    info!("Stack {} no longer exists", stack_name);
                    Observation::Missing
                }
                Err(e) => return Err(e.into()),
            };

            match next_state(operation, &observation) {
                LifecycleState::Succeeded => {
                    info!(
                        "Stack {} {} complete after {} polls",
                        stack_name, operation, polls
                    );
                    return Ok(LifecycleReport {
                        operation,
                        stack_name: stack_name.to_string(),
                        stack_id,
                        final_status: match observation {
                            Observation::Status(status) => Some(status),
                            Observation::Missing => None,
                        },
                        state: LifecycleState::Succeeded,
                        polls,
                        events,
                        elapsed: started.elapsed(),
                    });
                }
                LifecycleState::Failed(FailureReason::NotFound) => {
                    return Err(IacError::StackNotFound(stack_name.to_string()));
                }
                LifecycleState::Failed(FailureReason::TerminalStatus(status)) => {
                    return Err(IacError::OperationFailed {
                        operation,
                        status: status.to_string(),
                        reason: events.last().and_then(|e| e.status_reason.clone()),
                    });
                }
                LifecycleState::Submitted | LifecycleState::Polling => {}
            }

            if let (Some(deadline), Some(max_wait)) = (deadline, self.poll.max_wait) {
                if Instant::now() >= deadline {
                    warn!(
                        "Stack {} still not settled after {:?} ({} polls)",
                        stack_name, max_wait, polls
                    );
                    return Err(IacError::Timeout {
                        stack: stack_name.to_string(),
                        waited: max_wait,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_runner::MockProvisioner;

    fn fast() -> PollConfig {
        PollConfig::default().interval(Duration::ZERO)
    }

    #[test]
    fn test_default_poll_config() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_secs(3));
        assert_eq!(config.max_wait, None);
    }

    #[tokio::test]
    async fn test_delete_with_empty_stack_list_succeeds() {
        let provisioner = Arc::new(MockProvisioner::new());
        let orchestrator = StackOrchestrator::new(provisioner.clone()).with_poll_config(fast());

        let report = orchestrator.delete("demo").await.unwrap();
        assert_eq!(report.polls, 1);
        assert_eq!(report.final_status, None);
        assert_eq!(report.state, LifecycleState::Succeeded);
    }

    #[tokio::test]
    async fn test_deadline_equal_to_interval_still_polls() {
        let provisioner = Arc::new(MockProvisioner::new().with_statuses(["CREATE_COMPLETE"]));
        let orchestrator = StackOrchestrator::new(provisioner.clone()).with_poll_config(
            PollConfig::default()
                .interval(Duration::from_millis(50))
                .max_wait(Some(Duration::from_millis(50))),
        );

        let report = orchestrator
            .create("demo", "Resources: {}", &ParameterSet::new())
            .await
            .unwrap();
        assert_eq!(report.final_status, Some(StackStatus::CreateComplete));
        assert_eq!(provisioner.describe_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout_reports_sub_second_deadline() {
        let provisioner = Arc::new(MockProvisioner::new().with_statuses(["CREATE_IN_PROGRESS"]));
        let orchestrator = StackOrchestrator::new(provisioner.clone()).with_poll_config(
            PollConfig::default()
                .interval(Duration::from_millis(20))
                .max_wait(Some(Duration::from_millis(50))),
        );

        let err = orchestrator
            .create("demo", "Resources: {}", &ParameterSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, IacError::Timeout { waited, .. } if waited == Duration::from_millis(50)));
        assert_eq!(err.to_string(), "Timed out after 50ms waiting for stack demo");
        assert!(provisioner.describe_count() >= 1);
    }

    #[tokio::test]
    async fn test_create_with_empty_stack_list_fails() {
        let provisioner = Arc::new(MockProvisioner::new());
        let orchestrator = StackOrchestrator::new(provisioner).with_poll_config(fast());

        let err = orchestrator
            .create("demo", "Resources: {}", &ParameterSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, IacError::StackNotFound(name) if name == "demo"));
    }
}
