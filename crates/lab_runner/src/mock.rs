//! Mock stack provisioner for testing.
//!
//! Provides a scriptable implementation of the StackProvisioner trait for use
//! in tests without reaching the provisioning service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::error::{RunnerError, RunnerResult};
use crate::provisioner::{
    Capability, CreateStackInput, Parameter, StackDescription, StackHandle, StackProvisioner,
};
use crate::status::StackStatus;

/// Scripted answer for one describe_stack call.
#[derive(Debug, Clone)]
pub enum MockDescribe {
    /// The stack exists with this status.
    Status(StackStatus),
    /// The provider returns an empty stack list.
    Empty,
    /// The provider rejects the query because the stack does not exist.
    NotFound,
    /// The query itself fails.
    Error(String),
}

impl MockDescribe {
    pub fn status(status: impl Into<StackStatus>) -> Self {
        Self::Status(status.into())
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub method: String,
    pub stack_name: String,
    pub template_body: Option<String>,
    pub parameters: Option<Vec<Parameter>>,
    pub capabilities: Option<Vec<Capability>>,
}

impl CapturedCall {
    fn named(method: &str, stack_name: &str) -> Self {
        Self {
            method: method.to_string(),
            stack_name: stack_name.to_string(),
            template_body: None,
            parameters: None,
            capabilities: None,
        }
    }
}

/// Mock stack provisioner for testing.
///
/// Describe calls replay the scripted responses in order; once the script is
/// exhausted the last response repeats.
#[derive(Clone)]
pub struct MockProvisioner {
    /// Scripted describe responses.
    describes: Arc<RwLock<Vec<MockDescribe>>>,
    /// Index of next describe response to return.
    describe_index: Arc<AtomicUsize>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Simulated submission failure.
    submit_failure: Arc<RwLock<Option<String>>>,
}

impl Default for MockProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvisioner {
    /// Create a new mock provisioner.
    pub fn new() -> Self {
        Self {
            describes: Arc::new(RwLock::new(Vec::new())),
            describe_index: Arc::new(AtomicUsize::new(0)),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
            submit_failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Append a describe response.
    pub fn add_describe(self, response: MockDescribe) -> Self {
        self.describes.write().push(response);
        self
    }

    /// Script a status sequence.
    pub fn with_statuses<S: Into<StackStatus>>(self, statuses: impl IntoIterator<Item = S>) -> Self {
        *self.describes.write() = statuses
            .into_iter()
            .map(|s| MockDescribe::Status(s.into()))
            .collect();
        self
    }

    /// Make submit_create and submit_delete fail.
    pub fn simulate_submit_failure(self, message: impl Into<String>) -> Self {
        *self.submit_failure.write() = Some(message.into());
        self
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get calls to a specific method.
    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Number of describe_stack calls made.
    pub fn describe_count(&self) -> usize {
        self.get_method_calls("describe_stack").len()
    }

    fn record_call(&self, call: CapturedCall) {
        self.captured_calls.write().push(call);
    }

    fn next_describe(&self) -> MockDescribe {
        let describes = self.describes.read();
        let index = self.describe_index.fetch_add(1, Ordering::SeqCst);
        describes
            .get(index)
            .or_else(|| describes.last())
            .cloned()
            .unwrap_or(MockDescribe::Empty)
    }

    fn check_submit_failure(&self, stack_name: &str) -> RunnerResult<()> {
        if let Some(message) = self.submit_failure.read().clone() {
            return Err(RunnerError::SubmitFailed {
                stack: stack_name.to_string(),
                message,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StackProvisioner for MockProvisioner {
    async fn submit_create(&self, input: &CreateStackInput) -> RunnerResult<StackHandle> {
        self.record_call(CapturedCall {
            template_body: Some(input.template_body.clone()),
            parameters: Some(input.parameters.clone()),
            capabilities: Some(input.capabilities.clone()),
            ..CapturedCall::named("submit_create", &input.stack_name)
        });
        self.check_submit_failure(&input.stack_name)?;

        Ok(StackHandle {
            stack_id: format!("mock-{}", uuid::Uuid::new_v4()),
            submitted_at: Utc::now(),
        })
    }

    async fn submit_delete(&self, stack_name: &str) -> RunnerResult<()> {
        self.record_call(CapturedCall::named("submit_delete", stack_name));
        self.check_submit_failure(stack_name)
    }

    async fn describe_stack(&self, stack_name: &str) -> RunnerResult<Option<StackDescription>> {
        self.record_call(CapturedCall::named("describe_stack", stack_name));

        match self.next_describe() {
            MockDescribe::Status(status) => Ok(Some(StackDescription {
                stack_name: stack_name.to_string(),
                stack_id: None,
                status,
                status_reason: None,
            })),
            MockDescribe::Empty => Ok(None),
            MockDescribe::NotFound => Err(RunnerError::StackNotFound(stack_name.to_string())),
            MockDescribe::Error(message) => Err(RunnerError::DescribeFailed {
                stack: stack_name.to_string(),
                message,
            }),
        }
    }
}
