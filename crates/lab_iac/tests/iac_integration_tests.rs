//! Integration tests for deploy requests, parameters and stack lifecycle.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use lab_iac::{
    DeployRequest, DeployRequestBuilder, IacError, Operation, ParameterBuilder, PollConfig,
    StackOrchestrator, StatusEvent,
};
use lab_runner::{Capability, MockDescribe, MockProvisioner, RunnerError, StackStatus};

fn some(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn existing_network(name: &str) -> DeployRequestBuilder {
    DeployRequest::builder("eu-west-1", name, "single.yaml")
        .existing_network(some("subnet-0a1b"), some("vpc-0c2d"))
}

fn fast_orchestrator(provisioner: &MockProvisioner) -> StackOrchestrator {
    StackOrchestrator::new(Arc::new(provisioner.clone()))
        .with_poll_config(PollConfig::default().interval(Duration::ZERO))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Test that an existing network requires both subnet and VPC ids.
#[test]
fn test_existing_network_requires_ids() {
    for (subnet, vpc) in [(None, None), (some("subnet-1"), None), (None, some("vpc-1"))] {
        let result = DeployRequest::builder("eu-west-1", "demo", "single.yaml")
            .existing_network(subnet, vpc)
            .build();
        assert!(matches!(result, Err(IacError::Validation(msg)) if msg.contains("subnet-id")));
    }
}

/// Test that creating a network requires the SSH tunnel credentials.
#[test]
fn test_create_network_requires_ssh_tunnel() {
    let result = DeployRequest::builder("eu-west-1", "demo", "single.yaml")
        .create_network(true)
        .build();
    assert!(matches!(result, Err(IacError::Validation(msg)) if msg.contains("ssh-tunnel-user")));
}

/// Test that exactly one of SSH user/password fails validation.
#[test]
fn test_ssh_tunnel_pairing() {
    for (user, password) in [(some("u"), None), (None, some("p"))] {
        let result = existing_network("demo").ssh_tunnel(user, password).build();
        assert!(matches!(
            result,
            Err(IacError::Validation(msg)) if msg.contains("SSH tunnel user and password")
        ));
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Scenario: created network with SSH tunnel credentials.
#[test]
fn test_create_network_parameters() {
    let request = DeployRequest::builder("eu-west-1", "demo", "single.yaml")
        .create_network(true)
        .ssh_tunnel(some("u"), some("p"))
        .build()
        .unwrap();

    let params = ParameterBuilder::new(&request).build().unwrap();

    assert_eq!(params.get("Name"), Some("demo"));
    assert_eq!(params.get("CreateNetwork"), Some("true"));
    assert_eq!(params.get("SshTunnelUser"), Some("u"));
    assert_eq!(params.get("SshTunnelPassword"), Some("p"));
    assert!(!params.contains("ExistingSubnetId"));
    assert!(!params.contains("ExistingVpcId"));
}

/// Scenario: generated database password is 12 random bytes.
#[test]
fn test_generated_database_password() {
    let request = existing_network("demo").build().unwrap();

    let first = ParameterBuilder::new(&request).build().unwrap();
    let second = ParameterBuilder::new(&request).build().unwrap();

    let password = first.get("DatabasePassword").unwrap();
    assert_eq!(STANDARD.decode(password).unwrap().len(), 12);
    assert_ne!(Some(password), second.get("DatabasePassword"));
}

/// Test that N private IPs produce N indexed parameters in input order.
#[test]
fn test_private_ip_parameters() {
    let ips = strings(&["10.0.1.10", "10.0.1.11", "10.0.1.12"]);
    let request = existing_network("demo")
        .private_ip_addresses(ips.clone())
        .build()
        .unwrap();

    let params = ParameterBuilder::new(&request).build().unwrap();

    let indexed: Vec<&str> = params
        .keys()
        .filter(|k| k.starts_with("PrivateIpAddress"))
        .collect();
    assert_eq!(
        indexed,
        vec!["PrivateIpAddress1", "PrivateIpAddress2", "PrivateIpAddress3"]
    );
    for (i, ip) in ips.iter().enumerate() {
        assert_eq!(params.get(&format!("PrivateIpAddress{}", i + 1)), Some(ip.as_str()));
    }
}

/// Test tag parameters and malformed tags.
#[test]
fn test_tag_parameters() {
    let request = existing_network("demo")
        .tags(strings(&["a=b", "team=data"]))
        .build()
        .unwrap();
    let params = ParameterBuilder::new(&request).build().unwrap();

    assert_eq!(params.get("TagKey1"), Some("a"));
    assert_eq!(params.get("TagValue1"), Some("b"));
    assert_eq!(params.get("TagKey2"), Some("team"));
    assert_eq!(params.get("TagValue2"), Some("data"));

    let request = existing_network("demo")
        .tags(strings(&["a=b", "missing-separator"]))
        .build()
        .unwrap();
    let result = ParameterBuilder::new(&request).build();
    assert!(matches!(
        result,
        Err(IacError::MalformedTag { tag, .. }) if tag == "missing-separator"
    ));
}

/// Test the full conditional ordering of optional parameters.
#[test]
fn test_full_parameter_order() {
    let request = existing_network("demo")
        .ssh_tunnel(some("tunnel"), some("pw"))
        .private_ip_addresses(strings(&["10.0.0.5"]))
        .key_pair_name(some("lab-key"))
        .ebs_volume_ids(strings(&["vol-1", "vol-2"]))
        .efs_volume_ids(strings(&["fs-1"]))
        .create_vault(true)
        .tags(strings(&["env=dev"]))
        .image_repository(some("registry-user"), some("registry-pw"))
        .database_password(some("db-pw"))
        .build()
        .unwrap();

    let params = ParameterBuilder::new(&request).build().unwrap();

    assert_eq!(
        params.keys().collect::<Vec<_>>(),
        vec![
            "Name",
            "CreateNetwork",
            "KestraInstanceType",
            "KestraImage",
            "JavaXmx",
            "Timezone",
            "DatabaseUser",
            "DatabasePassword",
            "ExistingSubnetId",
            "ExistingVpcId",
            "SshTunnelUser",
            "SshTunnelPassword",
            "PrivateIpAddress1",
            "KeyPairName",
            "EbsVolumeId1",
            "EbsVolumeId2",
            "EfsVolumeId1",
            "VaultToken",
            "TagKey1",
            "TagValue1",
            "KestraImageRepositoryUser",
            "KestraImageRepositoryPassword",
        ]
    );
    assert_eq!(params.get("ExistingSubnetId"), Some("subnet-0a1b"));
    assert_eq!(params.get("KestraImageRepositoryUser"), Some("registry-user"));
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Scenario: create succeeds after three polls.
#[tokio::test]
async fn test_create_polls_until_complete() {
    let provisioner = MockProvisioner::new().with_statuses([
        "CREATE_IN_PROGRESS",
        "CREATE_IN_PROGRESS",
        "CREATE_COMPLETE",
    ]);
    let request = existing_network("demo").build().unwrap();
    let params = ParameterBuilder::new(&request).build().unwrap();

    let report = fast_orchestrator(&provisioner)
        .create("demo", "Resources: {}", &params)
        .await
        .unwrap();

    assert_eq!(report.operation, Operation::Create);
    assert_eq!(report.polls, 3);
    assert_eq!(report.final_status, Some(StackStatus::CreateComplete));
    assert_eq!(report.events.len(), 3);
    assert_eq!(provisioner.describe_count(), 3);

    let calls = provisioner.get_method_calls("submit_create");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].capabilities, Some(vec![Capability::NamedIam]));
    assert_eq!(calls[0].parameters.as_deref(), Some(params.as_slice()));
}

/// Scenario: CREATE_FAILED ends the create on first observation.
#[tokio::test]
async fn test_create_failed_status() {
    let provisioner = MockProvisioner::new().with_statuses(["CREATE_FAILED"]);

    let err = fast_orchestrator(&provisioner)
        .create("demo", "Resources: {}", &Default::default())
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("stack creation failed"));
    assert!(matches!(
        err,
        IacError::OperationFailed { operation: Operation::Create, .. }
    ));
    assert_eq!(provisioner.describe_count(), 1);
}

/// Test that ROLLBACK_COMPLETE is a create failure.
#[tokio::test]
async fn test_create_rolled_back() {
    let provisioner = MockProvisioner::new().with_statuses([
        "CREATE_IN_PROGRESS",
        "ROLLBACK_IN_PROGRESS",
        "ROLLBACK_COMPLETE",
    ]);

    let err = fast_orchestrator(&provisioner)
        .create("demo", "Resources: {}", &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::OperationFailed { status, .. } if status == "ROLLBACK_COMPLETE"));
}

/// Test that a rejected submission is fatal and nothing is polled.
#[tokio::test]
async fn test_create_submit_failure() {
    let provisioner = MockProvisioner::new().simulate_submit_failure("AlreadyExistsException");

    let err = fast_orchestrator(&provisioner)
        .create("demo", "Resources: {}", &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::Runner(RunnerError::SubmitFailed { .. })));
    assert_eq!(provisioner.describe_count(), 0);
}

/// Test that query errors during create propagate.
#[tokio::test]
async fn test_create_describe_error_is_fatal() {
    let provisioner = MockProvisioner::new()
        .add_describe(MockDescribe::status("CREATE_IN_PROGRESS"))
        .add_describe(MockDescribe::Error("Throttling".into()));

    let err = fast_orchestrator(&provisioner)
        .create("demo", "Resources: {}", &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::Runner(RunnerError::DescribeFailed { .. })));
}

/// Test that a stack which stops being describable during delete is gone.
#[tokio::test]
async fn test_delete_not_found_is_success() {
    let provisioner = MockProvisioner::new()
        .add_describe(MockDescribe::status("DELETE_IN_PROGRESS"))
        .add_describe(MockDescribe::status("DELETE_IN_PROGRESS"))
        .add_describe(MockDescribe::NotFound);

    let report = fast_orchestrator(&provisioner).delete("demo").await.unwrap();

    assert_eq!(report.operation, Operation::Delete);
    assert_eq!(report.polls, 3);
    assert_eq!(report.final_status, None);
    assert_eq!(report.events.len(), 2);
    assert_eq!(provisioner.get_method_calls("submit_delete").len(), 1);
}

/// Test DELETE_COMPLETE and DELETE_FAILED.
#[tokio::test]
async fn test_delete_terminal_statuses() {
    let provisioner = MockProvisioner::new().with_statuses(["DELETE_IN_PROGRESS", "DELETE_COMPLETE"]);
    let report = fast_orchestrator(&provisioner).delete("demo").await.unwrap();
    assert_eq!(report.final_status, Some(StackStatus::DeleteComplete));

    let provisioner = MockProvisioner::new().with_statuses(["DELETE_FAILED"]);
    let err = fast_orchestrator(&provisioner).delete("demo").await.unwrap_err();
    assert!(err.to_string().starts_with("stack delete failed"));
}

/// Test that unrelated query errors during delete still propagate.
#[tokio::test]
async fn test_delete_describe_error_is_fatal() {
    let provisioner = MockProvisioner::new().add_describe(MockDescribe::Error("AccessDenied".into()));

    let err = fast_orchestrator(&provisioner).delete("demo").await.unwrap_err();

    assert!(matches!(err, IacError::Runner(RunnerError::DescribeFailed { .. })));
}

/// Test that the status handler sees every observed status in order.
#[tokio::test]
async fn test_status_handler_receives_events() {
    let provisioner = MockProvisioner::new().with_statuses(["CREATE_IN_PROGRESS", "CREATE_COMPLETE"]);
    let seen: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    fast_orchestrator(&provisioner)
        .on_status(Arc::new(move |event: &StatusEvent| {
            sink.lock().push((event.poll, event.status.to_string()));
        }))
        .create("demo", "Resources: {}", &Default::default())
        .await
        .unwrap();

    assert_eq!(
        *seen.lock(),
        vec![
            (1, "CREATE_IN_PROGRESS".to_string()),
            (2, "CREATE_COMPLETE".to_string()),
        ]
    );
}

/// Test that a cancelled token stops the wait before the first poll.
#[tokio::test]
async fn test_cancellation_before_poll() {
    let provisioner = MockProvisioner::new().with_statuses(["CREATE_IN_PROGRESS"]);
    let token = CancellationToken::new();
    token.cancel();

    let err = fast_orchestrator(&provisioner)
        .with_cancellation(token)
        .create("demo", "Resources: {}", &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::Cancelled(name) if name == "demo"));
    assert_eq!(provisioner.get_method_calls("submit_create").len(), 1);
    assert_eq!(provisioner.describe_count(), 0);
}

/// Test that cancelling between polls stops the wait without another query.
#[tokio::test]
async fn test_cancellation_between_polls() {
    let provisioner = MockProvisioner::new().with_statuses(["CREATE_IN_PROGRESS"]);
    let token = CancellationToken::new();
    let canceller = token.clone();
    let watched = provisioner.clone();

    tokio::spawn(async move {
        while watched.describe_count() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        canceller.cancel();
    });

    let err = StackOrchestrator::new(Arc::new(provisioner.clone()))
        .with_poll_config(PollConfig::default().interval(Duration::from_millis(200)))
        .with_cancellation(token)
        .create("demo", "Resources: {}", &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::Cancelled(name) if name == "demo"));
    assert_eq!(provisioner.describe_count(), 1);
}

/// Test that a deadline equal to the interval still observes the stack.
#[tokio::test]
async fn test_max_wait_equal_to_interval_polls_once() {
    let provisioner = MockProvisioner::new().with_statuses(["CREATE_COMPLETE"]);

    let report = StackOrchestrator::new(Arc::new(provisioner.clone()))
        .with_poll_config(
            PollConfig::default()
                .interval(Duration::from_millis(50))
                .max_wait(Some(Duration::from_millis(50))),
        )
        .create("demo", "Resources: {}", &Default::default())
        .await
        .unwrap();

    assert_eq!(report.polls, 1);
    assert_eq!(report.final_status, Some(StackStatus::CreateComplete));
}

/// Test that max_wait bounds a stack that never settles.
#[tokio::test]
async fn test_max_wait_times_out() {
    let provisioner = MockProvisioner::new().with_statuses(["CREATE_IN_PROGRESS"]);

    let err = StackOrchestrator::new(Arc::new(provisioner.clone()))
        .with_poll_config(
            PollConfig::default()
                .interval(Duration::from_millis(5))
                .max_wait(Some(Duration::from_millis(40))),
        )
        .create("demo", "Resources: {}", &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err, IacError::Timeout { .. }));
    assert!(provisioner.describe_count() >= 1);
}
