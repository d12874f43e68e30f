//! # lab_iac
//!
//! Deploy requests, stack parameters and stack lifecycle orchestration for
//! kestra-aws-lab.
//!
//! ## Features
//!
//! - Validated deploy requests with the tool's defaults
//! - Ordered CloudFormation parameter sets with generated secrets
//! - An explicit create/delete lifecycle state machine
//! - A polling orchestrator with configurable interval, deadline and cancellation
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lab_iac::{DeployRequest, ParameterBuilder, StackOrchestrator};
//! use lab_runner::{CloudFormationProvisioner, ProviderConfig};
//!
//! # async fn run(template_body: String) -> Result<(), Box<dyn std::error::Error>> {
//! let request = DeployRequest::builder("eu-west-1", "kestra-dev", "single.yaml")
//!     .create_network(true)
//!     .ssh_tunnel(Some("tunnel".into()), Some("s3cret".into()))
//!     .build()?;
//! let params = ParameterBuilder::new(&request).build()?;
//!
//! let provisioner = CloudFormationProvisioner::connect(&ProviderConfig::new(&request.region)).await;
//! let orchestrator = StackOrchestrator::new(Arc::new(provisioner));
//! orchestrator.create(&request.name, &template_body, &params).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod params;
pub mod request;
pub mod secrets;
pub mod tags;

pub use error::{IacError, IacResult};
pub use lifecycle::{next_state, FailureReason, LifecycleState, Observation, Operation};
pub use orchestrator::{
    LifecycleReport, PollConfig, StackOrchestrator, StatusEvent, StatusHandler,
    DEFAULT_POLL_INTERVAL,
};
pub use params::{names, ParameterBuilder, ParameterSet};
pub use request::{Credentials, Defaults, DeployRequest, DeployRequestBuilder};
pub use secrets::{generate_secret, random_base64, SECRET_BYTES};
pub use tags::Tag;
