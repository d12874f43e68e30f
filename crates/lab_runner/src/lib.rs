//! # lab_runner
//!
//! Stack provisioning wrapper for kestra-aws-lab.
//!
//! This crate is the seam between the tool and the remote provisioning
//! service: a `StackProvisioner` trait with a CloudFormation implementation
//! and a scriptable mock.
//!
//! # Example
//!
//! ```rust,no_run
//! use lab_runner::{CloudFormationProvisioner, ProviderConfig, StackProvisioner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProviderConfig::new("eu-west-1").profile(Some("lab"));
//!     let provisioner = CloudFormationProvisioner::connect(&config).await;
//!
//!     if let Some(stack) = provisioner.describe_stack("kestra-dev").await? {
//!         println!("{}: {}", stack.stack_name, stack.status);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cloudformation;
pub mod config;
pub mod error;
pub mod mock;
pub mod provisioner;
pub mod status;

pub use cloudformation::CloudFormationProvisioner;
pub use config::ProviderConfig;
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockDescribe, MockProvisioner};
pub use provisioner::{
    Capability, CreateStackInput, Parameter, StackDescription, StackHandle, StackProvisioner,
};
pub use status::StackStatus;
