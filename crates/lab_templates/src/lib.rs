//! # lab_templates
//!
//! Template loading and placeholder materialization for kestra-aws-lab.
//!
//! A deployment template is a CloudFormation body containing two placeholder
//! slots. The Kestra configuration fragment and the init script fragment are
//! embedded into those slots, re-indented to the column of the placeholder.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lab_templates::{AssetLoader, DeploymentTemplate};
//!
//! let loader = AssetLoader::from_executable_dir().unwrap();
//! let template = DeploymentTemplate::prepare(&loader, "single.yaml", "default.yaml", "default.sh").unwrap();
//! println!("{}", template.body());
//! ```

pub mod error;
pub mod loader;
pub mod renderer;

pub use error::{TemplateError, TemplateResult};
pub use loader::{AssetKind, AssetLoader, DeploymentTemplate};
pub use renderer::{
    replace_placeholder, PlaceholderRenderer, KESTRA_CONFIGURATION_PLACEHOLDER,
    KESTRA_INIT_SCRIPT_PLACEHOLDER,
};
