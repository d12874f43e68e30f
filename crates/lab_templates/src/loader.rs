//! Template asset loading.
//!
//! Assets live next to the executable by default:
//!
//! ```text
//! <root>/template/<name>   CloudFormation template bodies
//! <root>/config/<name>     Kestra configuration fragments
//! <root>/init/<name>       Kestra init script fragments
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{TemplateError, TemplateResult};
use crate::renderer::{
    PlaceholderRenderer, KESTRA_CONFIGURATION_PLACEHOLDER, KESTRA_INIT_SCRIPT_PLACEHOLDER,
};

/// Kind of asset, which selects the sub-directory it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Template,
    Config,
    InitScript,
}

impl AssetKind {
    /// Directory name under the asset root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Config => "config",
            Self::InitScript => "init",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Read-only template store keyed by asset kind and file name.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    /// Create a loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a loader rooted at the directory containing the running executable.
    pub fn from_executable_dir() -> TemplateResult<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| TemplateError::AssetRoot(format!("current executable: {}", e)))?;
        let dir = exe.parent().ok_or_else(|| {
            TemplateError::AssetRoot(format!("executable has no parent directory: {:?}", exe))
        })?;
        Ok(Self::new(dir))
    }

    /// Asset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path an asset would be read from.
    pub fn path_of(&self, kind: AssetKind, name: &str) -> PathBuf {
        self.root.join(kind.dir_name()).join(name)
    }

    /// Load an asset body as UTF-8 text.
    pub fn load(&self, kind: AssetKind, name: &str) -> TemplateResult<String> {
        let path = self.path_of(kind, name);
        debug!("Loading {} asset from {:?}", kind, path);

        fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => TemplateError::NotFound(path),
            _ => TemplateError::Read { path, source },
        })
    }
}

/// A template body with the Kestra configuration and init script embedded.
#[derive(Debug, Clone)]
pub struct DeploymentTemplate {
    body: String,
}

impl DeploymentTemplate {
    /// Load the template and both fragments, then materialize the placeholders.
    pub fn prepare(
        loader: &AssetLoader,
        template_file: &str,
        config_file: &str,
        init_script: &str,
    ) -> TemplateResult<Self> {
        let template = loader.load(AssetKind::Template, template_file)?;
        let config = loader.load(AssetKind::Config, config_file)?;
        let init = loader.load(AssetKind::InitScript, init_script)?;

        let body = PlaceholderRenderer::new().materialize(
            &template,
            [
                (KESTRA_CONFIGURATION_PLACEHOLDER, config.as_str()),
                (KESTRA_INIT_SCRIPT_PLACEHOLDER, init.as_str()),
            ],
        );

        info!(
            "Prepared template {} ({} bytes) with config {} and init script {}",
            template_file,
            body.len(),
            config_file,
            init_script
        );

        Ok(Self { body })
    }

    /// Materialized template body.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}
