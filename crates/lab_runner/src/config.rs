//! Provider connection configuration.

use serde::{Deserialize, Serialize};

/// Region and credentials profile used to reach the provisioning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// AWS region, e.g. `eu-west-1`
    pub region: String,
    /// Named profile from the shared AWS config; default chain when unset
    pub profile: Option<String>,
}

impl ProviderConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
        }
    }

    /// Use a named profile. Blank names fall back to the default chain.
    pub fn profile(mut self, profile: Option<impl Into<String>>) -> Self {
        self.profile = profile
            .map(Into::into)
            .filter(|p: &String| !p.trim().is_empty());
        self
    }
}
