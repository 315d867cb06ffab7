//! Client configuration file
//!
//! ```toml
//! base_url = "https://abc123.live.example.com"
//! token_env = "CFGMAP_API_TOKEN"
//!
//! [endpoints]
//! alerting_profile = "/api/config/v1/alertingProfiles"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credentials::{ApiToken, Credentials};
use crate::error::{Error, Result};

/// Environment variable overriding `base_url`
pub const BASE_URL_ENV: &str = "CFGMAP_BASE_URL";

/// Collection paths used when `[endpoints]` does not name a kind
const DEFAULT_ENDPOINTS: &[(&str, &str)] = &[
    ("alerting_profile", "/api/config/v1/alertingProfiles"),
    ("host_anomaly_detection", "/api/config/v1/anomalyDetection/hosts"),
    ("metric_threshold", "/api/config/v1/anomalyDetection/metricEvents"),
    ("span_capture_rule", "/api/config/v1/spanCaptureRules"),
];

fn default_token_env() -> String {
    "CFGMAP_API_TOKEN".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root URL of the configuration API
    #[serde(default)]
    pub base_url: String,
    /// Name of the environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Collection path per entity kind
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token_env: default_token_env(),
            endpoints: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    pub fn parse(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&source)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.apply_env();
        debug!(path = %path.display(), base_url = %config.base_url, "loaded client config");
        Ok(config)
    }

    /// Load from `path` if given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let mut config = Self::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(std::env::var(BASE_URL_ENV).ok());
    }

    fn apply_overrides(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
    }

    /// Base URL, rejecting an unset one.
    pub fn require_base_url(&self) -> Result<&str> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config(format!(
                "base_url is not set; add it to the config file or set {BASE_URL_ENV}"
            )));
        }
        Ok(self.base_url.as_str())
    }

    /// Collection path for `kind`.
    pub fn endpoint(&self, kind: &str) -> Result<&str> {
        if let Some(path) = self.endpoints.get(kind) {
            return Ok(path.as_str());
        }
        DEFAULT_ENDPOINTS
            .iter()
            .find(|(name, _)| *name == kind)
            .map(|(_, path)| *path)
            .ok_or_else(|| Error::Config(format!("no endpoint configured for {kind}")))
    }

    pub fn credentials(&self) -> Arc<dyn Credentials> {
        Arc::new(ApiToken::from_env(&self.token_env))
    }
}
