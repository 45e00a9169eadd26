//! Viewer configuration: YAML file with environment overrides.

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Host configuration loaded from `viewer.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// Base URL of the pollution backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Dataset to activate on startup; first available when unset.
    #[serde(default)]
    pub dataset: Option<String>,
    /// Playback cadence in milliseconds.
    #[serde(default = "default_cadence_ms")]
    pub cadence_ms: u64,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub login: String,
    pub password: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_cadence_ms() -> u64 {
    1000
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            dataset: None,
            cadence_ms: default_cadence_ms(),
            auth: None,
        }
    }
}

impl ViewerConfig {
    /// Load from a YAML file. A missing file yields the defaults when the
    /// path was not explicitly requested.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ViewerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded viewer config");
        Ok(config)
    }

    /// Fold environment variables over the file values.
    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var("POLLUTION_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(dataset) = env::var("POLLUTION_DATASET") {
            self.dataset = Some(dataset);
        }
        if let (Ok(login), Ok(password)) =
            (env::var("POLLUTION_LOGIN"), env::var("POLLUTION_PASSWORD"))
        {
            self.auth = Some(AuthConfig { login, password });
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url must not be empty");
        }
        if self.cadence_ms == 0 {
            anyhow::bail!("cadence_ms must be > 0");
        }
        Ok(())
    }
}
