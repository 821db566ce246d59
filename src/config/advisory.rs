//! Remote advisory configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Remote next-question advisor configuration
///
/// When disabled, the deterministic local selector is the only advisor.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryConfig {
    /// Consult the remote advisor
    #[serde(default)]
    pub enabled: bool,

    /// Recommendation endpoint URL
    pub endpoint: Option<String>,

    /// Bearer token for the advisory service
    pub api_key: Option<String>,

    /// Time budget per recommendation in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl AdvisoryConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate advisory configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }

        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(ValidationError::MissingRequired("ADVISORY__ENDPOINT"))?;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ValidationError::InvalidAdvisoryEndpoint);
        }
        if self.timeout_ms == 0 || self.timeout_ms > 30_000 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            api_key: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}
