//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CLINICAL_ASSESSMENT` prefix and nested values use double underscores as separators.
//!
//! Every section has defaults, so an empty environment yields a working
//! configuration with the built-in catalog and the local advisor only.
//!
//! # Example
//!
//! ```no_run
//! use clinical_assessment::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Completion threshold: {}%", config.engine.completion_threshold);
//! ```

mod advisory;
mod engine;
mod error;
mod features;
mod knowledge;
mod logging;

pub use advisory::AdvisoryConfig;
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use knowledge::KnowledgeConfig;
pub use logging::{LogFormat, LoggingConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Engine tunables (threshold, question cap, top-K, requirements)
    #[serde(default)]
    pub engine: EngineConfig,

    /// Remote advisory service
    #[serde(default)]
    pub advisory: AdvisoryConfig,

    /// Catalog source
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CLINICAL_ASSESSMENT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CLINICAL_ASSESSMENT__ENGINE__TOP_K=5` -> `engine.top_k = 5`
    /// - `CLINICAL_ASSESSMENT__ADVISORY__ENDPOINT=...` -> `advisory.endpoint = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CLINICAL_ASSESSMENT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.advisory.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
