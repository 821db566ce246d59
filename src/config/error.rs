//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Completion threshold must be between 1 and 100")]
    InvalidThreshold,

    #[error("Question cap must be at least 1")]
    InvalidQuestionCap,

    #[error("Top-K must be at least 1")]
    InvalidTopK,

    #[error("Category requirement weight for '{0}' must be finite and non-negative")]
    InvalidRequirementWeight(String),

    #[error("Advisory endpoint must be an http(s) URL")]
    InvalidAdvisoryEndpoint,

    #[error("Invalid advisory timeout")]
    InvalidTimeout,

    #[error("Unknown log format '{0}'")]
    InvalidLogFormat(String),
}
