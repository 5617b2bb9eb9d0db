//! Configuration management for the dog assistant
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (`DOG_ASSISTANT__` prefix)
//! - The legacy `OPENAI_API_KEY`, `PORT` and `ALLOWED_ORIGINS` variables

pub mod constants;
pub mod settings;

pub use settings::{
    apply_env_overrides, load_settings, load_settings_from, CatalogConfig, LlmSettings, MatchingConfig,
    ObservabilityConfig, RateLimitConfig, RuntimeEnvironment, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
