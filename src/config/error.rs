//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading or lookup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Missing configuration value {key}, expected {expected}")]
    MissingKey { key: String, expected: &'static str },

    #[error("Invalid configuration value {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Unknown policy {0}")]
    UnknownPolicy(String),
}

impl ConfigError {
    pub fn missing_key(key: impl Into<String>, expected: &'static str) -> Self {
        ConfigError::MissingKey {
            key: key.into(),
            expected,
        }
    }

    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Command label must be a single non-empty word")]
    InvalidCommandLabel,

    #[error("Command channel capacity must be between 1 and {}", super::command::MAX_CAPACITY)]
    InvalidCapacity,

    #[error("Unknown no-methods policy '{0}', expected 'kick' or 'stay'")]
    UnknownNoMethodsPolicy(String),

    #[error("Secret length for {0} must be greater than zero")]
    InvalidSecretLength(&'static str),

    #[error("Method name cannot be empty")]
    EmptyMethodName,

    #[error("Method '{0}' is configured more than once")]
    DuplicateMethod(String),

    #[error("Method '{0}' has no kind")]
    MissingMethodKind(String),
}
