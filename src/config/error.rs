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
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid payment API key format")]
    InvalidPaymentKey,

    #[error("Invalid webhook signing secret format")]
    InvalidWebhookSecret,

    #[error("No eligibility target configured (label, product id, or price id)")]
    NoEligibilityTarget,

    #[error("Invalid directory base URL format")]
    InvalidDirectoryUrl,
}
