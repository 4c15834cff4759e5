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
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid content service URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Request timeout must be between 1 and 600 seconds")]
    InvalidTimeout,

    #[error("Page size must be between 1 and 100")]
    InvalidPageSize,

    #[error("Invalid source id: {0}")]
    InvalidSourceId(String),

    #[error("Invalid file extension: {0}")]
    InvalidFileExtension(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
