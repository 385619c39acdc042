//! Error types for loading and configuring the specification registry
//!
//! Resolution, schema generation and validation are total and never
//! produce these; lookups report misses as `Option`.

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, SpecError>;

/// Registry errors
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Duplicate {kind} reference: {reference}")]
    DuplicateReference { kind: &'static str, reference: String },

    #[error("Application type not found: {0}")]
    ApplicationTypeNotFound(String),

    #[error("Unsupported record bundle format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
