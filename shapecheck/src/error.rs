//! Error types for shapecheck
//!
//! The checks themselves are total; only configuration and model construction can fail.

use miette::Diagnostic;
use shapecheck_model::ModelError;
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Malformed analyzer configuration: {0}")]
    #[diagnostic(
        code(shapecheck::config::malformed),
        help("The configuration must be a JSON object; unknown enum values are rejected")
    )]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid rule {field}: {reason}")]
    #[diagnostic(code(shapecheck::config::invalid_rule))]
    InvalidRule { field: &'static str, reason: String },
}

/// Unified error combining model and configuration failures
#[derive(Error, Diagnostic, Debug)]
pub enum ShapecheckError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}
