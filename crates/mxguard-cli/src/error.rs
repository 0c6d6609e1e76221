//! Error type of the CLI.

use thiserror::Error;

use mxguard::{MxguardError, ValidationResult};

use crate::config::ConfigError;

/// Everything that makes the CLI exit with a failure status.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Mxguard(#[from] MxguardError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The checked document has structural errors.
    #[error("document is invalid: {} error(s)", .result.error_count())]
    Invalid { result: ValidationResult, src: String },
}

impl CliError {
    /// Create a new `Invalid` error with the checked document.
    pub fn new_invalid(result: ValidationResult, src: impl Into<String>) -> Self {
        Self::Invalid {
            result,
            src: src.into(),
        }
    }
}
