//! Error types for mxguard operations.
//!
//! Validation findings are never errors: they are returned as data inside a
//! [`ValidationResult`](mxguard_parser::ValidationResult). [`MxguardError`]
//! covers the failures that stop an operation.

use std::io;

use thiserror::Error;

use crate::generate::ServiceError;

/// The main error type for mxguard operations.
#[derive(Debug, Error)]
pub enum MxguardError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation service error: {0}")]
    Service(#[from] ServiceError),
}
