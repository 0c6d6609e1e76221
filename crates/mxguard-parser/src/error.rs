//! Error and diagnostic system for mxguard.
//!
//! This module provides:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans pointing into the document
//! - Severity levels
//! - A collector for accumulating every finding of a validation pass
//!
//! # Example
//!
//! ```
//! # use mxguard_parser::error::{Diagnostic, ErrorCode};
//! # use mxguard_parser::Span;
//!
//! let diag = Diagnostic::error("duplicate cell id `vpc-1`")
//!     .with_code(ErrorCode::E200)
//!     .with_label(Span::new(100..120), "duplicate definition")
//!     .with_secondary_label(Span::new(50..70), "first defined here")
//!     .with_help("give every cell a distinct id");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::{Label, LabelRole};
pub use severity::Severity;

/// A type alias for `Result<T, Diagnostic>`, used for fatal findings.
pub type Result<T> = std::result::Result<T, Diagnostic>;
