//! The core diagnostic type for the mxguard error system.
//!
//! A [`Diagnostic`] represents a single validation finding with an error
//! code, labeled document spans, and help text.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A single finding about a document.
///
/// # Example
///
/// ```text
/// error[E200]: duplicate cell id `vpc-1`
///   --> diagram.drawio:12:9
///    |
/// 12 |         <mxCell id="vpc-1" value="Internet Gateway" ...
///    |         ^^^^^^^^^^^^^^^^^^ duplicate definition
///    |
///   --> diagram.drawio:8:9
///    |
///  8 |         <mxCell id="vpc-1" value="VPC" ...
///    |         ------------------ first defined here
///    |
///    = help: give every cell a distinct id
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use mxguard_parser::error::{Diagnostic, ErrorCode};
    /// # use mxguard_parser::Span;
    ///
    /// let diag = Diagnostic::error("edge `e1` references non-existent source `db`")
    ///     .with_code(ErrorCode::E201)
    ///     .with_label(Span::new(120..180), "edge defined here")
    ///     .with_help("point the edge at an existing cell id");
    /// assert!(diag.is_error());
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns `true` if this diagnostic makes a document invalid.
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E200]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_defaults() {
        let diag = Diagnostic::error("missing entry point");

        assert!(diag.is_error());
        assert!(!diag.severity().is_warning());
        assert_eq!(diag.message(), "missing entry point");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("duplicate cell id `a`")
            .with_code(ErrorCode::E200)
            .with_label(Span::new(100..120), "duplicate definition")
            .with_secondary_label(Span::new(50..70), "first defined here")
            .with_help("give every cell a distinct id");

        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(!diag.labels()[1].is_primary());
        assert_eq!(diag.help(), Some("give every cell a distinct id"));
    }

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::error("duplicate cell id `a`").with_code(ErrorCode::E200);

        assert_eq!(diag.to_string(), "error[E200]: duplicate cell id `a`");
    }

    #[test]
    fn test_diagnostic_display_warning_without_code() {
        let diag = Diagnostic::warning("cell without id");

        assert!(!diag.is_error());
        assert_eq!(diag.to_string(), "warning: cell without id");
    }
}
