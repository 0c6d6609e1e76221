//! Collector for accumulating diagnostics during validation.
//!
//! The [`DiagnosticCollector`] lets every check report its findings instead
//! of stopping at the first violation.

use crate::{error::Diagnostic, validate::ValidationResult};

/// A collector for accumulating diagnostics in discovery order.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if an error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Finish collection, keeping warnings alongside errors.
    pub fn finish(self) -> ValidationResult {
        ValidationResult::new(self.diagnostics)
    }
}
