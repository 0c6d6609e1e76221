//! Error codes for the mxguard diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Syntax errors
//! - `E1xx` - Document structure errors
//! - `E2xx` - Cell integrity errors
//! - `E3xx` - Required content errors
//! - `E4xx` - Layout errors
//! - `W0xx` - Warnings

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Syntax Errors (E0xx)
    // =========================================================================
    /// Malformed document.
    ///
    /// The text is not well-formed XML. No further checks run.
    E001,

    // =========================================================================
    // Structure Errors (E1xx)
    // =========================================================================
    /// Missing `<mxfile>` root element.
    E100,

    /// Missing `<diagram>` element inside `<mxfile>`.
    E101,

    /// Missing `<mxGraphModel>` element inside `<diagram>`.
    ///
    /// Compressed diagrams, whose model is stored as encoded text, also
    /// report this code.
    E102,

    /// Missing `<root>` element inside `<mxGraphModel>`.
    E103,

    // =========================================================================
    // Integrity Errors (E2xx)
    // =========================================================================
    /// Duplicate cell id.
    ///
    /// Two or more cells share the same `id`.
    E200,

    /// Dangling edge reference.
    ///
    /// An edge `source` or `target` names a cell that does not exist.
    E201,

    // =========================================================================
    // Content Errors (E3xx)
    // =========================================================================
    /// Missing boundary container.
    ///
    /// No cell is styled as the outermost network boundary grouping.
    E300,

    /// Missing entry point.
    ///
    /// No cell is styled as one of the ingress categories.
    E301,

    // =========================================================================
    // Layout Errors (E4xx)
    // =========================================================================
    /// Extent exceeded.
    ///
    /// A cell's `x + width` is beyond the maximum horizontal extent.
    E400,

    // =========================================================================
    // Warnings (W0xx)
    // =========================================================================
    /// Geometry attribute read by its numeric prefix, or not at all.
    W001,

    /// Cell without an `id`, skipped by id checks.
    W002,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Syntax errors
            ErrorCode::E001 => "E001",
            // Structure errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            // Integrity errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            // Content errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            // Layout errors
            ErrorCode::E400 => "E400",
            // Warnings
            ErrorCode::W001 => "W001",
            ErrorCode::W002 => "W002",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed document",
            ErrorCode::E100 => "missing mxfile element",
            ErrorCode::E101 => "missing diagram element",
            ErrorCode::E102 => "missing mxGraphModel element",
            ErrorCode::E103 => "missing root element",
            ErrorCode::E200 => "duplicate cell id",
            ErrorCode::E201 => "dangling edge reference",
            ErrorCode::E300 => "missing boundary container",
            ErrorCode::E301 => "missing entry point",
            ErrorCode::E400 => "extent exceeded",
            ErrorCode::W001 => "non-numeric geometry",
            ErrorCode::W002 => "cell without id",
        }
    }

    /// Returns `true` for codes that end validation early.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorCode::E001 | ErrorCode::E100 | ErrorCode::E101 | ErrorCode::E102 | ErrorCode::E103
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
