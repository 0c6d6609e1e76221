//! # mxguard Parser
//!
//! Text-level processing of generated draw.io documents: locating the
//! document in raw generated text, repairing `points` style properties and
//! checking the structural invariants of the cell graph.
//!
//! ## Usage
//!
//! ```
//! # use mxguard_parser::{extract, repair_points, validate};
//! let raw = "Here you go:\n<mxfile><diagram><mxGraphModel><root/></mxGraphModel></diagram></mxfile>";
//!
//! let document = repair_points(&extract(raw));
//! let result = validate(&document);
//!
//! // An empty diagram has neither a boundary container nor an entry point.
//! assert!(!result.is_valid());
//! assert_eq!(result.error_count(), 2);
//! ```

pub mod error;
mod extract;
mod points;
mod repair;
mod span;
mod tree;
mod validate;

pub use extract::{ROOT_TAG, extract};
pub use points::repair_points_value;
pub use repair::repair_points;
pub use span::{Span, Spanned};
pub use validate::{
    DEFAULT_BOUNDARY_MARKERS, DEFAULT_ENTRY_MARKERS, DEFAULT_MAX_EXTENT, ValidationResult,
    ValidationRules, validate, validate_with,
};
