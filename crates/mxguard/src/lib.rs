//! mxguard - Repair, validation and bounded regeneration of draw.io documents.
//!
//! Generated draw.io documents arrive wrapped in prose, with out-of-range
//! connection points and broken structure. This crate extracts the document,
//! repairs what can be repaired deterministically, checks the structural
//! invariants, and asks a generation service for corrections when needed.

pub mod config;

mod error;
mod generate;
mod persist;

pub use mxguard_core::{cell, points, style};
pub use mxguard_parser::{Span, ValidationResult, ValidationRules, error as diagnostics};

pub use error::MxguardError;
pub use generate::{
    DEFAULT_KIND, GenerationOutcome, GenerationRequest, Generator, RetryController, ServiceError,
    correction_context,
};
pub use persist::{DOCUMENT_EXTENSION, write_document};

use log::{debug, info, trace};

use config::AppConfig;

/// Extract the document from raw generated text and repair its `points`
/// style properties.
///
/// Never fails; text that is not a document passes through trimmed.
pub fn repair(raw: &str) -> String {
    let extracted = mxguard_parser::extract(raw);
    trace!(extracted_len = extracted.len(); "Document extracted");
    mxguard_parser::repair_points(&extracted)
}

/// A document after repair, with its validation findings.
#[derive(Debug, Clone)]
pub struct CheckedDocument {
    document: String,
    result: ValidationResult,
}

impl CheckedDocument {
    /// The repaired document.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    pub fn is_valid(&self) -> bool {
        self.result.is_valid()
    }

    pub fn into_parts(self) -> (String, ValidationResult) {
        (self.document, self.result)
    }
}

/// Entry point for checking and generating documents.
///
/// # Examples
///
/// ```
/// use mxguard::{DocumentPipeline, config::AppConfig};
///
/// let pipeline = DocumentPipeline::new(AppConfig::default())
///     .expect("default config is valid");
///
/// let checked = pipeline.check("```xml\n<mxfile><diagram/></mxfile>\n```");
/// assert_eq!(checked.document(), "<mxfile><diagram/></mxfile>");
/// assert!(!checked.is_valid());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentPipeline {
    config: AppConfig,
    rules: ValidationRules,
}

impl DocumentPipeline {
    /// Create a pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MxguardError::Config`] if the validation section describes
    /// unusable rules.
    pub fn new(config: AppConfig) -> Result<Self, MxguardError> {
        let rules = config.validation().rules().map_err(MxguardError::Config)?;
        debug!(rules:?; "Pipeline configured");
        Ok(Self { config, rules })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Extract and repair raw generated text. See [`repair`].
    pub fn repair(&self, raw: &str) -> String {
        repair(raw)
    }

    /// Validate a document against the configured rules.
    pub fn validate(&self, document: &str) -> ValidationResult {
        mxguard_parser::validate_with(document, &self.rules)
    }

    /// Repair raw text and validate the result.
    pub fn check(&self, raw: &str) -> CheckedDocument {
        info!(raw_len = raw.len(); "Checking document");
        let document = self.repair(raw);
        let result = self.validate(&document);
        CheckedDocument { document, result }
    }

    /// Run the regeneration loop with the configured retry budget.
    ///
    /// # Errors
    ///
    /// Returns [`MxguardError::Service`] if the generator fails.
    pub fn generate<G>(
        &self,
        generator: &mut G,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, MxguardError>
    where
        G: Generator + ?Sized,
    {
        RetryController::new(self.rules.clone(), self.config.retry().max_attempts())
            .generate(generator, request)
    }
}
