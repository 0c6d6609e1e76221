//! Bounded regeneration against an external generation service.
//!
//! [`RetryController`] drives the loop
//! `generate -> extract -> repair -> validate`, feeding the findings of an
//! invalid document back to the service as a correction until the document
//! is valid or the retry budget is spent.

use std::{error::Error as StdError, fmt::Write as _};

use log::{debug, info, trace, warn};
use thiserror::Error;

use mxguard_parser::{ValidationResult, ValidationRules, error::Diagnostic, validate_with};

use crate::{MxguardError, repair};

/// Architecture kind that needs no hint in the prompt.
pub const DEFAULT_KIND: &str = "web-app";

/// A failure of the generation service.
///
/// Never retried: the controller propagates it unchanged.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error caused by `source`.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A service that produces raw document text from a prompt.
///
/// `correction` carries the findings of the previous attempt on every call
/// but the first.
pub trait Generator {
    fn generate(&mut self, prompt: &str, correction: Option<&str>) -> Result<String, ServiceError>;
}

impl<F> Generator for F
where
    F: FnMut(&str, Option<&str>) -> Result<String, ServiceError>,
{
    fn generate(&mut self, prompt: &str, correction: Option<&str>) -> Result<String, ServiceError> {
        self(prompt, correction)
    }
}

/// What to ask the generation service for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    description: String,
    kind: Option<String>,
}

impl GenerationRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            kind: None,
        }
    }

    /// Sets the architecture kind, e.g. `serverless`.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// The prompt sent to the service.
    ///
    /// A kind other than [`DEFAULT_KIND`] is appended as a hint.
    pub fn prompt(&self) -> String {
        match self.kind() {
            Some(kind) if kind != DEFAULT_KIND => {
                format!("{}\n\nArchitecture type: {kind}", self.description)
            }
            _ => self.description.clone(),
        }
    }
}

/// The final document of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    document: String,
    attempts: u32,
    result: ValidationResult,
}

impl GenerationOutcome {
    /// The last repaired document.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Number of generation calls made.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    pub fn is_valid(&self) -> bool {
        self.result.is_valid()
    }

    /// Residual errors of the last document.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.result.errors()
    }
}

/// Steps of one generation run.
enum State {
    Start,
    Generated { raw: String },
    Checked { document: String, result: ValidationResult },
    Terminal(GenerationOutcome),
}

/// Per-run bookkeeping, dropped when the run returns.
#[derive(Debug, Default)]
struct RetrySession {
    attempts: u32,
    correction: Option<String>,
    /// Every checked document of the run with its findings, oldest first.
    history: Vec<(String, ValidationResult)>,
}

impl RetrySession {
    fn record(&mut self, document: String, result: ValidationResult) {
        self.history.push((document, result));
    }

    fn error_counts(&self) -> Vec<usize> {
        self.history
            .iter()
            .map(|(_, result)| result.error_count())
            .collect()
    }
}

/// Runs the bounded generate-and-check loop.
///
/// At most `max_attempts + 1` generation calls are made. The first valid
/// document ends the run; otherwise the last repaired document is returned
/// with its residual findings.
#[derive(Debug, Clone)]
pub struct RetryController {
    rules: ValidationRules,
    max_attempts: u32,
}

impl RetryController {
    pub fn new(rules: ValidationRules, max_attempts: u32) -> Self {
        Self {
            rules,
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Generate a document for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`MxguardError::Service`] as soon as the generator fails.
    /// An invalid final document is not an error.
    pub fn generate<G>(
        &self,
        generator: &mut G,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, MxguardError>
    where
        G: Generator + ?Sized,
    {
        let prompt = request.prompt();
        info!(max_attempts = self.max_attempts; "Starting generation");

        let mut session = RetrySession::default();
        let mut state = State::Start;
        loop {
            state = match state {
                State::Start => {
                    session.attempts += 1;
                    debug!(
                        attempt = session.attempts,
                        corrected = session.correction.is_some();
                        "Calling generation service"
                    );
                    let raw = generator.generate(&prompt, session.correction.as_deref())?;
                    trace!(raw_len = raw.len(); "Service responded");
                    State::Generated { raw }
                }
                State::Generated { raw } => {
                    let document = repair(&raw);
                    let result = validate_with(&document, &self.rules);
                    State::Checked { document, result }
                }
                State::Checked { document, result } => {
                    let next = if result.is_valid() || session.attempts > self.max_attempts {
                        State::Terminal(GenerationOutcome {
                            document: document.clone(),
                            attempts: session.attempts,
                            result: result.clone(),
                        })
                    } else {
                        info!(
                            attempt = session.attempts,
                            errors_count = result.error_count();
                            "Document invalid, requesting correction"
                        );
                        session.correction = Some(correction_context(
                            &document,
                            &result,
                            request.description(),
                            &self.rules,
                        ));
                        State::Start
                    };
                    session.record(document, result);
                    next
                }
                State::Terminal(outcome) => {
                    if outcome.is_valid() {
                        info!(attempts = outcome.attempts(); "Generated valid document");
                    } else {
                        warn!(
                            attempts = outcome.attempts(),
                            error_counts:? = session.error_counts();
                            "Retry budget exhausted, returning last document"
                        );
                    }
                    return Ok(outcome);
                }
            };
        }
    }
}

/// Builds the correction sent with a regeneration request.
///
/// Lists the previous document, its numbered errors, reminders of the
/// structural rules and the original request.
pub fn correction_context(
    document: &str,
    result: &ValidationResult,
    description: &str,
    rules: &ValidationRules,
) -> String {
    let mut context = String::from("The previously generated document was:\n\n");
    context.push_str(document);
    context.push_str("\n\nIt has the following validation errors:\n\n");
    for (index, diag) in result.errors().enumerate() {
        let _ = writeln!(context, "{}. {}", index + 1, diag.message());
    }

    let _ = write!(
        context,
        "\nPlease fix these errors and regenerate the complete draw.io XML. Remember:\n\
         - Output ONLY valid XML, no explanatory text\n\
         - Ensure all mxCell IDs are unique\n\
         - Ensure all edge source/target reference existing cell IDs\n\
         - Include a boundary container ({})\n\
         - Include an entry point ({})\n\
         - Keep diagram width under {}px\n\
         \nOriginal request: {description}",
        rules.boundary_markers().join(", "),
        rules.entry_markers().join(", "),
        rules.max_extent(),
    );
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"<mxfile><diagram><mxGraphModel><root>
        <mxCell id="0"/>
        <mxCell id="1" parent="0"/>
        <mxCell id="vpc" style="grIcon=mxgraph.aws4.group_vpc" vertex="1" parent="1"/>
        <mxCell id="alb" style="resIcon=mxgraph.aws4.application_load_balancer" vertex="1" parent="1"/>
    </root></mxGraphModel></diagram></mxfile>"#;

    const INVALID: &str =
        r#"<mxfile><diagram><mxGraphModel><root><mxCell id="0"/></root></mxGraphModel></diagram></mxfile>"#;

    fn controller(max_attempts: u32) -> RetryController {
        RetryController::new(ValidationRules::default(), max_attempts)
    }

    #[test]
    fn test_session_keeps_checked_documents_in_order() {
        let rules = ValidationRules::default();
        let mut session = RetrySession::default();

        session.record(INVALID.to_string(), validate_with(INVALID, &rules));
        session.record(VALID.to_string(), validate_with(VALID, &rules));

        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].0, INVALID);
        assert_eq!(session.history[1].0, VALID);
        assert_eq!(session.error_counts(), vec![2, 0]);
    }

    #[test]
    fn test_always_invalid_stops_after_budget() {
        let mut calls = 0;
        let mut generator = |_: &str, _: Option<&str>| -> Result<String, ServiceError> {
            calls += 1;
            Ok(INVALID.to_string())
        };

        let outcome = controller(2)
            .generate(&mut generator, &GenerationRequest::new("web app"))
            .expect("no service error");

        assert_eq!(calls, 3);
        assert_eq!(outcome.attempts(), 3);
        assert!(!outcome.is_valid());
        assert!(outcome.errors().count() > 0);
    }

    #[test]
    fn test_valid_first_document_stops_immediately() {
        let mut calls = 0;
        let mut generator = |_: &str, _: Option<&str>| -> Result<String, ServiceError> {
            calls += 1;
            Ok(VALID.to_string())
        };

        let outcome = controller(2)
            .generate(&mut generator, &GenerationRequest::new("web app"))
            .expect("no service error");

        assert_eq!(calls, 1);
        assert_eq!(outcome.attempts(), 1);
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_zero_budget_makes_one_call() {
        let mut calls = 0;
        let mut generator = |_: &str, _: Option<&str>| -> Result<String, ServiceError> {
            calls += 1;
            Ok(INVALID.to_string())
        };

        let outcome = controller(0)
            .generate(&mut generator, &GenerationRequest::new("x"))
            .expect("no service error");

        assert_eq!(calls, 1);
        assert_eq!(outcome.attempts(), 1);
    }

    #[test]
    fn test_recovers_on_second_attempt() {
        let mut corrections: Vec<Option<String>> = Vec::new();
        let mut generator = |_: &str, correction: Option<&str>| -> Result<String, ServiceError> {
            corrections.push(correction.map(str::to_string));
            Ok(if corrections.len() == 1 { INVALID } else { VALID }.to_string())
        };

        let outcome = controller(2)
            .generate(&mut generator, &GenerationRequest::new("three tier app"))
            .expect("no service error");

        assert!(outcome.is_valid());
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(corrections.len(), 2);
        assert!(corrections[0].is_none());
        let correction = corrections[1].as_deref().expect("correction on retry");
        assert!(correction.contains(INVALID));
        assert!(correction.contains("1. missing boundary container"));
        assert!(correction.contains("2. missing entry point"));
        assert!(correction.ends_with("Original request: three tier app"));
    }

    #[test]
    fn test_service_error_propagates() {
        let mut calls = 0;
        let mut generator = |_: &str, _: Option<&str>| -> Result<String, ServiceError> {
            calls += 1;
            if calls == 1 {
                Ok(INVALID.to_string())
            } else {
                Err(ServiceError::new("rate limited"))
            }
        };

        let err = controller(2)
            .generate(&mut generator, &GenerationRequest::new("x"))
            .expect_err("service failure");

        assert_eq!(calls, 2);
        match err {
            MxguardError::Service(err) => assert_eq!(err.message(), "rate limited"),
            other => panic!("Expected service error, got {other:?}"),
        }
    }

    #[test]
    fn test_document_repaired_before_validation() {
        let raw = format!(
            "Here is your diagram:\n```xml\n{}\n```",
            VALID.replace(
                "resIcon=mxgraph.aws4.application_load_balancer",
                "resIcon=mxgraph.aws4.application_load_balancer;points=[[3,-1]]"
            )
        );
        let mut generator =
            move |_: &str, _: Option<&str>| -> Result<String, ServiceError> { Ok(raw.clone()) };

        let outcome = controller(2)
            .generate(&mut generator, &GenerationRequest::new("x"))
            .expect("no service error");

        assert!(outcome.document().starts_with("<mxfile>"));
        assert!(outcome.document().contains("points=[[1,0]]"));
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_prompt_kind_hint() {
        let plain = GenerationRequest::new("shop");
        let default_kind = GenerationRequest::new("shop").with_kind(DEFAULT_KIND);
        let serverless = GenerationRequest::new("shop").with_kind("serverless");

        assert_eq!(plain.prompt(), "shop");
        assert_eq!(default_kind.prompt(), "shop");
        assert_eq!(serverless.prompt(), "shop\n\nArchitecture type: serverless");
    }

    #[test]
    fn test_generator_receives_prompt_every_call() {
        let mut prompts = Vec::new();
        let mut generator = |prompt: &str, _: Option<&str>| -> Result<String, ServiceError> {
            prompts.push(prompt.to_string());
            Ok(INVALID.to_string())
        };
        let request = GenerationRequest::new("shop").with_kind("microservices");

        controller(1)
            .generate(&mut generator, &request)
            .expect("no service error");

        assert_eq!(prompts, vec![request.prompt(), request.prompt()]);
    }

    #[test]
    fn test_correction_context_lists_rules() {
        let result = validate_with(INVALID, &ValidationRules::default());

        let context =
            correction_context(INVALID, &result, "a shop", &ValidationRules::default());

        assert!(context.starts_with("The previously generated document was:"));
        assert!(context.contains("- Include a boundary container (group_vpc)"));
        assert!(context.contains("- Keep diagram width under 3000px"));
    }

    #[test]
    fn test_service_error_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = ServiceError::with_source("write failed", io);

        assert_eq!(err.to_string(), "write failed");
        assert!(err.source().is_some());
    }
}
