//! CLI logic for the mxguard draw.io guard.
//!
//! `mxguard check` repairs and validates an existing document;
//! `mxguard generate` asks the configured generation command for a new one
//! and retries with corrections until it is valid or the budget is spent.

pub mod error_adapter;

mod args;
mod config;
mod error;
mod generator;

pub use args::{Args, CheckArgs, Command, GenerateArgs};
pub use config::{CliConfig, ConfigError, GeneratorConfig};
pub use error::CliError;
pub use generator::CommandGenerator;

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use log::{info, warn};

use mxguard::{
    DocumentPipeline, GenerationRequest, MxguardError, ValidationResult, write_document,
};

use error_adapter::{render, result_reportables};

/// Directory for generated documents written without `-o`.
const OUTPUT_DIR: &str = "output";

/// File name prefix for generated documents written without `-o`.
const OUTPUT_PREFIX: &str = "aws";

/// Stands in for a `--type` value that has no usable file name.
const FALLBACK_KIND: &str = "diagram";

/// Run the mxguard CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Generation service errors
/// - Documents that fail validation (`check` only)
pub fn run(args: &Args) -> Result<(), CliError> {
    let config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Check(check) => run_check(check, &config),
        Command::Generate(generate) => run_generate(generate, &config),
    }
}

fn run_check(args: &CheckArgs, config: &CliConfig) -> Result<(), CliError> {
    info!(input_path = args.input; "Checking document");

    let raw = fs::read_to_string(&args.input).map_err(MxguardError::from)?;

    let pipeline = DocumentPipeline::new(config.app().clone())?;
    let (document, result) = pipeline.check(&raw).into_parts();

    if let Some(output) = &args.output {
        let path = write_document(&document, output)?;
        info!(output_file = path.display().to_string(); "Repaired document written");
    }

    if !result.is_valid() {
        return Err(CliError::new_invalid(result, document));
    }

    report_findings(&result, &document);
    info!("Document is valid");
    Ok(())
}

fn run_generate(args: &GenerateArgs, config: &CliConfig) -> Result<(), CliError> {
    info!(kind = args.kind; "Generating document");

    let mut app_config = config.app().clone();
    if let Some(retries) = args.retries {
        app_config = app_config.with_max_attempts(retries);
    }
    let pipeline = DocumentPipeline::new(app_config)?;
    let mut generator = CommandGenerator::from_config(config.generator())?;

    let request = GenerationRequest::new(args.description.as_str()).with_kind(args.kind.as_str());
    let outcome = pipeline.generate(&mut generator, &request)?;

    if outcome.is_valid() {
        info!(attempts = outcome.attempts(); "Document passed validation");
    } else {
        warn!(
            attempts = outcome.attempts(),
            errors_count = outcome.result().error_count();
            "Document still has validation errors"
        );
    }
    report_findings(outcome.result(), outcome.document());

    if args.no_write {
        println!("{}", outcome.document());
        return Ok(());
    }

    let output = args
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&args.kind));
    let path = write_document(outcome.document(), output)?;
    info!(output_file = path.display().to_string(); "Document written");
    Ok(())
}

/// Log every finding of `result` as a warning.
fn report_findings(result: &ValidationResult, src: &str) {
    for reportable in result_reportables(result, src) {
        warn!("{}", render(&reportable));
    }
}

/// `output/aws-<kind>-<YYYY-MM-DDTHH-MM-SS>.drawio`, in UTC.
///
/// Only the last path component of `kind` is used, so the file always lands
/// directly inside [`OUTPUT_DIR`].
fn default_output_path(kind: &str) -> PathBuf {
    let kind = Path::new(kind)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_KIND);
    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");

    PathBuf::from(OUTPUT_DIR).join(format!(
        "{OUTPUT_PREFIX}-{kind}-{timestamp}.{}",
        mxguard::DOCUMENT_EXTENSION
    ))
}
