//! Command-line argument definitions for the mxguard CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects between checking an existing
//! document and generating a new one; configuration file selection and
//! logging verbosity apply to both.

use clap::{Parser, Subcommand};

use mxguard::DEFAULT_KIND;

/// Command-line arguments for the mxguard draw.io guard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Repair and validate an existing document
    Check(CheckArgs),

    /// Generate a document with the configured generation service
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Path to the input document (raw generated text is accepted)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Where to write the repaired document
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Natural-language description of the architecture
    pub description: String,

    /// Output file name; `.drawio` is appended when it has no extension
    #[arg(short, long)]
    pub output: Option<String>,

    /// Regenerations allowed after the first generation (overrides config)
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Architecture kind hint (web-app, serverless, microservices, data-pipeline)
    #[arg(short = 't', long = "type", default_value = DEFAULT_KIND)]
    pub kind: String,

    /// Print the document to stdout instead of writing a file
    #[arg(long)]
    pub no_write: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_args() {
        let args = Args::try_parse_from(["mxguard", "check", "in.drawio", "-o", "out"])
            .expect("valid arguments");

        assert_eq!(args.log_level, "info");
        match args.command {
            Command::Check(check) => {
                assert_eq!(check.input, "in.drawio");
                assert_eq!(check.output.as_deref(), Some("out"));
            }
            Command::Generate(_) => panic!("Expected check command"),
        }
    }

    #[test]
    fn test_generate_args_defaults() {
        let args = Args::try_parse_from(["mxguard", "generate", "a web shop"])
            .expect("valid arguments");

        match args.command {
            Command::Generate(generate) => {
                assert_eq!(generate.description, "a web shop");
                assert_eq!(generate.kind, DEFAULT_KIND);
                assert_eq!(generate.retries, None);
                assert!(!generate.no_write);
            }
            Command::Check(_) => panic!("Expected generate command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "mxguard",
            "generate",
            "etl",
            "--type",
            "data-pipeline",
            "--retries",
            "4",
            "--no-write",
            "-c",
            "cfg.toml",
            "--log-level",
            "debug",
        ])
        .expect("valid arguments");

        assert_eq!(args.config.as_deref(), Some("cfg.toml"));
        assert_eq!(args.log_level, "debug");
        match args.command {
            Command::Generate(generate) => {
                assert_eq!(generate.kind, "data-pipeline");
                assert_eq!(generate.retries, Some(4));
                assert!(generate.no_write);
            }
            Command::Check(_) => panic!("Expected generate command"),
        }
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Args::try_parse_from(["mxguard"]).is_err());
    }
}
