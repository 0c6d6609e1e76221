//! Generation service backed by an external command.

use std::{
    io::{self, Write as _},
    process::{Command, Stdio},
    thread,
};

use log::{debug, info};

use mxguard::{Generator, ServiceError};

use crate::config::{ConfigError, GeneratorConfig};

/// Runs a program once per generation call.
///
/// The prompt, followed by the correction context when there is one, is
/// written to the program's stdin; its stdout is the generated text.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Create a generator from the `[generator]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if no command is configured.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.command()?, config.args().to_vec()))
    }
}

impl Generator for CommandGenerator {
    fn generate(&mut self, prompt: &str, correction: Option<&str>) -> Result<String, ServiceError> {
        let input = match correction {
            Some(correction) => format!("{prompt}\n\n{correction}\n"),
            None => format!("{prompt}\n"),
        };

        info!(program = self.program, corrected = correction.is_some(); "Running generation command");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                ServiceError::with_source(format!("failed to start `{}`", self.program), err)
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ServiceError::new("generation command has no stdin"))?;
        // Separate thread: a full stdout pipe must not block the prompt write.
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output().map_err(|err| {
            ServiceError::with_source(format!("failed to wait for `{}`", self.program), err)
        })?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => {
                debug!("Generation command closed stdin early");
            }
            Ok(Err(err)) => {
                return Err(ServiceError::with_source("failed to send prompt", err));
            }
            Err(_) => return Err(ServiceError::new("prompt writer thread panicked")),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ServiceError::new(format!(
                "`{}` failed with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        debug!(output_len = output.stdout.len(); "Generation command finished");
        String::from_utf8(output.stdout)
            .map_err(|err| ServiceError::with_source("generation output is not UTF-8", err))
    }
}
