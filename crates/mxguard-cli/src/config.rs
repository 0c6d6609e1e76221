//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).
//!
//! The file holds the library sections (`[validation]`, `[retry]`) plus a
//! `[generator]` section naming the external generation command:
//!
//! ```toml
//! [retry]
//! max_attempts = 3
//!
//! [generator]
//! command = "llm"
//! args = ["-m", "some-model"]
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use mxguard::config::AppConfig;

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    app: AppConfig,

    /// Generation service section.
    #[serde(default)]
    generator: GeneratorConfig,
}

impl CliConfig {
    /// Returns the library configuration.
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Returns the generation service configuration.
    pub fn generator(&self) -> &GeneratorConfig {
        &self.generator
    }
}

/// External command used as the generation service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratorConfig {
    /// Program to run.
    #[serde(default)]
    command: Option<String>,

    /// Arguments passed before any input.
    #[serde(default)]
    args: Vec<String>,
}

impl GeneratorConfig {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: Some(command.into()),
            args,
        }
    }

    /// Returns the configured program.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if no command is configured.
    pub fn command(&self) -> Result<&str, ConfigError> {
        self.command
            .as_deref()
            .filter(|command| !command.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(
                    "no generator command configured; set `command` in the [generator] section"
                        .to_string(),
                )
            })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (mxguard/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<CliConfig, ConfigError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("mxguard/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "mxguard", "mxguard") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(CliConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<CliConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}
