//! Configuration types for document checking and regeneration.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! external sources. Every field is optional and falls back to the
//! defaults of [`ValidationRules`].
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining validation and retry settings.
//! - [`ValidationConfig`] - Limits and category markers documents are checked against.
//! - [`RetryConfig`] - Bounds of the regeneration loop.
//!
//! # Example
//!
//! ```
//! # use mxguard::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.retry().max_attempts(), 2);
//! assert_eq!(config.validation().rules().map(|r| r.max_extent()), Ok(3000.0));
//! ```

use serde::Deserialize;

use mxguard_parser::{
    DEFAULT_BOUNDARY_MARKERS, DEFAULT_ENTRY_MARKERS, DEFAULT_MAX_EXTENT, ValidationRules,
};

/// Default number of regenerations after the first generation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Top-level configuration combining validation and retry settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Validation configuration section.
    #[serde(default)]
    validation: ValidationConfig,

    /// Retry configuration section.
    #[serde(default)]
    retry: RetryConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified sections.
    pub fn new(validation: ValidationConfig, retry: RetryConfig) -> Self {
        Self { validation, retry }
    }

    /// Returns the validation configuration.
    pub fn validation(&self) -> &ValidationConfig {
        &self.validation
    }

    /// Returns the retry configuration.
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Returns a copy with the retry budget replaced.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = max_attempts;
        self
    }
}

/// Limits and category markers documents are checked against.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Maximum `x + width` of any cell.
    #[serde(default = "default_max_extent")]
    max_extent: f64,

    /// Style markers identifying a boundary container.
    #[serde(default = "default_boundary_markers")]
    boundary_markers: Vec<String>,

    /// Style markers identifying an entry point.
    #[serde(default = "default_entry_markers")]
    entry_markers: Vec<String>,
}

impl ValidationConfig {
    /// Returns the [`ValidationRules`] described by this section.
    ///
    /// # Errors
    ///
    /// Returns an error if the extent limit is not a positive finite number
    /// or a marker list is empty.
    pub fn rules(&self) -> Result<ValidationRules, String> {
        if !self.max_extent.is_finite() || self.max_extent <= 0.0 {
            return Err(format!(
                "Invalid max_extent in config: {} (expected a positive number)",
                self.max_extent
            ));
        }
        if self.boundary_markers.is_empty() {
            return Err("Invalid boundary_markers in config: list is empty".to_string());
        }
        if self.entry_markers.is_empty() {
            return Err("Invalid entry_markers in config: list is empty".to_string());
        }

        Ok(ValidationRules::new(
            self.max_extent,
            self.boundary_markers.clone(),
            self.entry_markers.clone(),
        ))
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_extent: default_max_extent(),
            boundary_markers: default_boundary_markers(),
            entry_markers: default_entry_markers(),
        }
    }
}

fn default_max_extent() -> f64 {
    DEFAULT_MAX_EXTENT
}

fn default_boundary_markers() -> Vec<String> {
    DEFAULT_BOUNDARY_MARKERS
        .iter()
        .map(|marker| marker.to_string())
        .collect()
}

fn default_entry_markers() -> Vec<String> {
    DEFAULT_ENTRY_MARKERS
        .iter()
        .map(|marker| marker.to_string())
        .collect()
}

/// Bounds of the regeneration loop.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Regenerations allowed after the first generation.
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,
}

impl RetryConfig {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Returns the number of regenerations allowed after the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
