//! Configuration types for the cleaning engine.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic cleaner setup.

use crate::error::CleaningError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Address-like composite key used for key-based deduplication.
pub const DEFAULT_KEY_COLUMNS: [&str; 6] = [
    "street",
    "houseNumber",
    "postalCode",
    "city",
    "estateType",
    "floorNumber",
];

/// Number of non-null values sampled per text column during date detection.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Seed of the pseudo-random source used for date-detection sampling.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// Configuration for the cleaner.
///
/// Use [`CleanerConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use table_cleaner::config::CleanerConfig;
///
/// let config = CleanerConfig::builder()
///     .key_columns(["street", "city"])
///     .sample_size(50)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Ordered composite key for key-based deduplication.
    /// Default: street, houseNumber, postalCode, city, estateType, floorNumber
    pub key_columns: Vec<String>,

    /// Maximum number of non-null values sampled per text column.
    /// Default: 100
    pub sample_size: usize,

    /// Seed for the sampling pseudo-random source.
    /// Default: 42
    pub sample_seed: u64,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            key_columns: DEFAULT_KEY_COLUMNS.iter().map(|s| s.to_string()).collect(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            sample_seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl CleanerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleanerConfigBuilder {
        CleanerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.key_columns.is_empty() {
            return Err(ConfigValidationError::EmptyKeyColumns);
        }

        let mut seen = HashSet::new();
        for column in &self.key_columns {
            if column.is_empty() {
                return Err(ConfigValidationError::BlankKeyColumn);
            }
            if !seen.insert(column.as_str()) {
                return Err(ConfigValidationError::DuplicateKeyColumn(column.clone()));
            }
        }

        if self.sample_size == 0 {
            return Err(ConfigValidationError::InvalidSampleSize(self.sample_size));
        }

        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CleaningError::from(e).with_context(format!("Reading {}", path.display())))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Key column list must not be empty")]
    EmptyKeyColumns,

    #[error("Key column names must not be empty")]
    BlankKeyColumn,

    #[error("Key column '{0}' is listed more than once")]
    DuplicateKeyColumn(String),

    #[error("Invalid sample size: {0} (must be at least 1)")]
    InvalidSampleSize(usize),
}

/// Builder for [`CleanerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleanerConfigBuilder {
    key_columns: Option<Vec<String>>,
    sample_size: Option<usize>,
    sample_seed: Option<u64>,
}

impl CleanerConfigBuilder {
    /// Set the composite key used for key-based deduplication.
    pub fn key_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set how many non-null values are sampled per text column.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = Some(size);
        self
    }

    /// Set the seed of the sampling pseudo-random source.
    pub fn sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = Some(seed);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleanerConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleanerConfig, ConfigValidationError> {
        let defaults = CleanerConfig::default();
        let config = CleanerConfig {
            key_columns: self.key_columns.unwrap_or(defaults.key_columns),
            sample_size: self.sample_size.unwrap_or(defaults.sample_size),
            sample_seed: self.sample_seed.unwrap_or(defaults.sample_seed),
        };

        config.validate()?;
        Ok(config)
    }
}
