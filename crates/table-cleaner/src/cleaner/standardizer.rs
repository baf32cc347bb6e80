//! Canonical rewriting of date-like and text columns.

use super::converters::to_timestamp;
use super::sanitizers::fill_and_strip;
use crate::config::CleanerConfig;
use crate::error::{Result, ResultExt};
use crate::profiler::TypeDetector;
use crate::types::DetectionResult;
use polars::prelude::*;
use tracing::debug;

/// Rewrites columns into canonical form based on type detection.
///
/// - `date` and `possible_date` columns become millisecond timestamps;
///   cells that do not parse become null
/// - `categorical` columns get nulls filled with `""`, then every cell stripped
/// - every other column passes through unchanged
#[derive(Debug, Clone, Default)]
pub struct Standardizer {
    detector: TypeDetector,
}

impl Standardizer {
    pub fn new(detector: TypeDetector) -> Self {
        Self { detector }
    }

    pub fn from_config(config: &CleanerConfig) -> Self {
        Self::new(TypeDetector::from_config(config))
    }

    pub fn detector(&self) -> &TypeDetector {
        &self.detector
    }

    /// Detect column types once, then rewrite the table accordingly.
    pub fn standardize(&self, df: DataFrame) -> Result<(DataFrame, DetectionResult)> {
        let detection = self.detector.detect(&df)?;
        let df = self.apply(df, &detection)?;
        Ok((df, detection))
    }

    /// Rewrite `df` using an existing detection result.
    ///
    /// Columns named in `detection` but absent from `df` are ignored.
    pub fn apply(&self, df: DataFrame, detection: &DetectionResult) -> Result<DataFrame> {
        let mut df = df;

        for name in detection.date.iter().chain(&detection.possible_date) {
            let Ok(column) = df.column(name) else {
                continue;
            };
            let converted = to_timestamp(column.as_materialized_series())
                .context(format!("Failed to convert column '{}' to timestamps", name))?;
            debug!("Standardized column '{}' as timestamps", name);
            df.replace(name, converted)?;
        }

        for name in &detection.categorical {
            let Ok(column) = df.column(name) else {
                continue;
            };
            let cleaned = fill_and_strip(column.as_materialized_series())
                .context(format!("Failed to clean text column '{}'", name))?;
            df.replace(name, cleaned)?;
        }

        Ok(df)
    }
}
