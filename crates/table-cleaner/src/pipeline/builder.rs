//! Cleaning orchestrator.
//!
//! This module provides the `Cleaner` struct and its builder, the single
//! entry point that chains deduplication, type detection, standardization
//! and validation.

use crate::cleaner::{Deduplicator, Standardizer};
use crate::config::{CleanerConfig, ConfigValidationError};
use crate::error::{CleaningError, Result};
use crate::pipeline::diagnostics::{
    ClosureDiagnosticSink, Diagnostic, DiagnosticSink, TracingDiagnosticSink,
};
use crate::quality::TypeValidator;
use crate::types::{CleaningReport, DeduplicationStats};
use polars::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// The table cleaner.
///
/// Use [`Cleaner::builder()`] to create a cleaner with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use table_cleaner::{Cleaner, CleanerConfig};
///
/// let cleaner = Cleaner::builder()
///     .config(CleanerConfig::builder().key_columns(["street", "city"]).build()?)
///     .on_diagnostic(|d| println!("{}", d))
///     .build()?;
///
/// let cleaned = cleaner.clean(df)?;
/// ```
pub struct Cleaner {
    config: CleanerConfig,
    sink: Arc<dyn DiagnosticSink>,
    deduplicator: Deduplicator,
    standardizer: Standardizer,
}

static_assertions::assert_impl_all!(Cleaner: Send, Sync);

/// Cleaned table plus the diagnostics gathered while producing it.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub table: DataFrame,
    pub report: CleaningReport,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::from_config(CleanerConfig::default(), Arc::new(TracingDiagnosticSink))
    }
}

impl Cleaner {
    /// Create a new cleaner builder.
    pub fn builder() -> CleanerBuilder {
        CleanerBuilder::default()
    }

    fn from_config(config: CleanerConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            deduplicator: Deduplicator::from_config(&config),
            standardizer: Standardizer::from_config(&config),
            config,
            sink,
        }
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Clean a table and return only the cleaned table.
    pub fn clean(&self, df: DataFrame) -> Result<DataFrame> {
        Ok(self.clean_with_report(df)?.table)
    }

    /// Clean the table handed over by the previous stage.
    ///
    /// # Errors
    ///
    /// Returns `Err(CleaningError::MissingInput)` when no table was given.
    pub fn clean_input(&self, df: Option<DataFrame>) -> Result<DataFrame> {
        let df = df.ok_or_else(|| {
            CleaningError::MissingInput("no table was passed to the transform".to_string())
        })?;
        self.clean(df)
    }

    /// Clean a table and return it together with a [`CleaningReport`].
    ///
    /// Type mismatches and a skipped key deduplication are reported, never
    /// raised; the returned table is the same either way.
    pub fn clean_with_report(&self, df: DataFrame) -> Result<CleaningOutcome> {
        let shape_before = df.shape();
        info!(
            "Cleaning table with {} rows and {} columns",
            shape_before.0, shape_before.1
        );

        // Step 1: missing values and all-null columns
        let mut deduplication = DeduplicationStats::default();
        let df = self.deduplicator.prepare(df, &mut deduplication)?;

        // Step 2: key-based and exact duplicates
        let df = self.deduplicator.remove_duplicates(df, &mut deduplication)?;
        self.report_deduplication(&deduplication, &df);

        // Step 3: expected types from the pre-standardization families
        let detection = self.standardizer.detector().detect(&df)?;
        let expected_types = TypeValidator::expected_types(&df, &detection);
        debug!("Expected types: {:?}", expected_types);

        // Step 4: standardization
        let df = self.standardizer.apply(df, &detection)?;
        self.sink.emit(Diagnostic::ColumnsDetected(detection.clone()));

        // Step 5: advisory validation
        let validation = TypeValidator::validate(&df, &expected_types);
        if validation.is_empty() {
            self.sink.emit(Diagnostic::TypesValidated {
                columns: expected_types.len(),
            });
        } else {
            self.sink.emit(Diagnostic::TypeMismatches(validation.clone()));
        }

        let shape_after = df.shape();
        info!(
            "Cleaning complete: {} rows and {} columns remain",
            shape_after.0, shape_after.1
        );

        Ok(CleaningOutcome {
            table: df,
            report: CleaningReport {
                shape_before,
                shape_after,
                deduplication,
                detection,
                expected_types,
                validation,
            },
        })
    }

    fn report_deduplication(&self, stats: &DeduplicationStats, df: &DataFrame) {
        if let Some(column) = &stats.key_skipped_due_to {
            self.sink.emit(Diagnostic::KeyDeduplicationSkipped {
                column: column.clone(),
            });
        }
        if !stats.key_columns_missing.is_empty() {
            self.sink.emit(Diagnostic::KeyColumnsMissing {
                columns: stats.key_columns_missing.clone(),
            });
        }
        if stats.key_deduplication_applied {
            self.sink.emit(Diagnostic::KeyDeduplicationApplied {
                address_null_rows_dropped: stats.address_null_rows_dropped,
                key_duplicates_dropped: stats.key_duplicates_dropped,
            });
        }
        self.sink.emit(Diagnostic::DeduplicationFinished {
            columns_dropped: stats.columns_dropped.clone(),
            rows: df.height(),
            columns: df.width(),
        });
    }
}

/// Builder for [`Cleaner`].
#[derive(Default)]
pub struct CleanerBuilder {
    config: Option<CleanerConfig>,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

static_assertions::assert_impl_all!(CleanerBuilder: Send);

impl CleanerBuilder {
    /// Set the cleaner configuration.
    pub fn config(mut self, config: CleanerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the sink that receives diagnostics.
    ///
    /// Defaults to [`TracingDiagnosticSink`].
    pub fn diagnostic_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set a diagnostics callback closure.
    pub fn on_diagnostic<F>(mut self, callback: F) -> Self
    where
        F: Fn(Diagnostic) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(ClosureDiagnosticSink::new(callback)));
        self
    }

    /// Build the cleaner.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Cleaner, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingDiagnosticSink) as Arc<dyn DiagnosticSink>);
        Ok(Cleaner::from_config(config, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::diagnostics::CollectingDiagnosticSink;
    use pretty_assertions::assert_eq;

    fn collecting_cleaner(keys: &[&str]) -> (Cleaner, Arc<CollectingDiagnosticSink>) {
        let sink = Arc::new(CollectingDiagnosticSink::new());
        let cleaner = Cleaner::builder()
            .config(
                CleanerConfig::builder()
                    .key_columns(keys.iter().copied())
                    .build()
                    .unwrap(),
            )
            .diagnostic_sink(sink.clone())
            .build()
            .unwrap();
        (cleaner, sink)
    }

    #[test]
    fn test_builder_default() {
        let cleaner = Cleaner::builder().build().unwrap();
        assert_eq!(cleaner.config(), &CleanerConfig::default());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = CleanerConfig {
            key_columns: Vec::new(),
            ..CleanerConfig::default()
        };
        assert!(Cleaner::builder().config(config).build().is_err());
    }

    #[test]
    fn test_clean_input_without_table() {
        let err = Cleaner::default().clean_input(None).unwrap_err();
        assert!(err.is_missing_input());
        assert_eq!(err.error_code(), "MISSING_INPUT");
    }

    #[test]
    fn test_report_tracks_shapes_and_stats() {
        let df = df![
            "street" => ["Main", "Main", "Side"],
            "city" => ["Oslo", "Oslo", "Oslo"],
            "price" => [1i64, 2, 3],
            "empty" => [None::<&str>, None, None],
        ]
        .unwrap();
        let (cleaner, _) = collecting_cleaner(&["street", "city"]);

        let outcome = cleaner.clean_with_report(df).unwrap();

        assert_eq!(outcome.report.shape_before, (3, 4));
        assert_eq!(outcome.report.shape_after, (2, 3));
        assert_eq!(
            outcome.report.deduplication.columns_dropped,
            vec!["empty".to_string()]
        );
        assert_eq!(outcome.report.deduplication.key_duplicates_dropped, 1);
        assert!(outcome.report.validation.is_empty());
    }

    #[test]
    fn test_diagnostics_are_emitted_in_order() {
        let df = df![
            "street" => [Some("Main"), Some("Main")],
            "city" => [None::<&str>, None],
            "price" => [1i64, 1],
        ]
        .unwrap();
        let (cleaner, sink) = collecting_cleaner(&["street", "price"]);

        cleaner.clean(df).unwrap();

        let diagnostics = sink.diagnostics();
        assert!(matches!(
            diagnostics.first(),
            Some(Diagnostic::KeyDeduplicationApplied { .. })
        ));
        assert!(matches!(
            diagnostics.last(),
            Some(Diagnostic::TypesValidated { .. })
        ));
        assert!(sink.warnings().is_empty());
    }

    #[test]
    fn test_all_null_key_column_is_dropped_before_key_check() {
        let df = df![
            "street" => [Some("Main"), Some("Main")],
            "city" => [None::<&str>, None],
            "rooms" => [1i64, 2],
        ]
        .unwrap();
        let (cleaner, sink) = collecting_cleaner(&["street", "city"]);

        let outcome = cleaner.clean_with_report(df).unwrap();

        assert_eq!(outcome.table.height(), 2);
        assert!(!outcome.report.deduplication.key_deduplication_applied);
        assert!(sink.diagnostics().contains(&Diagnostic::KeyColumnsMissing {
            columns: vec!["city".to_string()],
        }));
    }

    #[test]
    fn test_table_without_rows_reports_no_key_deduplication() {
        let df = df![
            "street" => Vec::<String>::new(),
            "city" => Vec::<String>::new(),
            "price" => Vec::<i64>::new(),
        ]
        .unwrap();
        let (cleaner, sink) = collecting_cleaner(&["street", "city"]);

        let outcome = cleaner.clean_with_report(df).unwrap();

        assert_eq!(outcome.table.shape(), (0, 0));
        assert!(!outcome.report.deduplication.key_deduplication_applied);
        assert!(
            !sink
                .diagnostics()
                .iter()
                .any(|d| matches!(d, Diagnostic::KeyDeduplicationApplied { .. }))
        );
        assert!(sink.diagnostics().contains(&Diagnostic::KeyColumnsMissing {
            columns: vec!["street".to_string(), "city".to_string()],
        }));
    }
}
