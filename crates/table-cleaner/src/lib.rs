//! Table Cleaning Library
//!
//! The transform stage of a batch pipeline, built on Polars: it infers column
//! semantics, standardizes text and date representations, removes redundant
//! rows and checks that the resulting types match what was inferred before
//! cleaning.
//!
//! # Overview
//!
//! - **Type Detection**: text columns whose sampled values all parse as dates
//!   are flagged as `possible_date`, other text columns as `categorical`
//! - **Deduplication**: empty columns, rows without address information,
//!   address duplicates (last wins) and exact duplicates (first wins) are removed
//! - **Standardization**: date-like columns become timestamps, text columns
//!   are null-filled and stripped
//! - **Validation**: advisory type checks reported through a diagnostics sink
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use table_cleaner::{Cleaner, CleanerConfig};
//!
//! let cleaner = Cleaner::builder()
//!     .config(CleanerConfig::builder().key_columns(["street", "city"]).build()?)
//!     .build()?;
//!
//! let outcome = cleaner.clean_with_report(df)?;
//! println!("{:?} -> {:?}", outcome.report.shape_before, outcome.report.shape_after);
//! if !outcome.report.validation.is_empty() {
//!     println!("Type mismatches: {}", outcome.report.validation);
//! }
//! ```
//!
//! # Diagnostics
//!
//! The library never installs a logger. Observations made while cleaning are
//! sent to a [`DiagnosticSink`]; the default sink forwards them to `tracing`.
//!
//! ```rust,ignore
//! use table_cleaner::{Cleaner, CollectingDiagnosticSink};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(CollectingDiagnosticSink::new());
//! let cleaner = Cleaner::builder().diagnostic_sink(sink.clone()).build()?;
//! cleaner.clean(df)?;
//!
//! for warning in sink.warnings() {
//!     eprintln!("{}", warning);
//! }
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod stage;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{Deduplicator, KeyGate, Standardizer};
pub use config::{
    CleanerConfig, CleanerConfigBuilder, ConfigValidationError, DEFAULT_KEY_COLUMNS,
    DEFAULT_SAMPLE_SEED, DEFAULT_SAMPLE_SIZE,
};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use pipeline::{
    Cleaner, CleanerBuilder, CleaningOutcome, ClosureDiagnosticSink, CollectingDiagnosticSink,
    Diagnostic, DiagnosticSink, TracingDiagnosticSink,
};
pub use profiler::TypeDetector;
pub use quality::TypeValidator;
pub use stage::{
    StagePaths, TableFormat, extract, load, read_table, run_batch, transform,
    transform_with_report, write_table,
};
pub use types::{
    CleaningReport, DeduplicationStats, DetectionResult, ExpectedType, ExpectedTypeMap,
    ValidationReport,
};
pub use utils::{ColumnFamily, dtype_name};
