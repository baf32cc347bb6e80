//! Diagnostics emitted while cleaning a table.
//!
//! The engine never configures logging itself. Every observation it makes
//! (detected column kinds, skipped key deduplication, type mismatches) is
//! handed to a [`DiagnosticSink`] injected through the cleaner builder.
//!
//! # Example
//!
//! ```rust,ignore
//! use table_cleaner::Cleaner;
//!
//! let cleaner = Cleaner::builder()
//!     .on_diagnostic(|diagnostic| {
//!         if diagnostic.is_warning() {
//!             eprintln!("warning: {}", diagnostic);
//!         }
//!     })
//!     .build()?;
//! ```

use crate::types::{DetectionResult, ValidationReport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::{info, warn};

/// Observation made during one cleaning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Column classification of the deduplicated table.
    ColumnsDetected(DetectionResult),
    /// Key-based deduplication did not run because a key column is fully null.
    KeyDeduplicationSkipped { column: String },
    /// Key-based deduplication did not run because key columns are absent.
    KeyColumnsMissing { columns: Vec<String> },
    /// Key-based deduplication ran.
    KeyDeduplicationApplied {
        address_null_rows_dropped: usize,
        key_duplicates_dropped: usize,
    },
    /// All deduplication steps finished.
    DeduplicationFinished {
        columns_dropped: Vec<String>,
        rows: usize,
        columns: usize,
    },
    /// The standardized table disagrees with the expected types.
    TypeMismatches(ValidationReport),
    /// The standardized table matches the expected types.
    TypesValidated { columns: usize },
}

impl Diagnostic {
    /// Data-quality warnings never abort a cleaning call but deserve attention.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::KeyDeduplicationSkipped { .. } | Self::TypeMismatches(_)
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnsDetected(detection) => write!(
                f,
                "Detected columns: categorical={:?}, date={:?}, possible_date={:?}",
                detection.categorical, detection.date, detection.possible_date
            ),
            Self::KeyDeduplicationSkipped { column } => write!(
                f,
                "Column '{}' is entirely null; skipping address-based deduplication",
                column
            ),
            Self::KeyColumnsMissing { columns } => write!(
                f,
                "Key columns {:?} not in table; skipping address-based deduplication",
                columns
            ),
            Self::KeyDeduplicationApplied {
                address_null_rows_dropped,
                key_duplicates_dropped,
            } => write!(
                f,
                "Address-based deduplication dropped {} rows without address and {} duplicates",
                address_null_rows_dropped, key_duplicates_dropped
            ),
            Self::DeduplicationFinished {
                columns_dropped,
                rows,
                columns,
            } => write!(
                f,
                "Deduplication finished with shape ({}, {}); dropped columns {:?}",
                rows, columns, columns_dropped
            ),
            Self::TypeMismatches(report) => write!(f, "Validation errors: {}", report),
            Self::TypesValidated { columns } => {
                write!(f, "All {} columns have the expected types", columns)
            }
        }
    }
}

/// Receiver of diagnostics.
///
/// Implementations must be `Send + Sync` so a cleaner can be shared across
/// worker threads. `emit` is called a handful of times per cleaning call.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Wrapper that implements [`DiagnosticSink`] using a closure.
pub struct ClosureDiagnosticSink<F>
where
    F: Fn(Diagnostic) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureDiagnosticSink<F>
where
    F: Fn(Diagnostic) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> DiagnosticSink for ClosureDiagnosticSink<F>
where
    F: Fn(Diagnostic) + Send + Sync,
{
    fn emit(&self, diagnostic: Diagnostic) {
        (self.callback)(diagnostic);
    }
}

/// Default sink: warnings go to `warn!`, everything else to `info!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnosticSink;

impl DiagnosticSink for TracingDiagnosticSink {
    fn emit(&self, diagnostic: Diagnostic) {
        if diagnostic.is_warning() {
            warn!("{}", diagnostic);
        } else {
            info!("{}", diagnostic);
        }
    }
}

/// Sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingDiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics received so far, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(Diagnostic::is_warning)
            .collect()
    }
}

impl DiagnosticSink for CollectingDiagnosticSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match self.diagnostics.lock() {
            Ok(mut guard) => guard.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}

static_assertions::assert_impl_all!(Diagnostic: Send, Sync);
static_assertions::assert_impl_all!(TracingDiagnosticSink: Send, Sync);
static_assertions::assert_impl_all!(CollectingDiagnosticSink: Send, Sync);
