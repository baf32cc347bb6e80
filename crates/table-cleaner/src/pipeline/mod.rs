//! Pipeline module.
//!
//! This module provides the cleaning orchestrator and its diagnostics sinks.

mod builder;
pub mod diagnostics;

pub use builder::{Cleaner, CleanerBuilder, CleaningOutcome};
pub use diagnostics::{
    ClosureDiagnosticSink, CollectingDiagnosticSink, Diagnostic, DiagnosticSink,
    TracingDiagnosticSink,
};
