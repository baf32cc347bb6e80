//! Data quality checks.
//!
//! This module compares the column types of a cleaned table against the
//! types inferred before cleaning. Mismatches are advisory diagnostics.

mod validator;

pub use validator::TypeValidator;
