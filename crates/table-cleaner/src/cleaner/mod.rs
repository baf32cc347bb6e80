//! Table cleaning components.
//!
//! This module provides functionality for:
//! - Normalizing missing values and dropping all-null columns
//! - Removing address-less, key-duplicate and exact-duplicate rows
//! - Rewriting date-like columns as timestamps and stripping text columns

mod converters;
mod deduplicator;
mod sanitizers;
mod standardizer;

pub use deduplicator::{Deduplicator, KeyGate};
pub use standardizer::Standardizer;
