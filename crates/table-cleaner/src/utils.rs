//! Shared utilities for the cleaning engine.
//!
//! Column families are resolved here once from a polars dtype; every other
//! module dispatches on [`ColumnFamily`] instead of inspecting dtypes itself.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Semantic family of a column's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnFamily {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// String or categorical text
    String,
    /// Everything else (booleans, times, nested types, ...)
    Other,
}

impl ColumnFamily {
    /// Generic family name as used in expected-type maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Datetime => "datetime",
            Self::String => "string",
            Self::Other => "other",
        }
    }

    /// Resolve the family of a polars dtype.
    pub fn of(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            Self::Numeric
        } else if is_datetime_dtype(dtype) {
            Self::Datetime
        } else if is_text_dtype(dtype) {
            Self::String
        } else {
            Self::Other
        }
    }

    /// Resolve the family of a column.
    pub fn of_column(column: &Column) -> Self {
        Self::of(column.dtype())
    }
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType holds timestamps. `Time` is a time of day, not a timestamp.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Check if a DataType is text-like (string or categorical).
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Exact type name of a dtype, used for strict validation of non-generic types.
pub fn dtype_name(dtype: &DataType) -> String {
    let name = match dtype {
        DataType::Int8 => "int8",
        DataType::Int16 => "int16",
        DataType::Int32 => "int32",
        DataType::Int64 => "int64",
        DataType::UInt8 => "uint8",
        DataType::UInt16 => "uint16",
        DataType::UInt32 => "uint32",
        DataType::UInt64 => "uint64",
        DataType::Float32 => "float32",
        DataType::Float64 => "float64",
        DataType::Boolean => "bool",
        DataType::String => "str",
        DataType::Categorical(_, _) => "category",
        DataType::Date => "date",
        DataType::Time => "time",
        DataType::Datetime(unit, tz) if tz.is_none() => match unit {
            TimeUnit::Milliseconds => "datetime[ms]",
            TimeUnit::Microseconds => "datetime[us]",
            TimeUnit::Nanoseconds => "datetime[ns]",
        },
        other => return other.to_string(),
    };
    name.to_string()
}

// =============================================================================
// String Utilities
// =============================================================================

/// Check if a text cell carries no information (empty after trimming).
#[inline]
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Names of a DataFrame's columns as owned strings.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
