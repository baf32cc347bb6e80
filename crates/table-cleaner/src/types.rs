use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::ColumnFamily;

/// Column classification produced by the type detector.
///
/// The three sets are disjoint and each keeps the table's column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Text-like columns that are not date-like.
    pub categorical: Vec<String>,
    /// Columns already typed as timestamps.
    pub date: Vec<String>,
    /// Text-like columns whose sampled values all parse as dates.
    pub possible_date: Vec<String>,
}

impl DetectionResult {
    /// Check if a column is (or will be standardized to) a timestamp.
    pub fn is_date_like(&self, column: &str) -> bool {
        self.date.iter().any(|c| c == column) || self.possible_date.iter().any(|c| c == column)
    }

    /// Check if a column is classified as categorical text.
    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|c| c == column)
    }
}

/// Type a column is expected to have after cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpectedType {
    Numeric,
    Datetime,
    String,
    /// Exact type name, matched verbatim.
    Exact(String),
}

impl ExpectedType {
    /// Expected type for a column of the given family and exact type name.
    pub fn for_family(family: ColumnFamily, exact_name: impl Into<String>) -> Self {
        match family {
            ColumnFamily::Numeric => Self::Numeric,
            ColumnFamily::Datetime => Self::Datetime,
            ColumnFamily::String => Self::String,
            ColumnFamily::Other => Self::Exact(exact_name.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Numeric => "numeric",
            Self::Datetime => "datetime",
            Self::String => "string",
            Self::Exact(name) => name,
        }
    }
}

impl From<&str> for ExpectedType {
    fn from(value: &str) -> Self {
        match value {
            "numeric" => Self::Numeric,
            "datetime" => Self::Datetime,
            "string" => Self::String,
            other => Self::Exact(other.to_string()),
        }
    }
}

impl From<String> for ExpectedType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ExpectedType> for String {
    fn from(value: ExpectedType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected type per column, in column order.
pub type ExpectedTypeMap = IndexMap<String, ExpectedType>;

/// Type mismatches per column. Empty means every expectation held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: IndexMap<String, String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(column.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.errors.contains_key(column)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.errors.get(column).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(c, m)| (c.as_str(), m.as_str()))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .iter()
            .map(|(column, message)| format!("{column}: {message}"))
            .collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

/// Row and column counts removed by each deduplication step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeduplicationStats {
    pub columns_dropped: Vec<String>,
    pub address_null_rows_dropped: usize,
    pub key_duplicates_dropped: usize,
    pub exact_duplicates_dropped: usize,
    /// Key column found fully null, if key-based deduplication was skipped for that reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_skipped_due_to: Option<String>,
    /// Key columns absent from the table; key-based deduplication is skipped when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_columns_missing: Vec<String>,
    /// Whether key-based deduplication ran.
    pub key_deduplication_applied: bool,
}

impl DeduplicationStats {
    pub fn rows_dropped(&self) -> usize {
        self.address_null_rows_dropped + self.key_duplicates_dropped + self.exact_duplicates_dropped
    }
}

/// Diagnostic metadata of one cleaning call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    pub shape_before: (usize, usize),
    pub shape_after: (usize, usize),
    pub deduplication: DeduplicationStats,
    pub detection: DetectionResult,
    pub expected_types: ExpectedTypeMap,
    pub validation: ValidationReport,
}
