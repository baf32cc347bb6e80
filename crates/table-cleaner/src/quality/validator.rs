use crate::types::{DetectionResult, ExpectedType, ExpectedTypeMap, ValidationReport};
use crate::utils::{ColumnFamily, dtype_name};
use polars::prelude::*;

/// Checks a table's column types against an expected-type map.
pub struct TypeValidator;

impl TypeValidator {
    /// Compare every `(column, expected)` pair against `df`.
    ///
    /// Never fails: a missing column or a mismatching type becomes a report
    /// entry. An empty report means every expectation held.
    pub fn validate(df: &DataFrame, expected_types: &ExpectedTypeMap) -> ValidationReport {
        let mut report = ValidationReport::new();

        for (column, expected) in expected_types {
            let Some(dtype) = Self::column_dtype(df, column) else {
                report.insert(column.as_str(), "Column not found");
                continue;
            };

            if let Some(message) = Self::mismatch(expected, &dtype) {
                report.insert(column.as_str(), message);
            }
        }

        report
    }

    /// Derive expected types from the pre-standardization families of `df`.
    ///
    /// `date` and `possible_date` columns are expected to end up as
    /// timestamps; every other column keeps its declared family, with
    /// non-generic types pinned to their exact name.
    pub fn expected_types(df: &DataFrame, detection: &DetectionResult) -> ExpectedTypeMap {
        df.get_columns()
            .iter()
            .map(|column| {
                let name = column.name().to_string();
                let expected = if detection.is_date_like(&name) {
                    ExpectedType::Datetime
                } else {
                    ExpectedType::for_family(
                        ColumnFamily::of_column(column),
                        dtype_name(column.dtype()),
                    )
                };
                (name, expected)
            })
            .collect()
    }

    fn column_dtype(df: &DataFrame, column: &str) -> Option<DataType> {
        df.column(column).ok().map(|c| c.dtype().clone())
    }

    fn mismatch(expected: &ExpectedType, dtype: &DataType) -> Option<String> {
        let family = ColumnFamily::of(dtype);
        let actual = dtype_name(dtype);

        match expected {
            ExpectedType::Numeric if family != ColumnFamily::Numeric => {
                Some(format!("Expected numeric dtype, found {}", actual))
            }
            ExpectedType::Datetime if family != ColumnFamily::Datetime => {
                Some(format!("Expected datetime dtype, found {}", actual))
            }
            ExpectedType::String if family != ColumnFamily::String => Some(format!(
                "Expected string or categorical dtype, found {}",
                actual
            )),
            ExpectedType::Exact(name) if *name != actual => {
                Some(format!("Expected {}, found {}", name, actual))
            }
            _ => None,
        }
    }
}
