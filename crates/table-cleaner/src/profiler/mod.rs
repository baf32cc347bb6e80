//! Column-type detection.
//!
//! Each column is classified once from its declared dtype:
//! - timestamp columns are `date`
//! - text columns are `possible_date` when every sampled value parses as a
//!   date, otherwise `categorical`
//! - everything else is left unclassified
//!
//! Sampling draws at most `sample_size` non-blank values with a seeded
//! pseudo-random source, so identical input always yields identical output.
//! A date column with rare non-date outliers can slip through as
//! `possible_date` when no outlier lands in the sample; the outliers then
//! become null during standardization. This is a known limit of sampling.

mod date_parsing;

pub use date_parsing::{is_date_string, parse_timestamp, parse_timestamp_millis};

use crate::config::CleanerConfig;
use crate::error::Result;
use crate::types::DetectionResult;
use crate::utils::{ColumnFamily, is_blank};
use polars::prelude::*;
use rand::prelude::*;
use tracing::{debug, info};

/// Classifies the columns of a table into semantic families.
#[derive(Debug, Clone)]
pub struct TypeDetector {
    sample_size: usize,
    seed: u64,
}

impl Default for TypeDetector {
    fn default() -> Self {
        Self::from_config(&CleanerConfig::default())
    }
}

impl TypeDetector {
    pub fn new(sample_size: usize, seed: u64) -> Self {
        Self { sample_size, seed }
    }

    pub fn from_config(config: &CleanerConfig) -> Self {
        Self::new(config.sample_size, config.sample_seed)
    }

    /// Classify every column of `df`.
    ///
    /// Each text column is sampled with a fresh source seeded from the
    /// configured seed, so a column's classification does not depend on
    /// its position in the table.
    pub fn detect(&self, df: &DataFrame) -> Result<DetectionResult> {
        let detection = self.classify_columns(df, |column| {
            let mut rng = StdRng::seed_from_u64(self.seed);
            self.sample_parses_as_dates(column, &mut rng)
        })?;
        Self::log_detection(&detection);
        Ok(detection)
    }

    /// Classify every column of `df`, drawing all samples from `rng`.
    pub fn detect_with_rng<R: Rng + ?Sized>(
        &self,
        df: &DataFrame,
        rng: &mut R,
    ) -> Result<DetectionResult> {
        let detection =
            self.classify_columns(df, |column| self.sample_parses_as_dates(column, &mut *rng))?;
        Self::log_detection(&detection);
        Ok(detection)
    }

    fn classify_columns(
        &self,
        df: &DataFrame,
        mut is_possible_date: impl FnMut(&Column) -> Result<bool>,
    ) -> Result<DetectionResult> {
        let mut detection = DetectionResult::default();

        for column in df.get_columns() {
            let name = column.name().to_string();
            match ColumnFamily::of_column(column) {
                ColumnFamily::Datetime => detection.date.push(name),
                ColumnFamily::String => {
                    if is_possible_date(column)? {
                        debug!("Column '{}' holds dates stored as text", name);
                        detection.possible_date.push(name);
                    } else {
                        detection.categorical.push(name);
                    }
                }
                ColumnFamily::Numeric | ColumnFamily::Other => {}
            }
        }

        Ok(detection)
    }

    /// Check if every sampled value of a text column parses as a date.
    ///
    /// A column without any non-blank value is never date-like.
    fn sample_parses_as_dates<R: Rng + ?Sized>(&self, column: &Column, rng: &mut R) -> Result<bool> {
        let sample = sample_text_values(column, self.sample_size, rng)?;
        Ok(!sample.is_empty() && sample.iter().all(|value| is_date_string(value)))
    }

    fn log_detection(detection: &DetectionResult) {
        info!(
            "Detected {} categorical, {} date and {} possible date columns",
            detection.categorical.len(),
            detection.date.len(),
            detection.possible_date.len()
        );
        debug!("Column detection: {:?}", detection);
    }
}

/// Draw up to `max_samples` non-blank values from a text column.
pub fn sample_text_values<R: Rng + ?Sized>(
    column: &Column,
    max_samples: usize,
    rng: &mut R,
) -> Result<Vec<String>> {
    let series = column.as_materialized_series().cast(&DataType::String)?;
    let values: Vec<&str> = series
        .str()?
        .into_iter()
        .flatten()
        .filter(|v| !is_blank(v))
        .collect();

    let sample_size = std::cmp::min(max_samples, values.len());
    Ok(values
        .choose_multiple(rng, sample_size)
        .map(|v| v.to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_frame() -> DataFrame {
        df![
            "string_col" => ["a", "b", "c"],
            "possible_date" => ["2023-01-01", "2024-01-01", "2021-01-04"],
            "num_col" => [1i64, 2, 3],
            "flag" => [true, false, true],
        ]
        .unwrap()
    }

    #[test]
    fn test_detect_columns() {
        let mut df = sample_frame();
        let dates = Series::new("date_col".into(), &[0i64, 86_400_000, 172_800_000])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        df.with_column(dates).unwrap();

        let result = TypeDetector::default().detect(&df).unwrap();

        assert_eq!(result.categorical, vec!["string_col".to_string()]);
        assert_eq!(result.date, vec!["date_col".to_string()]);
        assert_eq!(result.possible_date, vec!["possible_date".to_string()]);
    }

    #[test]
    fn test_numeric_and_other_columns_are_unclassified() {
        let result = TypeDetector::default().detect(&sample_frame()).unwrap();
        for name in ["num_col", "flag"] {
            assert!(!result.categorical.iter().any(|c| c == name));
            assert!(!result.date.iter().any(|c| c == name));
            assert!(!result.possible_date.iter().any(|c| c == name));
        }
    }

    #[test]
    fn test_minute_precision_datetimes_are_possible_dates() {
        let df = df![
            "ts" => ["2024-01-01T10:30+02:00", "2024-02-01T11:00+02:00", "2024-03-01T09:15Z"],
            "d" => ["15-01-2024 10:30", "16-01-2024 11:00", "17-01-2024 12:45"],
        ]
        .unwrap();
        let result = TypeDetector::default().detect(&df).unwrap();
        assert_eq!(
            result.possible_date,
            vec!["ts".to_string(), "d".to_string()]
        );
        assert!(result.categorical.is_empty());
    }

    #[test]
    fn test_single_outlier_in_sample_keeps_column_categorical() {
        let df = df!["mixed" => ["2024-01-01", "2024-02-01", "soon"]].unwrap();
        let result = TypeDetector::default().detect(&df).unwrap();
        assert_eq!(result.categorical, vec!["mixed".to_string()]);
        assert!(result.possible_date.is_empty());
    }

    #[test]
    fn test_all_null_or_blank_column_is_never_a_date() {
        let df = df![
            "nulls" => [None::<&str>, None],
            "blanks" => [Some(""), Some("  ")],
        ]
        .unwrap();
        let result = TypeDetector::default().detect(&df).unwrap();
        assert_eq!(
            result.categorical,
            vec!["nulls".to_string(), "blanks".to_string()]
        );
        assert!(result.possible_date.is_empty());
    }

    #[test]
    fn test_nulls_and_blanks_do_not_block_date_detection() {
        let df = df!["when" => [Some("2024-01-01"), None, Some(""), Some("2024-03-01")]].unwrap();
        let result = TypeDetector::default().detect(&df).unwrap();
        assert_eq!(result.possible_date, vec!["when".to_string()]);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let values: Vec<String> = (0..500)
            .map(|i| {
                if i % 97 == 0 {
                    "n/a".to_string()
                } else {
                    format!("2024-01-{:02}", i % 28 + 1)
                }
            })
            .collect();
        let df = df!["noisy" => values].unwrap();
        let detector = TypeDetector::default();

        let first = detector.detect(&df).unwrap();
        for _ in 0..5 {
            assert_eq!(detector.detect(&df).unwrap(), first);
        }
    }

    #[test]
    fn test_sample_is_bounded_by_sample_size() {
        let values: Vec<String> = (0..250).map(|i| format!("v{i}")).collect();
        let column = Column::new("v".into(), values);
        let mut rng = StdRng::seed_from_u64(42);

        let sample = sample_text_values(&column, 100, &mut rng).unwrap();
        assert_eq!(sample.len(), 100);

        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(sample_text_values(&column, 100, &mut rng).unwrap(), sample);
    }

    #[test]
    fn test_detect_with_injected_rng() {
        let df = df!["d" => ["2024-01-01", "2024-01-02"], "s" => ["x", "y"]].unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let result = TypeDetector::new(1, 0).detect_with_rng(&df, &mut rng).unwrap();
        assert_eq!(result.possible_date, vec!["d".to_string()]);
        assert_eq!(result.categorical, vec!["s".to_string()]);
    }
}
