//! Removal of empty columns and redundant rows.
//!
//! Steps run in a fixed order, each on the survivors of the previous one:
//! 1. empty text (and float `NaN`) becomes null
//! 2. all-null columns are dropped
//! 3. key-based deduplication, when every key column is present and none of
//!    them is entirely null: rows without any key value are dropped, then rows
//!    sharing all key values keep their last occurrence
//! 4. exact duplicate rows keep their first occurrence

use super::sanitizers::{drop_all_null_columns, normalize_missing_values};
use crate::config::CleanerConfig;
use crate::error::{CleaningError, Result};
use crate::types::DeduplicationStats;
use polars::prelude::*;
use tracing::{debug, warn};

/// Outcome of the key-column gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyGate {
    /// At least one key column is not in the table.
    MissingColumns(Vec<String>),
    /// This key column holds only nulls.
    FullyNull(String),
    /// Key-based deduplication can run.
    Usable,
}

/// Removes empty columns, address-less rows and duplicate rows.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    key_columns: Vec<String>,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::from_config(&CleanerConfig::default())
    }
}

impl Deduplicator {
    pub fn new<I, S>(key_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_columns: key_columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &CleanerConfig) -> Self {
        Self::new(config.key_columns.iter().cloned())
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Run every deduplication step on `df`.
    pub fn deduplicate(&self, df: DataFrame) -> Result<(DataFrame, DeduplicationStats)> {
        let mut stats = DeduplicationStats::default();
        let df = self.prepare(df, &mut stats)?;
        let df = self.remove_duplicates(df, &mut stats)?;
        Ok((df, stats))
    }

    /// Steps 1 and 2: null normalization and all-null column removal.
    pub fn prepare(&self, df: DataFrame, stats: &mut DeduplicationStats) -> Result<DataFrame> {
        let (df, _) = normalize_missing_values(df)?;
        let (df, dropped) = drop_all_null_columns(df);
        stats.columns_dropped.extend(dropped);
        Ok(df)
    }

    /// Steps 3 and 4: key-based and exact-duplicate removal.
    pub fn remove_duplicates(
        &self,
        df: DataFrame,
        stats: &mut DeduplicationStats,
    ) -> Result<DataFrame> {
        let df = match self.key_gate(&df)? {
            KeyGate::Usable => {
                stats.key_deduplication_applied = true;
                self.deduplicate_by_key(df, stats)?
            }
            KeyGate::FullyNull(column) => {
                warn!(
                    "Skipping key-based deduplication: key column '{}' is fully null",
                    column
                );
                stats.key_skipped_due_to = Some(column);
                df
            }
            KeyGate::MissingColumns(missing) => {
                debug!(
                    "Skipping key-based deduplication: key columns {:?} not in table",
                    missing
                );
                stats.key_columns_missing = missing;
                df
            }
        };

        drop_exact_duplicates(df, stats)
    }

    /// Decide whether key-based deduplication may run on `df`.
    ///
    /// The gate is all-or-nothing: one fully-null key column disables
    /// key matching for the whole table. In a table without rows every key
    /// column is fully null.
    pub fn key_gate(&self, df: &DataFrame) -> Result<KeyGate> {
        let missing: Vec<String> = self
            .key_columns
            .iter()
            .filter(|key| df.column(key.as_str()).is_err())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Ok(KeyGate::MissingColumns(missing));
        }

        let height = df.height();
        for key in &self.key_columns {
            if key_column(df, key)?.null_count() == height {
                return Ok(KeyGate::FullyNull(key.clone()));
            }
        }

        Ok(KeyGate::Usable)
    }

    fn deduplicate_by_key(&self, df: DataFrame, stats: &mut DeduplicationStats) -> Result<DataFrame> {
        let before_filter = df.height();
        let mut has_address = BooleanChunked::full("has_address".into(), false, before_filter);
        for key in &self.key_columns {
            let not_null = key_column(&df, key)?.as_materialized_series().is_not_null();
            has_address = &has_address | &not_null;
        }
        let df = df.filter(&has_address)?;
        stats.address_null_rows_dropped = before_filter - df.height();

        let before_unique = df.height();
        let df = df.unique_stable(
            Some(self.key_columns.as_slice()),
            UniqueKeepStrategy::Last,
            None,
        )?;
        stats.key_duplicates_dropped = before_unique - df.height();

        debug!(
            "Key-based deduplication removed {} rows without key values and {} key duplicates",
            stats.address_null_rows_dropped, stats.key_duplicates_dropped
        );
        Ok(df)
    }
}

fn key_column<'a>(df: &'a DataFrame, key: &str) -> Result<&'a Column> {
    df.column(key)
        .map_err(|_| CleaningError::ColumnNotFound(key.to_string()))
}

fn drop_exact_duplicates(df: DataFrame, stats: &mut DeduplicationStats) -> Result<DataFrame> {
    if df.width() == 0 {
        return Ok(df);
    }

    let before = df.height();
    let df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    stats.exact_duplicates_dropped = before - df.height();

    if stats.exact_duplicates_dropped > 0 {
        debug!("Removed {} exact duplicate rows", stats.exact_duplicates_dropped);
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keyed() -> Deduplicator {
        Deduplicator::new(["street", "city"])
    }

    fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect()
    }

    fn ints(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_key_duplicates_keep_last() {
        let df = df![
            "street" => ["Main", "Side", "Main"],
            "city" => ["Oslo", "Oslo", "Oslo"],
            "price" => [100i64, 200, 150],
        ]
        .unwrap();

        let (df, stats) = keyed().deduplicate(df).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(ints(&df, "price"), vec![Some(200), Some(150)]);
        assert_eq!(stats.key_duplicates_dropped, 1);
        assert!(stats.key_deduplication_applied);
    }

    #[test]
    fn test_rows_without_any_key_value_are_dropped() {
        let df = df![
            "street" => [Some("Main"), None, None],
            "city" => [Some("Oslo"), Some("Bergen"), None],
            "price" => [1i64, 2, 3],
        ]
        .unwrap();

        let (df, stats) = keyed().deduplicate(df).unwrap();

        assert_eq!(ints(&df, "price"), vec![Some(1), Some(2)]);
        assert_eq!(stats.address_null_rows_dropped, 1);
    }

    #[test]
    fn test_partially_null_keys_match_on_null() {
        let df = df![
            "street" => [None, None, Some("Main")],
            "city" => [Some("Oslo"), Some("Oslo"), Some("Oslo")],
            "price" => [1i64, 2, 3],
        ]
        .unwrap();

        let (df, stats) = keyed().deduplicate(df).unwrap();

        assert_eq!(ints(&df, "price"), vec![Some(2), Some(3)]);
        assert_eq!(stats.key_duplicates_dropped, 1);
        assert!(stats.key_deduplication_applied);
    }

    #[test]
    fn test_fully_null_key_column_skips_key_deduplication() {
        let df = df![
            "street" => [Some("Main"), Some("Main")],
            "city" => [None::<&str>, None],
            "price" => [1i64, 2],
        ]
        .unwrap();
        let dedup = Deduplicator::new(["street", "city"]);

        // city is dropped as an all-null column before the gate runs
        let (df, stats) = dedup.deduplicate(df).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(stats.columns_dropped, vec!["city".to_string()]);
        assert!(!stats.key_deduplication_applied);
    }

    #[test]
    fn test_key_gate_reports_fully_null_column() {
        let df = df![
            "street" => [Some("Main"), Some("Main")],
            "city" => [None::<&str>, None],
        ]
        .unwrap();
        assert_eq!(
            keyed().key_gate(&df).unwrap(),
            KeyGate::FullyNull("city".to_string())
        );

        let mut stats = DeduplicationStats::default();
        let out = keyed().remove_duplicates(df, &mut stats).unwrap();
        assert_eq!(stats.key_skipped_due_to, Some("city".to_string()));
        // exact duplicates still go
        assert_eq!(out.height(), 1);
        assert_eq!(stats.exact_duplicates_dropped, 1);
    }

    #[test]
    fn test_key_gate_reports_missing_columns() {
        let df = df!["street" => ["Main", "Main"]].unwrap();
        assert_eq!(
            keyed().key_gate(&df).unwrap(),
            KeyGate::MissingColumns(vec!["city".to_string()])
        );

        let (df, stats) = keyed().deduplicate(df).unwrap();
        assert_eq!(stats.key_columns_missing, vec!["city".to_string()]);
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn test_table_without_rows_skips_key_deduplication() {
        let df = df![
            "street" => Vec::<String>::new(),
            "price" => Vec::<i64>::new(),
        ]
        .unwrap();

        let (df, stats) = Deduplicator::new(["street"]).deduplicate(df).unwrap();

        assert_eq!(df.shape(), (0, 0));
        assert_eq!(
            stats.columns_dropped,
            vec!["street".to_string(), "price".to_string()]
        );
        assert_eq!(stats.key_columns_missing, vec!["street".to_string()]);
        assert!(!stats.key_deduplication_applied);
    }

    #[test]
    fn test_key_gate_on_unprepared_table_without_rows() {
        let df = df!["street" => Vec::<String>::new()].unwrap();
        assert_eq!(
            Deduplicator::new(["street"]).key_gate(&df).unwrap(),
            KeyGate::FullyNull("street".to_string())
        );
    }

    #[test]
    fn test_key_column_lookup_names_missing_column() {
        let df = df!["street" => ["Main"]].unwrap();
        let err = key_column(&df, "city").unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert!(err.to_string().contains("city"));
    }

    #[test]
    fn test_exact_duplicates_keep_first() {
        let df = df![
            "name" => ["a", "b", "a", "c"],
            "n" => [1i64, 2, 1, 3],
        ]
        .unwrap();

        let (df, stats) = keyed().deduplicate(df).unwrap();

        assert_eq!(
            strings(&df, "name"),
            vec![Some("a".to_string()), Some("b".to_string()), Some("c".to_string())]
        );
        assert_eq!(stats.exact_duplicates_dropped, 1);
        assert!(!stats.key_deduplication_applied);
    }

    #[test]
    fn test_empty_text_counts_as_missing_for_column_and_duplicate_checks() {
        let df = df![
            "blank" => ["", ""],
            "note" => [Some(""), None],
            "n" => [1i64, 1],
        ]
        .unwrap();

        let (df, stats) = keyed().deduplicate(df).unwrap();

        assert_eq!(
            stats.columns_dropped,
            vec!["blank".to_string(), "note".to_string()]
        );
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn test_no_key_duplicates_and_no_exact_duplicates_remain() {
        let df = df![
            "street" => ["A", "A", "B", "B", "C"],
            "city" => ["X", "X", "Y", "Y", "Z"],
            "price" => [1i64, 2, 3, 3, 4],
        ]
        .unwrap();

        let (df, stats) = keyed().deduplicate(df).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(ints(&df, "price"), vec![Some(2), Some(3), Some(4)]);
        assert_eq!(stats.rows_dropped(), 2);
    }
}
