//! Cell-level sanitization: missing-value normalization and text cleanup.

use crate::error::Result;
use crate::utils::{column_names, is_text_dtype};
use polars::prelude::*;
use tracing::debug;

/// Turn every empty-text cell and every float `NaN` into null.
///
/// Returns the normalized table and the number of cells that changed.
pub(crate) fn normalize_missing_values(df: DataFrame) -> Result<(DataFrame, usize)> {
    let mut df = df;
    let mut total_replacements = 0;

    for col_name in column_names(&df) {
        let series = df.column(&col_name)?.as_materialized_series();
        let normalized = match series.dtype() {
            dtype if is_text_dtype(dtype) => replace_empty_with_null(series)?,
            DataType::Float32 | DataType::Float64 => replace_nan_with_null(series)?,
            _ => None,
        };

        if let Some((cleaned_series, count)) = normalized {
            total_replacements += count;
            df.replace(&col_name, cleaned_series)?;
        }
    }

    if total_replacements > 0 {
        debug!("Replaced {} empty or NaN cells with null", total_replacements);
    }

    Ok((df, total_replacements))
}

/// Replace `""` with null in a text series. `None` when nothing changed.
fn replace_empty_with_null(series: &Series) -> Result<Option<(Series, usize)>> {
    let as_text = series.cast(&DataType::String)?;
    let str_series = as_text.str()?;
    let mut cleaned_values = Vec::with_capacity(str_series.len());
    let mut replacement_count = 0;

    for opt_val in str_series.into_iter() {
        match opt_val {
            Some("") => {
                cleaned_values.push(None);
                replacement_count += 1;
            }
            other => cleaned_values.push(other),
        }
    }

    if replacement_count == 0 {
        return Ok(None);
    }

    let cleaned = Series::new(series.name().clone(), cleaned_values).cast(series.dtype())?;
    Ok(Some((cleaned, replacement_count)))
}

/// Replace `NaN` with null in a float series. `None` when nothing changed.
fn replace_nan_with_null(series: &Series) -> Result<Option<(Series, usize)>> {
    let as_f64 = series.cast(&DataType::Float64)?;
    let values = as_f64.f64()?;
    let mut cleaned_values = Vec::with_capacity(values.len());
    let mut replacement_count = 0;

    for opt_val in values.into_iter() {
        match opt_val {
            Some(v) if v.is_nan() => {
                cleaned_values.push(None);
                replacement_count += 1;
            }
            other => cleaned_values.push(other),
        }
    }

    if replacement_count == 0 {
        return Ok(None);
    }

    let cleaned = Series::new(series.name().clone(), cleaned_values).cast(series.dtype())?;
    Ok(Some((cleaned, replacement_count)))
}

/// Drop every column whose cells are all null.
///
/// A table without rows has only all-null columns and loses all of them.
pub(crate) fn drop_all_null_columns(df: DataFrame) -> (DataFrame, Vec<String>) {
    let height = df.height();
    let empty_cols: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.null_count() == height)
        .map(|col| col.name().to_string())
        .collect();

    if empty_cols.is_empty() {
        return (df, empty_cols);
    }

    debug!("Dropping {} all-null columns: {:?}", empty_cols.len(), empty_cols);
    let cols_ref: Vec<PlSmallStr> = empty_cols.iter().map(|s| s.as_str().into()).collect();
    (df.drop_many(cols_ref), empty_cols)
}

/// Fill nulls with empty text, then strip surrounding whitespace from every cell.
pub(crate) fn fill_and_strip(series: &Series) -> Result<Series> {
    let as_text = series.cast(&DataType::String)?;
    let str_series = as_text.str()?;

    let cleaned_values: Vec<String> = str_series
        .into_iter()
        .map(|opt_val| opt_val.unwrap_or("").trim().to_string())
        .collect();

    Ok(Series::new(series.name().clone(), cleaned_values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(series: &Series) -> Vec<Option<String>> {
        series
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_replaces_empty_text() {
        let df = df!["city" => [Some("Paris"), Some(""), None, Some(" ")]].unwrap();
        let (df, count) = normalize_missing_values(df).unwrap();

        assert_eq!(count, 1);
        let city = df.column("city").unwrap().as_materialized_series();
        assert_eq!(
            strings(city),
            vec![Some("Paris".to_string()), None, None, Some(" ".to_string())]
        );
    }

    #[test]
    fn test_categorical_text_is_normalized_then_rewritten_as_string() {
        let city = Series::new(
            "city".into(),
            &[Some("Oslo"), Some(""), None, Some("  Oslo ")],
        )
        .cast(&DataType::from_categories(Categories::global()))
        .unwrap();
        let df = DataFrame::new(vec![city.into()]).unwrap();

        let (df, count) = normalize_missing_values(df).unwrap();
        assert_eq!(count, 1);
        let city = df.column("city").unwrap().as_materialized_series();
        assert!(matches!(city.dtype(), DataType::Categorical(_, _)));
        assert_eq!(city.null_count(), 2);

        let cleaned = fill_and_strip(city).unwrap();
        assert_eq!(cleaned.dtype(), &DataType::String);
        assert_eq!(
            strings(&cleaned),
            ["Oslo", "", "", "Oslo"]
                .iter()
                .map(|s| Some(s.to_string()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_normalize_replaces_nan() {
        let df = df!["price" => [Some(1.5), Some(f64::NAN), None]].unwrap();
        let (df, count) = normalize_missing_values(df).unwrap();

        assert_eq!(count, 1);
        let price = df.column("price").unwrap();
        assert_eq!(price.dtype(), &DataType::Float64);
        assert_eq!(price.null_count(), 2);
    }

    #[test]
    fn test_normalize_leaves_other_types_alone() {
        let df = df!["rooms" => [1i64, 2, 3], "flag" => [true, false, true]].unwrap();
        let (normalized, count) = normalize_missing_values(df.clone()).unwrap();
        assert_eq!(count, 0);
        assert!(normalized.equals_missing(&df));
    }

    #[test]
    fn test_drop_all_null_columns() {
        let df = df![
            "kept" => [Some(1i64), None],
            "empty" => [None::<&str>, None],
        ]
        .unwrap();
        let (df, dropped) = drop_all_null_columns(df);

        assert_eq!(dropped, vec!["empty".to_string()]);
        assert_eq!(column_names(&df), vec!["kept".to_string()]);
    }

    #[test]
    fn test_drop_all_null_columns_empties_table_without_rows() {
        let df = df![
            "a" => Vec::<i64>::new(),
            "b" => Vec::<String>::new(),
        ]
        .unwrap();
        let (df, dropped) = drop_all_null_columns(df);
        assert_eq!(dropped, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(df.shape(), (0, 0));
    }

    #[test]
    fn test_fill_and_strip() {
        let series = Series::new(
            "dirty".into(),
            &[Some("  a  "), Some("city "), Some(" Paris"), Some(" "), None],
        );
        let cleaned = fill_and_strip(&series).unwrap();

        assert_eq!(cleaned.null_count(), 0);
        assert_eq!(
            strings(&cleaned),
            ["a", "city", "Paris", "", ""]
                .iter()
                .map(|s| Some(s.to_string()))
                .collect::<Vec<_>>()
        );
    }
}
