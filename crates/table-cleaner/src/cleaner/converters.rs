//! Coercive timestamp conversion.

use crate::error::Result;
use crate::profiler::parse_timestamp_millis;
use crate::utils::is_text_dtype;
use polars::prelude::*;

/// Canonical timestamp dtype of standardized date columns.
pub(crate) const TIMESTAMP_DTYPE: DataType = DataType::Datetime(TimeUnit::Milliseconds, None);

/// Convert a column to timestamps.
///
/// Text cells that fail to parse become null; the conversion itself never
/// fails on cell content. `Date` columns are widened, `Datetime` columns are
/// returned as they are.
pub(crate) fn to_timestamp(series: &Series) -> Result<Series> {
    match series.dtype() {
        DataType::Datetime(_, _) => Ok(series.clone()),
        DataType::Date => Ok(series.cast(&TIMESTAMP_DTYPE)?),
        dtype if is_text_dtype(dtype) => string_to_timestamp(series),
        _ => Ok(series.cast(&TIMESTAMP_DTYPE)?),
    }
}

/// Parse every text cell as a timestamp, nulling the ones that do not parse.
fn string_to_timestamp(series: &Series) -> Result<Series> {
    let as_text = series.cast(&DataType::String)?;
    let str_series = as_text.str()?;

    let timestamps: Vec<Option<i64>> = str_series
        .into_iter()
        .map(|opt_val| opt_val.and_then(parse_timestamp_millis))
        .collect();

    let timestamp_series = Series::new(series.name().clone(), timestamps);
    Ok(timestamp_series.cast(&TIMESTAMP_DTYPE)?)
}
