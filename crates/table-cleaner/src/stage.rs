//! Batch stage: extract, transform and load.
//!
//! Each step hands a file path to the next one. The transform reads the
//! table, runs the [`Cleaner`] once and persists the result; the load step
//! checks that the cleaned artifact is readable.

use crate::error::{CleaningError, Result, ResultExt};
use crate::pipeline::{Cleaner, CleaningOutcome};
use crate::types::CleaningReport;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Environment variable naming the raw input table.
pub const INPUT_PATH_ENV: &str = "TABLE_CLEANER_INPUT_PATH";

/// Environment variable naming where the cleaned table is written.
pub const OUTPUT_PATH_ENV: &str = "TABLE_CLEANER_OUTPUT_PATH";

const DEFAULT_INPUT_PATH: &str = "data/listing_raw.parquet";
const DEFAULT_OUTPUT_PATH: &str = "data/processed.parquet";

/// Input and output locations of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePaths {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for StagePaths {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl StagePaths {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// Read paths from the environment, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            input: std::env::var_os(INPUT_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.input),
            output: std::env::var_os(OUTPUT_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.output),
        }
    }
}

/// On-disk table formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") | Some("pq") => Ok(Self::Parquet),
            _ => Err(CleaningError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Read a table from a CSV or Parquet file.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let df = match TableFormat::from_path(path)? {
        TableFormat::Csv => CsvReadOptions::default()
            .with_infer_schema_length(Some(100))
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        TableFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
    };
    Ok(df)
}

/// Write a table as CSV or Parquet, creating parent directories as needed.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    let format = TableFormat::from_path(path)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    match format {
        TableFormat::Csv => CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)?,
        TableFormat::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
    }
    Ok(())
}

/// Return the path of the raw table for this batch.
pub fn extract(paths: &StagePaths) -> PathBuf {
    info!(
        "Extract step started, returning file path: {}",
        paths.input.display()
    );
    paths.input.clone()
}

/// Clean the table at `input` and write it to `output`.
///
/// # Errors
///
/// Returns `Err(CleaningError::MissingInput)` when no input path (or an empty
/// one) was handed over by the extract step.
pub fn transform(input: Option<&Path>, output: &Path, cleaner: &Cleaner) -> Result<PathBuf> {
    transform_with_report(input, output, cleaner).map(|(path, _)| path)
}

/// Same as [`transform`], also returning the [`CleaningReport`] of the run.
pub fn transform_with_report(
    input: Option<&Path>,
    output: &Path,
    cleaner: &Cleaner,
) -> Result<(PathBuf, CleaningReport)> {
    let input = match input {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => {
            error!("No file path received from the extract step");
            return Err(CleaningError::MissingInput(
                "no file path received from the extract step".to_string(),
            ));
        }
    };
    info!("Transform step started with input: {}", input.display());

    let df = read_table(input).context(format!("Failed to read {}", input.display()))?;
    let CleaningOutcome {
        table: mut cleaned,
        report,
    } = cleaner.clean_with_report(df)?;

    write_table(&mut cleaned, output).context(format!("Failed to write {}", output.display()))?;
    info!("Transformed data saved to: {}", output.display());

    Ok((output.to_path_buf(), report))
}

/// Check that the cleaned table exists and is readable. Returns its shape.
///
/// # Errors
///
/// Returns `Err(CleaningError::MissingInput)` when no path was handed over or
/// the file does not exist.
pub fn load(cleaned: Option<&Path>) -> Result<(usize, usize)> {
    let path = match cleaned {
        Some(path) if path.exists() => path,
        _ => {
            let shown = cleaned
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".to_string());
            error!("No valid cleaned file received from the transform step: {}", shown);
            return Err(CleaningError::MissingInput(format!(
                "no valid cleaned file received from the transform step: {}",
                shown
            )));
        }
    };

    let df = read_table(path)?;
    info!(
        "Load step finished: {} rows and {} columns in {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df.shape())
}

/// Run extract, transform and load in sequence.
pub fn run_batch(paths: &StagePaths, cleaner: &Cleaner) -> Result<(usize, usize)> {
    let raw = extract(paths);
    let cleaned = transform(Some(&raw), &paths.output, cleaner)?;
    load(Some(&cleaned))
}
