//! CLI entry point for the table cleaning batch.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use table_cleaner::{
    Cleaner, CleanerConfig, CleaningReport, StagePaths, extract, load, transform_with_report,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean, deduplicate and validate a tabular batch",
    long_about = "Runs the extract -> transform -> load batch on one table.\n\n\
                  ENVIRONMENT VARIABLES (a .env file is honored):\n  \
                  TABLE_CLEANER_INPUT_PATH     Raw input table (.parquet or .csv)\n  \
                  TABLE_CLEANER_OUTPUT_PATH    Where the cleaned table is written\n\n\
                  EXAMPLES:\n  \
                  # Clean a parquet file with the default address key\n  \
                  table-cleaner -i listings.parquet -o cleaned.parquet\n\n  \
                  # Custom key columns, JSON report next to the output\n  \
                  table-cleaner -i listings.csv -o cleaned.csv --key-columns street,city -r"
)]
struct Args {
    /// Path to the raw input table [default: $TABLE_CLEANER_INPUT_PATH]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path the cleaned table is written to [default: $TABLE_CLEANER_OUTPUT_PATH]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file
    ///
    /// Flags given on the command line override values from this file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated key columns for address-based deduplication
    #[arg(long, value_delimiter = ',')]
    key_columns: Option<Vec<String>>,

    /// Number of values sampled per text column for date detection
    #[arg(long)]
    sample_size: Option<usize>,

    /// Seed of the date-detection sampler
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the cleaning report as JSON on stdout instead of a summary
    #[arg(long)]
    json: bool,

    /// Write the cleaning report as JSON next to the output table
    ///
    /// The report will be saved as <output_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout only carries JSON.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    let config = build_config(&args)?;
    let cleaner = Cleaner::builder().config(config).build()?;

    let defaults = StagePaths::from_env();
    let paths = StagePaths::new(
        args.input.clone().unwrap_or(defaults.input),
        args.output.clone().unwrap_or(defaults.output),
    );

    info!("{}", "=".repeat(80));
    info!("Starting table cleaning batch...");
    info!("{}", "=".repeat(80));

    info!("[1/3] Extract");
    let raw = extract(&paths);

    info!("[2/3] Transform");
    let (cleaned, report) = match transform_with_report(Some(&raw), &paths.output, &cleaner) {
        Ok(result) => result,
        Err(e) => {
            error!("Transform failed [{}]: {}", e.error_code(), e);
            return Err(anyhow!("Transform failed: {}", e));
        }
    };

    info!("[3/3] Load");
    let shape = load(Some(&cleaned)).map_err(|e| anyhow!("Load failed: {}", e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let report_path = write_report(&report, &cleaned)?;
        info!("Report written to: {}", report_path.display());
    }

    print_summary(&raw, &cleaned, shape, &report);
    Ok(())
}

/// Merge the optional JSON config file with command-line overrides.
fn build_config(args: &Args) -> Result<CleanerConfig> {
    let base = match &args.config {
        Some(path) => CleanerConfig::from_json_file(path)
            .with_context(|| format!("Invalid config file {}", path.display()))?,
        None => CleanerConfig::default(),
    };

    let config = CleanerConfig::builder()
        .key_columns(args.key_columns.clone().unwrap_or(base.key_columns))
        .sample_size(args.sample_size.unwrap_or(base.sample_size))
        .sample_seed(args.seed.unwrap_or(base.sample_seed))
        .build()?;
    Ok(config)
}

/// Write the report as `<output_stem>_report.json` beside the cleaned table.
fn write_report(report: &CleaningReport, cleaned: &Path) -> Result<PathBuf> {
    let stem = cleaned
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let report_path = cleaned.with_file_name(format!("{}_report.json", stem));
    std::fs::write(&report_path, serde_json::to_string_pretty(report)?)?;
    Ok(report_path)
}

/// Print a human-readable summary of the batch.
///
/// Uses `println!` so the summary is visible regardless of log level.
fn print_summary(raw: &Path, cleaned: &Path, shape: (usize, usize), report: &CleaningReport) {
    let dedup = &report.deduplication;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Input:  {} ({} rows x {} columns)",
        raw.display(),
        report.shape_before.0,
        report.shape_before.1
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        cleaned.display(),
        shape.0,
        shape.1
    );
    println!();

    println!("Deduplication:");
    if !dedup.columns_dropped.is_empty() {
        println!("  Empty columns dropped: {:?}", dedup.columns_dropped);
    }
    if dedup.key_deduplication_applied {
        println!(
            "  Rows without address: {} removed",
            dedup.address_null_rows_dropped
        );
        println!("  Address duplicates:   {} removed", dedup.key_duplicates_dropped);
    } else if let Some(column) = &dedup.key_skipped_due_to {
        println!("  Address deduplication skipped: '{}' is entirely null", column);
    } else {
        println!(
            "  Address deduplication skipped: missing key columns {:?}",
            dedup.key_columns_missing
        );
    }
    println!("  Exact duplicates:     {} removed", dedup.exact_duplicates_dropped);
    println!();

    println!("Column Types:");
    println!("  Categorical:   {}", report.detection.categorical.len());
    println!("  Date:          {}", report.detection.date.len());
    println!("  Possible date: {}", report.detection.possible_date.len());
    println!();

    if report.validation.is_empty() {
        println!("All column types are as expected.");
    } else {
        println!("Type Mismatches:");
        for (column, message) in report.validation.iter() {
            println!("  ! {}: {}", column, message);
        }
    }
    println!();

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the JSON report");
    println!("{}", "=".repeat(80));
}
