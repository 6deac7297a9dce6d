//! CLI entry point for the treatment records analysis.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use treatment_eda::{AnalysisOutput, EdaConfig, Pipeline};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory analysis and model-ready preprocessing for treatment records",
    long_about = "Loads a treatment records workbook, reports descriptive statistics, \
                  fills missing values, encodes categorical columns, scales numeric \
                  columns and exports a model-ready CSV.\n\n\
                  EXAMPLES:\n  \
                  # Run with the default dataset location\n  \
                  treatment-eda\n\n  \
                  # Custom input and output directory\n  \
                  treatment-eda -i data/cases.xlsx -o results/\n\n  \
                  # Print the report as JSON only\n  \
                  treatment-eda --json | jq .feature_columns"
)]
struct Args {
    /// Path to the workbook to analyze (.xlsx or .xls)
    #[arg(short, long, default_value = "data/Talent_Academy_Case_DT_2025.xlsx")]
    input: PathBuf,

    /// Output directory for the feature table and report
    #[arg(short, long, default_value = "outputs")]
    output: PathBuf,

    /// File name of the exported feature table
    #[arg(long, default_value = "model_ready_dataset.csv")]
    export_name: String,

    /// Target column, kept unmodified as the last feature column
    #[arg(short, long, default_value = "TedaviSuresi")]
    target: String,

    /// Identifier column, never encoded
    #[arg(long, default_value = "HastaNo")]
    id_column: String,

    /// Numeric columns to standardize (repeatable)
    #[arg(long = "scale", num_args = 1..)]
    scale: Vec<String>,

    /// Columns whose one-hot indicators enter the feature table (repeatable)
    #[arg(long = "one-hot-source", num_args = 1..)]
    one_hot_source: Vec<String>,

    /// Text columns with more distinct values than this are label encoded
    #[arg(long, default_value_t = treatment_eda::config::DEFAULT_CARDINALITY_THRESHOLD)]
    cardinality_threshold: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the report as JSON on stdout instead of a human-readable summary
    ///
    /// Disables all logging so stdout only contains JSON.
    #[arg(long)]
    json: bool,

    /// Do not write analysis_report.json
    #[arg(long)]
    no_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
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

fn build_config(args: &Args) -> Result<EdaConfig> {
    let mut builder = EdaConfig::builder()
        .input_path(&args.input)
        .output_dir(&args.output)
        .export_file_name(&args.export_name)
        .target_column(&args.target)
        .identifier_column(&args.id_column)
        .cardinality_threshold(args.cardinality_threshold)
        .generate_report(!args.no_report);

    if !args.scale.is_empty() {
        builder = builder.scale_columns(args.scale.iter().cloned());
    }
    if !args.one_hot_source.is_empty() {
        builder = builder.one_hot_sources(args.one_hot_source.iter().cloned());
    }

    Ok(builder.build()?)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    // Invalid configuration is a usage error and ends with a non-zero exit
    let config = build_config(&args)?;

    let mut builder = Pipeline::builder().config(config);
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    info!("{}", "=".repeat(80));
    info!("Starting treatment records analysis...");
    info!("{}", "=".repeat(80));

    match pipeline.run_from_path() {
        Ok(output) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&output.report)?);
            } else {
                print_human_readable_summary(&output);
            }
        }
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            if e.is_load_failure() {
                error!("Could not load input: {}", e);
                error!("Expected a workbook at {}", args.input.display());
            } else {
                error!("Analysis failed: {}", e);
            }
        }
    }

    Ok(())
}

/// Print a human-readable summary of the run.
///
/// This uses `println!` intentionally: the summary is the primary output and
/// should be visible regardless of log level settings.
fn print_human_readable_summary(output: &AnalysisOutput) {
    let report = &output.report;
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("ANALYSIS COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file, report.original_shape.0, report.original_shape.1
    );
    if let Some(ref output_file) = report.output_file {
        println!(
            "Output: {} ({} rows x {} columns)",
            output_file, report.feature_shape.0, report.feature_shape.1
        );
    }
    if let Some(ref report_path) = summary.report_path {
        println!("Report: {}", report_path);
    }
    println!();

    println!("Target Column: {}", report.target_column);
    if let Some(target) = &report.analysis.target
        && let Some(stats) = &target.statistics
    {
        println!(
            "  count {}, missing {}, mean {}, median {}",
            stats.count,
            stats.missing,
            format_optional(stats.mean),
            format_optional(stats.median)
        );
    }
    println!();

    if !report.analysis.dataset.missing_values.is_empty() {
        println!("Missing Values:");
        for entry in &report.analysis.dataset.missing_values {
            println!(
                "  {:<20} {:>6} ({:.1}%)",
                entry.column, entry.missing_count, entry.missing_percentage
            );
        }
        println!();
    }

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Missing cells: {} -> {}",
        summary.missing_before, summary.missing_after_imputation
    );
    println!(
        "  Columns: {} -> {} processed, {} features",
        summary.columns_before, summary.columns_processed, summary.feature_count
    );
    println!();

    if !report.processing_steps.is_empty() {
        println!("Actions Taken:");
        for step in &report.processing_steps {
            println!("  - {}", step);
        }
        println!();
    }

    println!("Feature Columns:");
    for column in &report.feature_columns {
        println!("  - {}", column);
    }
    println!("{}", "=".repeat(80));
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}
