//! Treatment Records EDA Library
//!
//! Single-pass exploratory analysis and preprocessing for a tabular
//! medical-treatment dataset, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Loading**: First worksheet of an `.xlsx` / `.xls` workbook
//! - **Profiling**: Missing-value table, target distribution, categorical
//!   frequencies, numeric summaries, correlation and target relationships
//! - **Imputation**: Median for numeric columns, mode for text columns
//! - **Encoding**: Label encoding above a cardinality threshold, one-hot below
//! - **Scaling**: Standard scaling of the configured numeric columns
//! - **Export**: Model-ready CSV with the target last, plus a JSON report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use treatment_eda::{EdaConfig, run};
//!
//! let config = EdaConfig::builder()
//!     .input_path("data/Talent_Academy_Case_DT_2025.xlsx")
//!     .output_dir("outputs")
//!     .build()?;
//!
//! if let Some(output) = run(&config) {
//!     println!("Features: {:?}", output.report.feature_columns);
//! }
//! ```
//!
//! # Configuration
//!
//! Column names, suffixes and thresholds live in [`EdaConfig`]:
//!
//! ```rust,ignore
//! let config = EdaConfig::builder()
//!     .target_column("TedaviSuresi")
//!     .identifier_column("HastaNo")
//!     .scale_columns(["Yas", "UygulamaSuresi"])
//!     .one_hot_sources(["Cinsiyet", "KanGrubu", "Uyruk"])
//!     .cardinality_threshold(10)
//!     .build()?;
//! ```

pub mod config;
pub mod encoders;
pub mod error;
pub mod features;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod scaling;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, EdaConfig, EdaConfigBuilder};
pub use encoders::CategoricalEncoder;
pub use error::{EdaError, Result as EdaResult, ResultExt};
pub use features::FeatureAssembler;
pub use imputers::StatisticalImputer;
pub use loader::load_workbook;
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use profiler::DataProfiler;
pub use reporting::{AnalysisReport, ReportGenerator};
pub use scaling::StandardScaler;
pub use types::{
    AnalysisOutput, EncodingReport, FillValue, ImputationRecord, LabelEncoding, OneHotEncoding,
    ProcessedData, RunSummary, ScalingRecord,
};
pub use utils::ColumnKind;

use tracing::error;

/// Run the whole analysis for `config`.
///
/// Failures are logged and yield `None`: a missing or unsupported input
/// file, an unreadable workbook, an invalid configuration or any error
/// while processing.
pub fn run(config: &EdaConfig) -> Option<AnalysisOutput> {
    let pipeline = match Pipeline::builder().config(config.clone()).build() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            let e = EdaError::from(e);
            error!("Analysis not started [{}]: {}", e.error_code(), e);
            return None;
        }
    };

    match pipeline.run_from_path() {
        Ok(output) => Some(output),
        Err(e) if e.is_load_failure() => {
            error!("Could not load input: {}", e);
            None
        }
        Err(e) => {
            error!("Analysis failed [{}]: {}", e.error_code(), e);
            None
        }
    }
}
