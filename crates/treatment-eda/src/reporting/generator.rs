use crate::config::EdaConfig;
use crate::error::Result;
use crate::types::{
    DescriptiveAnalysis, EncodingReport, ImputationRecord, ProcessedData, RunSummary,
    ScalingRecord,
};
use crate::utils::column_names;
use chrono::Local;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the JSON analysis report inside the output directory.
pub const REPORT_FILE_NAME: &str = "analysis_report.json";

// ============================================================================
// Report Types
// ============================================================================

/// Full record of one analysis run.
///
/// Used for both JSON output on stdout (`--json`) and the report file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    // Metadata
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input workbook
    pub input_file: String,
    /// Path to the exported feature table (if written)
    pub output_file: Option<String>,
    pub target_column: String,
    pub identifier_column: String,

    // Shapes
    pub original_shape: (usize, usize),
    pub processed_shape: (usize, usize),
    pub feature_shape: (usize, usize),

    // Descriptive analysis of the loaded table
    pub analysis: DescriptiveAnalysis,

    // Preprocessing decisions
    pub imputation: Vec<ImputationRecord>,
    pub encoding: EncodingReport,
    pub scaling: Vec<ScalingRecord>,
    /// Feature columns in export order, target last
    pub feature_columns: Vec<String>,
    pub processing_steps: Vec<String>,

    pub summary: RunSummary,
}

/// Inputs for [`ReportGenerator::build_report`].
pub struct ReportParams<'a> {
    pub config: &'a EdaConfig,
    pub original_shape: (usize, usize),
    pub analysis: &'a DescriptiveAnalysis,
    pub processed: &'a ProcessedData,
    pub features: &'a DataFrame,
    pub output_file: Option<&'a Path>,
    pub summary: &'a RunSummary,
}

pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Path the report is written to.
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    /// Assemble the report from the results of a run.
    pub fn build_report(params: ReportParams<'_>) -> AnalysisReport {
        let processed = params.processed;
        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: params.config.input_path.display().to_string(),
            output_file: params.output_file.map(|p| p.display().to_string()),
            target_column: params.config.target_column.clone(),
            identifier_column: params.config.identifier_column.clone(),
            original_shape: params.original_shape,
            processed_shape: (processed.table.height(), processed.table.width()),
            feature_shape: (params.features.height(), params.features.width()),
            analysis: params.analysis.clone(),
            imputation: processed.imputation.clone(),
            encoding: processed.encoding.clone(),
            scaling: processed.scaling.clone(),
            feature_columns: column_names(params.features),
            processing_steps: processed.processing_steps.clone(),
            summary: params.summary.clone(),
        }
    }

    /// Write the report as pretty JSON, creating the output directory.
    pub fn write_report(&self, report: &AnalysisReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let report_path = self.report_path();
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}
